//! Streamed download and decompression of dump archives.
//!
//! The dump body is streamed in chunks and concatenated into one buffer;
//! bytes read are tracked against the declared Content-Length (when
//! present) to report percent-complete in [0,50) — the download is the
//! first half of total pipeline progress. Gzip decompression happens after
//! the stream ends. There is no timeout and no resumable byte-range
//! support; cancellation is checked between chunks.

use std::io::Read;

use flate2::read::GzDecoder;

use crate::datasets::DatasetDescriptor;
use crate::progress::{format_bytes, CancelToken, IngestEvent, IngestProgressReporter, IngestStage};

/// Fatal ingestion errors. Per-record parse problems are recovered inside
/// the parsers; these abort the whole pipeline with nothing committed.
#[derive(Debug)]
pub enum IngestError {
    /// Transport failure during download: non-success status or a broken stream.
    Network(String),
    /// The compressed stream is malformed or could not be decoded.
    Decompression(String),
    /// The dump text is neither JSON-lines nor an XML abstract dump.
    UnsupportedFormat(String),
    /// The cancel token was set between chunks or batches.
    Cancelled,
}

impl std::fmt::Display for IngestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IngestError::Network(e) => write!(f, "download failed: {}", e),
            IngestError::Decompression(e) => write!(f, "decompression failed: {}", e),
            IngestError::UnsupportedFormat(e) => write!(f, "unsupported dump format: {}", e),
            IngestError::Cancelled => write!(f, "ingestion cancelled"),
        }
    }
}

impl std::error::Error for IngestError {}

/// Download a dataset's compressed dump into memory, reporting progress in
/// the [0,50) band. Fails with [`IngestError::Network`] on a non-success
/// status or a mid-stream error.
pub async fn fetch_dump(
    descriptor: &DatasetDescriptor,
    reporter: &dyn IngestProgressReporter,
    cancel: &CancelToken,
) -> Result<Vec<u8>, IngestError> {
    let client = reqwest::Client::new();
    let response = client
        .get(descriptor.source_url)
        .send()
        .await
        .map_err(|e| IngestError::Network(e.to_string()))?;

    if !response.status().is_success() {
        return Err(IngestError::Network(format!(
            "HTTP {} from {}",
            response.status(),
            descriptor.source_url
        )));
    }

    let total = response.content_length();
    let mut body: Vec<u8> = Vec::new();
    let mut response = response;

    loop {
        if cancel.is_cancelled() {
            return Err(IngestError::Cancelled);
        }

        let chunk = response
            .chunk()
            .await
            .map_err(|e| IngestError::Network(e.to_string()))?;
        let Some(chunk) = chunk else { break };

        body.extend_from_slice(&chunk);

        let (percent, message) = match total {
            Some(total) if total > 0 => {
                // Download occupies the first half of pipeline progress.
                let percent = ((body.len() as u64 * 50) / total).min(49) as u8;
                (
                    percent,
                    format!(
                        "{} / {}",
                        format_bytes(body.len() as u64),
                        format_bytes(total)
                    ),
                )
            }
            _ => (0, format!("{} downloaded", format_bytes(body.len() as u64))),
        };
        reporter.report(&IngestEvent::new(IngestStage::Downloading, percent, message));
    }

    Ok(body)
}

/// Decompress a gzip body into text. Fails with
/// [`IngestError::Decompression`] when the stream is malformed or the
/// decompressed bytes are not valid UTF-8.
pub fn decompress(bytes: &[u8]) -> Result<String, IngestError> {
    let mut decoder = GzDecoder::new(bytes);
    let mut text = String::new();
    decoder
        .read_to_string(&mut text)
        .map_err(|e| IngestError::Decompression(e.to_string()))?;
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    fn gzip(data: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn decompress_round_trip() {
        let compressed = gzip(b"hello dump");
        assert_eq!(decompress(&compressed).unwrap(), "hello dump");
    }

    #[test]
    fn decompress_rejects_garbage() {
        let err = decompress(b"not gzip at all").unwrap_err();
        assert!(matches!(err, IngestError::Decompression(_)));
    }

    #[test]
    fn decompress_rejects_truncated_stream() {
        let mut compressed = gzip(b"a longer payload that will be cut short");
        compressed.truncate(compressed.len() / 2);
        let err = decompress(&compressed).unwrap_err();
        assert!(matches!(err, IngestError::Decompression(_)));
    }
}
