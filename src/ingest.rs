//! The ingestion pipeline: download (or read) a dump, decompress it,
//! parse the records and store them in batches.
//!
//! The pipeline commits nothing until the dump has been classified, so an
//! unsupported or corrupt dump never leaves a partial store behind. Records
//! are inserted in batches of `[ingest].batch_size` rows, each batch in its
//! own transaction, with a cancellation checkpoint between batches.

use std::path::Path;

use anyhow::{bail, Context, Result};

use crate::config::Config;
use crate::datasets::{self, DatasetDescriptor};
use crate::db;
use crate::download::{self, IngestError};
use crate::models::NewArticle;
use crate::parse::{self, DumpFormat, XML_RECORD_CAP};
use crate::progress::{format_bytes, CancelToken, IngestEvent, IngestProgressReporter, IngestStage};
use crate::store::ArticleStore;

/// Run a full ingestion for one dataset.
///
/// When `input` is given the dump is read from that local file instead of
/// being downloaded; the file must still be the gzip-compressed dump the
/// dataset would normally fetch. `limit` caps the number of stored articles,
/// which is useful for smoke-testing a large dataset.
pub async fn run_ingest(
    config: &Config,
    dataset_key: &str,
    input: Option<&Path>,
    limit: Option<usize>,
    reporter: &dyn IngestProgressReporter,
    cancel: &CancelToken,
) -> Result<()> {
    let descriptor = match datasets::lookup(dataset_key) {
        Some(d) => d,
        None => {
            let known: Vec<&str> = datasets::DATASETS.iter().map(|d| d.key).collect();
            bail!(
                "unknown dataset '{}' (available: {})",
                dataset_key,
                known.join(", ")
            );
        }
    };

    let compressed = match input {
        Some(path) => {
            reporter.report(&IngestEvent::new(
                IngestStage::Downloading,
                0,
                format!("reading {}", path.display()),
            ));
            std::fs::read(path)
                .with_context(|| format!("failed to read local dump {}", path.display()))?
        }
        None => download::fetch_dump(descriptor, reporter, cancel)
            .await
            .with_context(|| format!("failed to download dataset '{}'", descriptor.key))?,
    };

    reporter.report(&IngestEvent::new(
        IngestStage::Decompressing,
        50,
        format!("decompressing {}", format_bytes(compressed.len() as u64)),
    ));
    let text = download::decompress(&compressed)
        .with_context(|| format!("failed to decompress dataset '{}'", descriptor.key))?;
    drop(compressed);

    // Classify before touching the database: an unsupported dump must not
    // leave a half-initialized store.
    let format = parse::classify(&text)
        .with_context(|| format!("failed to ingest dataset '{}'", descriptor.key))?;

    let pool = db::connect(config).await?;
    let store = ArticleStore::new(pool.clone());
    store.create_schema().await?;

    let estimated_total = estimate_record_count(&text, format, descriptor);
    let batch_size = config.ingest.batch_size.max(1);

    let mut records = parse::parse(&text, format);
    let mut batch: Vec<NewArticle> = Vec::with_capacity(batch_size);
    let mut stored: usize = 0;
    let mut truncated = false;

    loop {
        let record = match records.next() {
            Some(r) => r,
            None => break,
        };
        batch.push(record);

        if let Some(cap) = limit {
            if stored + batch.len() >= cap {
                batch.truncate(cap - stored);
                truncated = true;
            }
        }

        if batch.len() >= batch_size || truncated {
            if cancel.is_cancelled() {
                pool.close().await;
                return Err(IngestError::Cancelled.into());
            }
            store.batch_insert(&batch).await?;
            stored += batch.len();
            batch.clear();
            reporter.report(&IngestEvent::new(
                IngestStage::Processing,
                processing_percent(stored, estimated_total),
                format!("{} articles stored", stored),
            ));
            if truncated {
                break;
            }
        }
    }

    if !batch.is_empty() {
        store.batch_insert(&batch).await?;
        stored += batch.len();
    }

    reporter.report(&IngestEvent::new(
        IngestStage::Complete,
        100,
        format!("{} articles stored", stored),
    ));

    println!("ingest {}", descriptor.key);
    println!("  format:  {}", format.as_str());
    println!("  stored:  {} articles", stored);
    println!("  skipped: {} malformed records", records.skipped());
    if truncated {
        println!("  (stopped at --limit {})", stored);
    }
    println!("ok");

    pool.close().await;
    Ok(())
}

/// Estimate how many records the dump holds, for the processing percentage.
///
/// JSON-lines dumps carry one metadata line and one document line per
/// article. Abstract dumps are parsed up to a fixed cap, so the cap itself
/// is the denominator; short dumps simply finish below 100% and are then
/// reported complete.
fn estimate_record_count(text: &str, format: DumpFormat, descriptor: &DatasetDescriptor) -> usize {
    match format {
        DumpFormat::JsonLines => {
            let lines = text.lines().filter(|l| !l.trim().is_empty()).count();
            (lines / 2).max(1)
        }
        DumpFormat::XmlAbstract => {
            XML_RECORD_CAP.min(descriptor.approx_article_count as usize).max(1)
        }
    }
}

/// Map stored-record progress onto the [50,100) processing band.
fn processing_percent(stored: usize, estimated_total: usize) -> u8 {
    let half = (stored * 50 / estimated_total.max(1)).min(49) as u8;
    50 + half
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DbConfig, IngestConfig};
    use crate::progress::NoProgress;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    #[tokio::test]
    async fn cancelled_token_aborts_with_cancelled_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let config = Config {
            db: DbConfig {
                path: tmp.path().join("wdx.sqlite"),
            },
            ingest: IngestConfig { batch_size: 1 },
            retrieval: Default::default(),
            generator: Default::default(),
        };

        let dump = concat!(
            "{\"index\":{\"_id\":1}}\n",
            "{\"title\":\"Poland\",\"text\":\"Poland is a country.\"}\n",
        );
        let path = tmp.path().join("dump.json.gz");
        let file = std::fs::File::create(&path).unwrap();
        let mut encoder = GzEncoder::new(file, Compression::default());
        encoder.write_all(dump.as_bytes()).unwrap();
        encoder.finish().unwrap();

        let cancel = CancelToken::new();
        cancel.cancel();

        let err = run_ingest(&config, "standard", Some(&path), None, &NoProgress, &cancel)
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<IngestError>(),
            Some(IngestError::Cancelled)
        ));
    }

    #[test]
    fn processing_percent_stays_in_band() {
        assert_eq!(processing_percent(0, 1000), 50);
        assert_eq!(processing_percent(500, 1000), 75);
        assert_eq!(processing_percent(1000, 1000), 99);
        assert_eq!(processing_percent(5000, 1000), 99);
    }

    #[test]
    fn json_estimate_pairs_lines() {
        let text = "{\"index\":{}}\n{\"title\":\"A\"}\n{\"index\":{}}\n{\"title\":\"B\"}\n";
        let d = datasets::lookup("standard").unwrap();
        assert_eq!(estimate_record_count(text, DumpFormat::JsonLines, d), 2);
    }

    #[test]
    fn xml_estimate_uses_cap() {
        let d = datasets::lookup("minimal").unwrap();
        assert_eq!(
            estimate_record_count("<feed>", DumpFormat::XmlAbstract, d),
            XML_RECORD_CAP
        );
    }
}
