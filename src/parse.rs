//! Format classification and tolerant record parsing for dump text.
//!
//! Two dump layouts are supported:
//!
//! - **JSON-lines**: alternating metadata/document line pairs; the second
//!   line of each pair is a JSON object with `title`, `text`, and optional
//!   `category` / `outgoing_link` arrays.
//! - **XML abstract**: repeated `<doc>…</doc>` blocks with `title`,
//!   `abstract`, optional `url`, and sublink anchors. The literal prefix
//!   "Wikipedia: " is stripped from titles and a hard cap of
//!   [`XML_RECORD_CAP`] emitted records bounds memory.
//!
//! Both parsers are lazy finite iterators and skip malformed records
//! instead of failing; only an unrecognized dump format is fatal. A parser
//! is not restartable — call [`parse`] again to re-scan from the start.

use serde::Deserialize;

use crate::download::IngestError;
use crate::models::NewArticle;

/// Hard cap on records emitted from an XML abstract dump.
pub const XML_RECORD_CAP: usize = 50_000;

/// Recognized dump layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DumpFormat {
    JsonLines,
    XmlAbstract,
}

impl DumpFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            DumpFormat::JsonLines => "json-lines",
            DumpFormat::XmlAbstract => "xml-abstract",
        }
    }
}

/// Classify dump text by its first non-whitespace character: `{` or `[`
/// means JSON-lines, an XML declaration means an abstract dump, anything
/// else is fatal.
pub fn classify(text: &str) -> Result<DumpFormat, IngestError> {
    let trimmed = text.trim_start();
    match trimmed.chars().next() {
        Some('{') | Some('[') => Ok(DumpFormat::JsonLines),
        Some('<') if trimmed.starts_with("<?xml") || trimmed.starts_with("<feed") => {
            Ok(DumpFormat::XmlAbstract)
        }
        Some(c) => Err(IngestError::UnsupportedFormat(format!(
            "dump begins with '{}'",
            c
        ))),
        None => Err(IngestError::UnsupportedFormat("empty dump".to_string())),
    }
}

/// Lazy record iterator over dump text in the given format.
pub fn parse(text: &str, format: DumpFormat) -> RecordIter<'_> {
    match format {
        DumpFormat::JsonLines => RecordIter::JsonLines(JsonLinesRecords::new(text)),
        DumpFormat::XmlAbstract => RecordIter::XmlAbstract(AbstractRecords::new(text)),
    }
}

/// Either parser behind one iterator type.
pub enum RecordIter<'a> {
    JsonLines(JsonLinesRecords<'a>),
    XmlAbstract(AbstractRecords<'a>),
}

impl RecordIter<'_> {
    /// Records dropped so far (malformed JSON pairs, incomplete XML blocks,
    /// records missing a title or body).
    pub fn skipped(&self) -> usize {
        match self {
            RecordIter::JsonLines(p) => p.skipped,
            RecordIter::XmlAbstract(p) => p.skipped,
        }
    }
}

impl Iterator for RecordIter<'_> {
    type Item = NewArticle;

    fn next(&mut self) -> Option<NewArticle> {
        match self {
            RecordIter::JsonLines(p) => p.next(),
            RecordIter::XmlAbstract(p) => p.next(),
        }
    }
}

// ============ JSON-lines ============

/// Document line of a metadata/document pair. Unknown fields are ignored.
#[derive(Deserialize)]
struct DumpDoc {
    title: Option<String>,
    text: Option<String>,
    #[serde(default)]
    category: Vec<String>,
    #[serde(default)]
    outgoing_link: Vec<String>,
    url: Option<String>,
}

pub struct JsonLinesRecords<'a> {
    lines: std::str::Lines<'a>,
    skipped: usize,
}

impl<'a> JsonLinesRecords<'a> {
    fn new(text: &'a str) -> Self {
        JsonLinesRecords {
            lines: text.lines(),
            skipped: 0,
        }
    }

    fn next_nonempty(&mut self) -> Option<&'a str> {
        loop {
            let line = self.lines.next()?;
            if !line.trim().is_empty() {
                return Some(line);
            }
        }
    }
}

impl Iterator for JsonLinesRecords<'_> {
    type Item = NewArticle;

    fn next(&mut self) -> Option<NewArticle> {
        loop {
            // The metadata line is not inspected; only the pairing matters.
            self.next_nonempty()?;
            let Some(doc_line) = self.next_nonempty() else {
                // Trailing metadata line without a document.
                self.skipped += 1;
                return None;
            };

            let doc: DumpDoc = match serde_json::from_str(doc_line) {
                Ok(doc) => doc,
                Err(_) => {
                    // Malformed JSON skips the pair, never aborts the dump.
                    self.skipped += 1;
                    continue;
                }
            };

            match (doc.title, doc.text) {
                (Some(title), Some(text)) if !title.trim().is_empty() && !text.trim().is_empty() => {
                    return Some(NewArticle::from_parts(
                        title.trim().to_string(),
                        text,
                        doc.category,
                        doc.outgoing_link,
                        doc.url,
                    ));
                }
                _ => {
                    self.skipped += 1;
                    continue;
                }
            }
        }
    }
}

// ============ XML abstract ============

#[derive(Clone, Copy, PartialEq, Eq)]
enum XmlField {
    None,
    Title,
    Url,
    Abstract,
    Anchor,
}

pub struct AbstractRecords<'a> {
    reader: quick_xml::Reader<&'a [u8]>,
    emitted: usize,
    skipped: usize,
    done: bool,
    in_doc: bool,
    field: XmlField,
    title: String,
    url: String,
    abstract_text: String,
    anchors: Vec<String>,
    consecutive_errors: u8,
}

impl<'a> AbstractRecords<'a> {
    fn new(text: &'a str) -> Self {
        let mut reader = quick_xml::Reader::from_reader(text.as_bytes());
        // Real abstract dumps contain stray markup; tolerate mismatched tags.
        reader.config_mut().check_end_names = false;
        AbstractRecords {
            reader,
            emitted: 0,
            skipped: 0,
            done: false,
            in_doc: false,
            field: XmlField::None,
            title: String::new(),
            url: String::new(),
            abstract_text: String::new(),
            anchors: Vec::new(),
            consecutive_errors: 0,
        }
    }

    fn reset_doc(&mut self) {
        self.title.clear();
        self.url.clear();
        self.abstract_text.clear();
        self.anchors.clear();
        self.field = XmlField::None;
    }

    fn finish_doc(&mut self) -> Option<NewArticle> {
        self.in_doc = false;
        let title = self
            .title
            .trim()
            .strip_prefix("Wikipedia: ")
            .unwrap_or(self.title.trim())
            .to_string();
        let abstract_text = self.abstract_text.trim().to_string();

        if title.is_empty() || abstract_text.is_empty() {
            self.skipped += 1;
            return None;
        }

        let url = if self.url.trim().is_empty() {
            None
        } else {
            Some(self.url.trim().to_string())
        };

        Some(NewArticle::from_parts(
            title,
            abstract_text,
            Vec::new(),
            std::mem::take(&mut self.anchors),
            url,
        ))
    }
}

impl Iterator for AbstractRecords<'_> {
    type Item = NewArticle;

    fn next(&mut self) -> Option<NewArticle> {
        use quick_xml::events::Event;

        if self.done {
            return None;
        }

        loop {
            match self.reader.read_event() {
                Ok(Event::Start(e)) => {
                    self.consecutive_errors = 0;
                    match e.name().as_ref() {
                        b"doc" => {
                            // Unterminated previous block is dropped, not fatal.
                            if self.in_doc {
                                self.skipped += 1;
                            }
                            self.in_doc = true;
                            self.reset_doc();
                        }
                        b"title" if self.in_doc => self.field = XmlField::Title,
                        b"url" if self.in_doc => self.field = XmlField::Url,
                        b"abstract" if self.in_doc => self.field = XmlField::Abstract,
                        b"anchor" if self.in_doc => {
                            self.field = XmlField::Anchor;
                            self.anchors.push(String::new());
                        }
                        _ => self.field = XmlField::None,
                    }
                }
                Ok(Event::Text(t)) if self.in_doc => {
                    let text = match t.unescape() {
                        Ok(text) => text.into_owned(),
                        Err(_) => continue,
                    };
                    match self.field {
                        XmlField::Title => self.title.push_str(&text),
                        XmlField::Url => self.url.push_str(&text),
                        XmlField::Abstract => self.abstract_text.push_str(&text),
                        XmlField::Anchor => {
                            if let Some(anchor) = self.anchors.last_mut() {
                                anchor.push_str(&text);
                            }
                        }
                        XmlField::None => {}
                    }
                }
                Ok(Event::End(e)) => {
                    self.consecutive_errors = 0;
                    match e.name().as_ref() {
                        b"doc" if self.in_doc => {
                            if let Some(record) = self.finish_doc() {
                                self.emitted += 1;
                                // Stop scanning the moment the cap is hit,
                                // regardless of remaining input.
                                if self.emitted >= XML_RECORD_CAP {
                                    self.done = true;
                                }
                                return Some(record);
                            }
                        }
                        _ => self.field = XmlField::None,
                    }
                }
                Ok(Event::Eof) => {
                    if self.in_doc {
                        self.skipped += 1;
                        self.in_doc = false;
                    }
                    self.done = true;
                    return None;
                }
                Ok(_) => {}
                Err(_) => {
                    // Skip the broken block and keep scanning; bail out if
                    // the reader stops making progress.
                    self.skipped += 1;
                    if self.in_doc {
                        self.in_doc = false;
                    }
                    self.consecutive_errors += 1;
                    if self.consecutive_errors >= 3 {
                        self.done = true;
                        return None;
                    }
                }
            }
        }
    }
}
