//! CSV snapshot reader.
//!
//! Recognized columns (header names are matched case-insensitively):
//! `isbn13` (or `isbn`), `title`, `authors`, `description`, `simple_category`,
//! `categories`, `dominant_tone`, one probability column per emotion label,
//! `average_rating`, `ratings_count`, `thumbnail`. Only the identifier column
//! is required. Missing numbers default to zero; `nan`/empty cells count as
//! absent.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use bookrec_core::ident::normalize_isbn;
use bookrec_core::types::{BookRecord, MAX_RATING};
use bookrec_core::{Error, Result};

/// Emotion labels produced by tone analysis; each may appear as a column.
pub const EMOTION_COLUMNS: [&str; 7] = ["anger", "disgust", "fear", "joy", "neutral", "sadness", "surprise"];

/// Row accounting for one load.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LoadReport {
    /// Data rows the CSV reader produced, malformed ones included.
    pub rows: usize,
    pub loaded: usize,
    pub duplicates: usize,
    /// Rows whose identifier normalized to the unjoinable key.
    pub rejected: usize,
    /// Rows the CSV reader could not decode.
    pub malformed: usize,
}

struct Columns {
    isbn: usize,
    title: Option<usize>,
    authors: Option<usize>,
    description: Option<usize>,
    simple_category: Option<usize>,
    raw_category: Option<usize>,
    dominant_tone: Option<usize>,
    average_rating: Option<usize>,
    ratings_count: Option<usize>,
    thumbnail: Option<usize>,
    emotions: Vec<(&'static str, usize)>,
}

impl Columns {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self> {
        let names: Vec<String> = headers.iter().map(|h| h.trim().to_ascii_lowercase()).collect();
        let find = |name: &str| names.iter().position(|h| h == name);
        let isbn = find("isbn13").or_else(|| find("isbn")).ok_or_else(|| {
            Error::NotFound(format!("identifier column (isbn13 or isbn); available columns: {}", names.join(", ")))
        })?;
        Ok(Self {
            isbn,
            title: find("title"),
            authors: find("authors"),
            description: find("description"),
            simple_category: find("simple_category"),
            raw_category: find("categories"),
            dominant_tone: find("dominant_tone"),
            average_rating: find("average_rating"),
            ratings_count: find("ratings_count"),
            thumbnail: find("thumbnail"),
            emotions: EMOTION_COLUMNS.iter().filter_map(|e| find(*e).map(|i| (*e, i))).collect(),
        })
    }

    fn parse(&self, record: &csv::StringRecord) -> BookRecord {
        let text = |idx: Option<usize>| idx.and_then(|i| cell(record, i));
        let isbn = cell(record, self.isbn).map(normalize_isbn).unwrap_or_default();
        let dominant_tone = text(self.dominant_tone).map(str::to_string);
        let tone_probability = dominant_tone.as_deref().and_then(|tone| {
            self.emotions
                .iter()
                .find(|(label, _)| label.eq_ignore_ascii_case(tone))
                .and_then(|(_, i)| cell(record, *i))
                .and_then(|v| v.parse::<f32>().ok())
                .filter(|p| p.is_finite())
        });
        BookRecord {
            isbn,
            title: text(self.title).unwrap_or_default().to_string(),
            authors: text(self.authors).unwrap_or_default().to_string(),
            description: text(self.description).unwrap_or_default().to_string(),
            simple_category: text(self.simple_category).map(str::to_string),
            raw_category: text(self.raw_category).map(str::to_string),
            dominant_tone,
            tone_probability,
            average_rating: text(self.average_rating).map(parse_rating).unwrap_or(0.0),
            ratings_count: text(self.ratings_count).map(parse_count).unwrap_or(0),
            thumbnail: text(self.thumbnail).map(str::to_string),
        }
    }
}

pub(crate) fn read_csv(path: &Path) -> Result<(Vec<BookRecord>, LoadReport)> {
    let file = File::open(path).map_err(|e| Error::NotFound(format!("metadata table {}: {}", path.display(), e)))?;
    read_records(file)
}

pub(crate) fn read_records<R: Read>(reader: R) -> Result<(Vec<BookRecord>, LoadReport)> {
    let mut reader = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);
    let headers = reader.headers().map_err(|e| Error::Operation(format!("failed to read CSV headers: {e}")))?.clone();
    let columns = Columns::from_headers(&headers)?;

    let mut report = LoadReport::default();
    let mut books = Vec::new();
    for (line, result) in reader.records().enumerate() {
        report.rows += 1;
        match result {
            Ok(record) => books.push(columns.parse(&record)),
            Err(e) if matches!(e.kind(), csv::ErrorKind::Io(_)) => {
                return Err(Error::Operation(format!("failed to read metadata table: {e}")));
            }
            Err(e) => {
                tracing::warn!(line = line + 2, error = %e, "skipping malformed metadata row");
                report.malformed += 1;
            }
        }
    }
    Ok((books, report))
}

/// Trimmed cell contents, `None` when empty or a missing-value marker.
fn cell(record: &csv::StringRecord, idx: usize) -> Option<&str> {
    let v = record.get(idx)?.trim();
    if v.is_empty() || v.eq_ignore_ascii_case("nan") || v.eq_ignore_ascii_case("none") || v.eq_ignore_ascii_case("null") {
        return None;
    }
    Some(v)
}

fn parse_rating(v: &str) -> f32 {
    match v.parse::<f32>() {
        Ok(r) if r.is_finite() => r.clamp(0.0, MAX_RATING),
        _ => 0.0,
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn parse_count(v: &str) -> u64 {
    if let Ok(n) = v.parse::<u64>() { return n; }
    match v.parse::<f64>() {
        Ok(n) if n.is_finite() && n >= 0.0 => n as u64,
        _ => 0,
    }
}
