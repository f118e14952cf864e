use std::collections::HashMap;
use std::path::Path;

use bookrec_core::config::DataSettings;
use bookrec_core::ident::UNJOINABLE;
use bookrec_core::types::{BookRecord, Isbn};
use bookrec_core::{Error, Result};

use crate::lineage::DataLineage;
use crate::loader::{self, LoadReport};

/// Read-only table of books keyed by normalized identifier.
///
/// Table order is preserved for iteration; when an identifier repeats, the
/// first row wins. The zero key is never stored.
#[derive(Debug, Default, Clone)]
pub struct MetadataStore {
    books: Vec<BookRecord>,
    by_isbn: HashMap<Isbn, usize>,
}

impl MetadataStore {
    /// Pick the snapshot named by `settings` and load it for serving.
    ///
    /// Any failure is an [`Error::Init`]: an engine cannot start without its
    /// metadata table.
    pub fn open(settings: &DataSettings) -> Result<(Self, DataLineage, LoadReport)> {
        let startup = |e: Error| match e {
            Error::Init(_) => e,
            other => Error::init(other),
        };
        let lineage = DataLineage::resolve(settings).map_err(startup)?;
        let (store, report) = Self::load_csv(&lineage.path).map_err(startup)?;
        Ok((store, lineage, report))
    }

    /// Load a CSV snapshot. Bad rows are skipped and counted, never fatal.
    pub fn load_csv(path: &Path) -> Result<(Self, LoadReport)> {
        let (records, mut report) = loader::read_csv(path)?;
        let store = Self::collect(records, &mut report);
        tracing::info!(path = %path.display(), loaded = report.loaded, duplicates = report.duplicates, rejected = report.rejected, malformed = report.malformed, "metadata table loaded");
        Ok((store, report))
    }

    pub fn from_reader<R: std::io::Read>(reader: R) -> Result<(Self, LoadReport)> {
        let (records, mut report) = loader::read_records(reader)?;
        let store = Self::collect(records, &mut report);
        Ok((store, report))
    }

    pub fn from_records<I: IntoIterator<Item = BookRecord>>(records: I) -> Self {
        let mut report = LoadReport::default();
        Self::collect(records, &mut report)
    }

    fn collect<I: IntoIterator<Item = BookRecord>>(records: I, report: &mut LoadReport) -> Self {
        let mut store = Self::default();
        for book in records {
            if book.isbn == UNJOINABLE {
                tracing::warn!(title = %book.title, "rejecting row without a usable identifier");
                report.rejected += 1;
                continue;
            }
            if store.by_isbn.contains_key(&book.isbn) {
                tracing::debug!(isbn = book.isbn, "duplicate identifier, keeping first occurrence");
                report.duplicates += 1;
                continue;
            }
            store.by_isbn.insert(book.isbn, store.books.len());
            store.books.push(book);
        }
        report.loaded = store.books.len();
        store
    }

    pub fn lookup(&self, isbn: Isbn) -> Option<&BookRecord> { self.by_isbn.get(&isbn).map(|&i| &self.books[i]) }

    pub fn contains(&self, isbn: Isbn) -> bool { self.by_isbn.contains_key(&isbn) }

    pub fn len(&self) -> usize { self.books.len() }

    pub fn is_empty(&self) -> bool { self.books.is_empty() }

    /// Books in table order.
    pub fn iter(&self) -> impl Iterator<Item = &BookRecord> { self.books.iter() }
}
