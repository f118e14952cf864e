use anyhow::{Result, anyhow};
use arrow_array::{FixedSizeListArray, RecordBatch, RecordBatchIterator, StringArray};
use indicatif::{ProgressBar, ProgressStyle};
use lancedb::Connection;
use std::sync::Arc;

use bookrec_core::types::{BookRecord, IndexedDocument};
use bookrec_core::Embedder;

use crate::schema::build_books_schema;
use crate::table::{open_db, table_exists};

const BATCH_SIZE: usize = 256;

/// Offline writer: embeds book descriptions and appends them to a LanceDB table.
pub struct BookIndexWriter<'e> {
    db: Connection,
    table_name: String,
    embedder: &'e dyn Embedder,
}

impl<'e> BookIndexWriter<'e> {
    pub async fn new(db_uri: &str, table_name: &str, embedder: &'e dyn Embedder) -> Result<Self> {
        let db = open_db(db_uri).await?;
        Ok(Self { db, table_name: table_name.to_string(), embedder })
    }

    pub async fn table_exists(&self) -> Result<bool> { table_exists(&self.db, &self.table_name).await }

    /// Embed and write `books`; returns the number of rows written.
    pub async fn index_books(&self, books: &[BookRecord]) -> Result<usize> {
        if books.is_empty() { tracing::info!("no books to index"); return Ok(0); }
        tracing::info!(books = books.len(), table = %self.table_name, "indexing books into LanceDB");
        let pb = ProgressBar::new(books.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} books ({percent}%) {msg}")?
                .progress_chars("#>-"),
        );
        let mut written = 0usize;
        for batch in books.chunks(BATCH_SIZE) {
            let texts: Vec<String> = batch.iter().map(BookRecord::embedding_text).collect();
            let vectors = self.embedder.embed_batch(&texts)?;
            if vectors.len() != batch.len() {
                return Err(anyhow!("embedder returned {} vectors for {} texts", vectors.len(), batch.len()));
            }
            let docs: Vec<IndexedDocument> = batch.iter().map(IndexedDocument::from).collect();
            self.insert_batch(&docs, vectors).await?;
            written += batch.len();
            pb.set_position(written as u64);
        }
        pb.finish_with_message("done");
        tracing::info!(written, "LanceDB indexing completed");
        Ok(written)
    }

    async fn insert_batch(&self, docs: &[IndexedDocument], vectors: Vec<Vec<f32>>) -> Result<()> {
        let record_batch = self.to_record_batch(docs, vectors)?;
        let schema = record_batch.schema();
        let reader = Box::new(RecordBatchIterator::new(vec![Ok(record_batch)].into_iter(), schema));
        if self.table_exists().await? {
            self.db.open_table(&self.table_name).execute().await?.add(reader).execute().await?;
        } else {
            self.db.create_table(&self.table_name, reader).execute().await?;
        }
        Ok(())
    }

    fn to_record_batch(&self, docs: &[IndexedDocument], vectors: Vec<Vec<f32>>) -> Result<RecordBatch> {
        let dim = self.embedder.dim();
        if let Some(bad) = vectors.iter().find(|v| v.len() != dim) {
            return Err(anyhow!("embedding has {} dims, expected {}", bad.len(), dim));
        }
        let schema = build_books_schema(i32::try_from(dim)?);
        let isbns: Vec<&str> = docs.iter().map(|d| d.isbn.as_str()).collect();
        let titles: Vec<&str> = docs.iter().map(|d| d.title.as_str()).collect();
        let authors: Vec<&str> = docs.iter().map(|d| d.authors.as_str()).collect();
        let descriptions: Vec<&str> = docs.iter().map(|d| d.description.as_str()).collect();
        let vectors = vectors.into_iter().map(|v| Some(v.into_iter().map(Some).collect::<Vec<_>>()));
        let record_batch = RecordBatch::try_new(schema, vec![
            Arc::new(StringArray::from(isbns)),
            Arc::new(StringArray::from(titles)),
            Arc::new(StringArray::from(authors)),
            Arc::new(StringArray::from(descriptions)),
            Arc::new(FixedSizeListArray::from_iter_primitive::<arrow_array::types::Float32Type, _, _>(vectors, i32::try_from(dim)?)),
        ])?;
        Ok(record_batch)
    }
}
