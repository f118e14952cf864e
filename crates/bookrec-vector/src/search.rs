use anyhow::{Result, anyhow};
use arrow_array::{Array, Float32Array, RecordBatch, StringArray};
use futures::TryStreamExt;
use lancedb::query::{ExecutableQuery, QueryBase};
use lancedb::{DistanceType, Table};
use std::path::Path;
use tokio::runtime::Runtime;

use bookrec_core::types::{IndexHit, IndexedDocument};
use bookrec_core::{Embedder, Error, SimilarityIndex};

use crate::schema::{AUTHORS_COL, DESCRIPTION_COL, DISTANCE_COL, ISBN_COL, TITLE_COL};
use crate::table::{open_db, table_exists};

/// LanceDB-backed similarity index with a blocking facade.
///
/// Owns its tokio runtime, so `search` must not be called from inside
/// another async runtime.
pub struct LanceBookIndex {
    runtime: Runtime,
    table: Table,
    embedder: Box<dyn Embedder>,
}

impl LanceBookIndex {
    /// Open an existing table. A missing directory or table is an
    /// [`Error::Init`]: the index has to be built before serving.
    pub fn open(db_dir: &Path, table_name: &str, embedder: Box<dyn Embedder>) -> bookrec_core::Result<Self> {
        if !db_dir.is_dir() {
            return Err(Error::Init(format!("vector index directory {} does not exist", db_dir.display())));
        }
        let runtime = Runtime::new().map_err(Error::init)?;
        let uri = db_dir.to_string_lossy().to_string();
        let table = runtime
            .block_on(async {
                let db = open_db(&uri).await?;
                if !table_exists(&db, table_name).await? {
                    return Err(anyhow!("table '{}' not found in {}", table_name, uri));
                }
                Ok(db.open_table(table_name).execute().await?)
            })
            .map_err(|e| Error::init(format!("{e:#}")))?;
        tracing::info!(path = %db_dir.display(), table = table_name, "opened LanceDB index");
        Ok(Self { runtime, table, embedder })
    }
}

impl SimilarityIndex for LanceBookIndex {
    fn search(&self, query: &str, fan_out: usize) -> Result<Vec<IndexHit>> {
        let query_embedding = self.embedder.embed(query)?;
        let batches: Vec<RecordBatch> = self.runtime.block_on(async {
            self.table
                .vector_search(query_embedding)?
                .distance_type(DistanceType::Cosine)
                .limit(fan_out)
                .execute()
                .await?
                .try_collect::<Vec<_>>()
                .await
                .map_err(anyhow::Error::from)
        })?;
        let mut hits = Vec::new();
        for batch in &batches { decode_hits(batch, &mut hits)?; }
        Ok(hits)
    }
}

fn string_col<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a StringArray> {
    batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<StringArray>())
        .ok_or_else(|| anyhow!("search result has no utf8 column '{}'", name))
}

fn decode_hits(batch: &RecordBatch, out: &mut Vec<IndexHit>) -> Result<()> {
    let isbn = string_col(batch, ISBN_COL)?;
    let title = string_col(batch, TITLE_COL)?;
    let authors = string_col(batch, AUTHORS_COL)?;
    let description = string_col(batch, DESCRIPTION_COL)?;
    let distance = batch
        .column_by_name(DISTANCE_COL)
        .and_then(|c| c.as_any().downcast_ref::<Float32Array>())
        .ok_or_else(|| anyhow!("search result has no '{}' column", DISTANCE_COL))?;
    let text = |col: &StringArray, i: usize| if col.is_null(i) { String::new() } else { col.value(i).to_string() };
    for i in 0..batch.num_rows() {
        let document = IndexedDocument { isbn: text(isbn, i), title: text(title, i), authors: text(authors, i), description: text(description, i) };
        let distance = if distance.is_null(i) { f32::NAN } else { distance.value(i) };
        out.push(IndexHit { document, distance });
    }
    Ok(())
}
