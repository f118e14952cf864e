use arrow_schema::{DataType, Field, Schema};
use std::sync::Arc;

pub const ISBN_COL: &str = "isbn";
pub const TITLE_COL: &str = "title";
pub const AUTHORS_COL: &str = "authors";
pub const DESCRIPTION_COL: &str = "description";
pub const VECTOR_COL: &str = "vector";
/// Added by LanceDB to vector search results.
pub const DISTANCE_COL: &str = "_distance";

pub fn build_books_schema(dim: i32) -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new(ISBN_COL, DataType::Utf8, false),
        Field::new(TITLE_COL, DataType::Utf8, false),
        Field::new(AUTHORS_COL, DataType::Utf8, false),
        Field::new(DESCRIPTION_COL, DataType::Utf8, false),
        Field::new(VECTOR_COL, DataType::FixedSizeList(Arc::new(Field::new("item", DataType::Float32, true)), dim), true),
    ]))
}
