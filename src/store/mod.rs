use async_trait::async_trait;
use thiserror::Error;

pub mod memory;
pub mod postgres;
pub mod queries;

pub use memory::InMemoryRowStore;
pub use postgres::PgRowStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("table not found: {0}")]
    TableNotFound(String),
    #[error("row {row} out of range for table {table}")]
    RowOutOfRange { table: String, row: usize },
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

/// Append-only tabular collaborator. Row 0 is always the header; data rows
/// follow in insertion order and their index is the record identity used by
/// `set_cell` and reported back to callers. Implementations give no
/// transaction or locking guarantee; the processor serializes where needed.
#[async_trait]
pub trait RowStore: Send + Sync {
    /// Every row of `table`, header included, in stored order.
    async fn read_all(&self, table: &str) -> Result<Vec<Vec<String>>, StoreError>;

    /// Appends `row` and returns its index.
    async fn append(&self, table: &str, row: Vec<String>) -> Result<usize, StoreError>;

    async fn set_cell(
        &self,
        table: &str,
        row: usize,
        col: usize,
        value: &str,
    ) -> Result<(), StoreError>;
}
