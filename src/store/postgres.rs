use anyhow::Result;
use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};

use crate::config::TableLayout;
use crate::models::alert::EVENT_HEADER;
use crate::models::responsible::RESP_HEADER;
use crate::store::{queries, RowStore, StoreError};

pub type DbPool = Pool<Postgres>;

/// Production row store backed by a single Postgres cell-grid table. Each
/// named table is a partition of `table_rows` keyed by name and row index.
pub struct PgRowStore {
    pool: DbPool,
}

impl PgRowStore {
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(50)
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    /// Creates the grid table and seeds the header rows for both collaborator
    /// tables. Idempotent; safe to run on every startup.
    pub async fn ensure_schema(&self, layout: &TableLayout) -> Result<()> {
        sqlx::query(queries::CREATE_TABLE_ROWS)
            .execute(&self.pool)
            .await?;

        let headers: [(&str, Vec<String>); 2] = [
            (
                layout.events_table.as_str(),
                EVENT_HEADER.iter().map(|c| c.to_string()).collect(),
            ),
            (
                layout.responsibles_table.as_str(),
                RESP_HEADER.iter().map(|c| c.to_string()).collect(),
            ),
        ];
        for (table, header) in headers {
            sqlx::query(queries::INSERT_HEADER_ROW)
                .bind(table)
                .bind(&header)
                .execute(&self.pool)
                .await?;
        }
        Ok(())
    }
}

fn backend(e: sqlx::Error) -> StoreError {
    StoreError::Backend(e.into())
}

#[async_trait]
impl RowStore for PgRowStore {
    async fn read_all(&self, table: &str) -> Result<Vec<Vec<String>>, StoreError> {
        let rows: Vec<Vec<String>> = sqlx::query_scalar(queries::SELECT_TABLE_ROWS)
            .bind(table)
            .fetch_all(&self.pool)
            .await
            .map_err(backend)?;
        if rows.is_empty() {
            return Err(StoreError::TableNotFound(table.to_string()));
        }
        Ok(rows)
    }

    async fn append(&self, table: &str, row: Vec<String>) -> Result<usize, StoreError> {
        let max: Option<i64> = sqlx::query_scalar(queries::SELECT_MAX_ROW_INDEX)
            .bind(table)
            .fetch_one(&self.pool)
            .await
            .map_err(backend)?;
        let next = match max {
            Some(max) => max + 1,
            None => return Err(StoreError::TableNotFound(table.to_string())),
        };

        sqlx::query(queries::INSERT_ROW)
            .bind(table)
            .bind(next)
            .bind(&row)
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        Ok(next as usize)
    }

    async fn set_cell(
        &self,
        table: &str,
        row: usize,
        col: usize,
        value: &str,
    ) -> Result<(), StoreError> {
        // Postgres arrays are 1-based.
        let result = sqlx::query(queries::UPDATE_CELL)
            .bind(table)
            .bind(row as i64)
            .bind(col as i32 + 1)
            .bind(value)
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        if result.rows_affected() == 0 {
            return Err(StoreError::RowOutOfRange {
                table: table.to_string(),
                row,
            });
        }
        Ok(())
    }
}
