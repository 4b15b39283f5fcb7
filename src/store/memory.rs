use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

use crate::config::TableLayout;
use crate::models::alert::EVENT_HEADER;
use crate::models::responsible::RESP_HEADER;
use crate::store::{RowStore, StoreError};

/// In-memory row store for dev mode and tests. Data is lost on restart.
#[derive(Default)]
pub struct InMemoryRowStore {
    tables: RwLock<HashMap<String, Vec<Vec<String>>>>,
}

impl InMemoryRowStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Both collaborator tables with their header rows already in place.
    pub fn seeded(layout: &TableLayout) -> Self {
        let store = Self::new();
        store.create_table(&layout.events_table, &EVENT_HEADER);
        store.create_table(&layout.responsibles_table, &RESP_HEADER);
        store
    }

    pub fn create_table(&self, name: &str, header: &[&str]) {
        let header = header.iter().map(|c| c.to_string()).collect();
        self.tables
            .write()
            .insert(name.to_string(), vec![header]);
    }

    /// Test helper mirroring manual data entry in the backing table.
    pub fn push_row(&self, table: &str, row: Vec<String>) {
        let mut tables = self.tables.write();
        tables.get_mut(table).expect("table exists").push(row);
    }
}

#[async_trait]
impl RowStore for InMemoryRowStore {
    async fn read_all(&self, table: &str) -> Result<Vec<Vec<String>>, StoreError> {
        self.tables
            .read()
            .get(table)
            .cloned()
            .ok_or_else(|| StoreError::TableNotFound(table.to_string()))
    }

    async fn append(&self, table: &str, row: Vec<String>) -> Result<usize, StoreError> {
        let mut tables = self.tables.write();
        let rows = tables
            .get_mut(table)
            .ok_or_else(|| StoreError::TableNotFound(table.to_string()))?;
        rows.push(row);
        Ok(rows.len() - 1)
    }

    async fn set_cell(
        &self,
        table: &str,
        row: usize,
        col: usize,
        value: &str,
    ) -> Result<(), StoreError> {
        let mut tables = self.tables.write();
        let rows = tables
            .get_mut(table)
            .ok_or_else(|| StoreError::TableNotFound(table.to_string()))?;
        let cells = rows.get_mut(row).ok_or_else(|| StoreError::RowOutOfRange {
            table: table.to_string(),
            row,
        })?;
        if col >= cells.len() {
            cells.resize(col + 1, String::new());
        }
        cells[col] = value.to_string();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> InMemoryRowStore {
        let store = InMemoryRowStore::new();
        store.create_table("queimadas", &EVENT_HEADER);
        store
    }

    #[tokio::test]
    async fn test_append_indexes_follow_header() {
        let store = store();
        let first = store
            .append("queimadas", vec!["EEEG".into()])
            .await
            .unwrap();
        let second = store
            .append("queimadas", vec!["PARNASO".into()])
            .await
            .unwrap();
        assert_eq!((first, second), (1, 2));

        let rows = store.read_all("queimadas").await.unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0][0], "region");
    }

    #[tokio::test]
    async fn test_set_cell_overwrites() {
        let store = store();
        let row = store
            .append("queimadas", vec!["EEEG".into(), String::new()])
            .await
            .unwrap();
        store.set_cell("queimadas", row, 1, "notified").await.unwrap();
        let rows = store.read_all("queimadas").await.unwrap();
        assert_eq!(rows[row][1], "notified");
    }

    #[tokio::test]
    async fn test_missing_table_is_reported() {
        let store = store();
        let err = store.read_all("nope").await.unwrap_err();
        assert!(matches!(err, StoreError::TableNotFound(name) if name == "nope"));
    }

    #[tokio::test]
    async fn test_set_cell_out_of_range() {
        let store = store();
        let err = store.set_cell("queimadas", 7, 0, "x").await.unwrap_err();
        assert!(matches!(err, StoreError::RowOutOfRange { row: 7, .. }));
    }
}
