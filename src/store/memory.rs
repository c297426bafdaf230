use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use super::{check_columns, RecordStore, Row, Table};

#[derive(Debug)]
struct Sheet {
    header: Row,
    rows: Vec<Row>,
    // primary key -> position in `rows`
    index: HashMap<String, usize>,
}

impl Sheet {
    fn new(table: Table) -> Self {
        Self {
            header: table.header_row(),
            rows: Vec::new(),
            index: HashMap::new(),
        }
    }

    fn reindex(&mut self) {
        self.index.clear();
        for (pos, row) in self.rows.iter().enumerate() {
            self.index.entry(row[0].clone()).or_insert(pos);
        }
    }
}

/// In-process store keeping rows in insertion order with a primary-key index.
#[derive(Debug, Default)]
pub struct MemoryStore {
    sheets: RwLock<HashMap<Table, Sheet>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn append(&self, table: Table, row: Row) -> anyhow::Result<()> {
        anyhow::ensure!(
            row.len() == table.width(),
            "row has {} cells, table {} expects {}",
            row.len(),
            table.name(),
            table.width()
        );
        let mut sheets = self.sheets.write().await;
        let sheet = sheets.entry(table).or_insert_with(|| {
            debug!(table = table.name(), "initialising table");
            Sheet::new(table)
        });
        // Later duplicates stay reachable by scan but lookups resolve to the first one.
        let pos = sheet.rows.len();
        sheet.index.entry(row[0].clone()).or_insert(pos);
        sheet.rows.push(row);
        Ok(())
    }

    async fn scan_all(&self, table: Table) -> anyhow::Result<Vec<Row>> {
        let sheets = self.sheets.read().await;
        Ok(sheets
            .get(&table)
            .map(|s| s.rows.clone())
            .unwrap_or_default())
    }

    async fn update_fields(
        &self,
        table: Table,
        key: &str,
        fields: &[(usize, String)],
    ) -> anyhow::Result<bool> {
        check_columns(table, fields)?;
        let mut sheets = self.sheets.write().await;
        let Some(sheet) = sheets.get_mut(&table) else {
            return Ok(false);
        };
        let Some(&pos) = sheet.index.get(key) else {
            return Ok(false);
        };
        let row = &mut sheet.rows[pos];
        for (col, value) in fields {
            row[*col] = value.clone();
        }
        Ok(true)
    }

    async fn delete_row(&self, table: Table, key: &str) -> anyhow::Result<bool> {
        let mut sheets = self.sheets.write().await;
        let Some(sheet) = sheets.get_mut(&table) else {
            return Ok(false);
        };
        let Some(pos) = sheet.index.get(key).copied() else {
            return Ok(false);
        };
        sheet.rows.remove(pos);
        sheet.reindex();
        Ok(true)
    }

    async fn header(&self, table: Table) -> anyhow::Result<Option<Row>> {
        let sheets = self.sheets.read().await;
        Ok(sheets.get(&table).map(|s| s.header.clone()))
    }
}
