use async_trait::async_trait;

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// One stored row: text cells in column order. Column 0 is the primary key.
pub type Row = Vec<String>;

/// The two tables of the vault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Users,
    Projects,
}

impl Table {
    pub fn name(self) -> &'static str {
        match self {
            Table::Users => "Users",
            Table::Projects => "Projects",
        }
    }

    /// Header row written when the table is first created.
    pub fn header(self) -> &'static [&'static str] {
        match self {
            Table::Users => &["ID", "Name", "Email", "Password", "CreatedAt"],
            Table::Projects => &[
                "ID",
                "UserID",
                "Name",
                "Category",
                "Version",
                "Thumbnail",
                "FrontendCode",
                "BackendCode",
                "URL",
                "Remarks",
                "IsPrivate",
                "CreatedAt",
                "UpdatedAt",
            ],
        }
    }

    pub fn width(self) -> usize {
        self.header().len()
    }

    fn header_row(self) -> Row {
        self.header().iter().map(|c| c.to_string()).collect()
    }
}

/// Tabular persistence behind the action handlers.
///
/// Tables are created lazily with their header on the first `append`; reading a
/// table that was never written yields no rows.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn append(&self, table: Table, row: Row) -> anyhow::Result<()>;

    /// All data rows in insertion order, header excluded.
    async fn scan_all(&self, table: Table) -> anyhow::Result<Vec<Row>>;

    /// Overwrite the given `(column, value)` cells of the row keyed by `key`.
    /// Returns `false` when no such row exists.
    async fn update_fields(
        &self,
        table: Table,
        key: &str,
        fields: &[(usize, String)],
    ) -> anyhow::Result<bool>;

    /// Returns `false` when no such row exists.
    async fn delete_row(&self, table: Table, key: &str) -> anyhow::Result<bool>;

    /// Header row, if the table has been initialised.
    async fn header(&self, table: Table) -> anyhow::Result<Option<Row>>;
}

fn check_columns(table: Table, fields: &[(usize, String)]) -> anyhow::Result<()> {
    if fields.iter().any(|(col, _)| *col == 0) {
        anyhow::bail!("primary key of table {} cannot be updated", table.name());
    }
    if let Some((col, _)) = fields.iter().find(|(col, _)| *col >= table.width()) {
        anyhow::bail!(
            "column {} out of range for table {} ({} columns)",
            col,
            table.name(),
            table.width()
        );
    }
    Ok(())
}

/// Cell at `col`, or an empty string for rows narrower than the table.
pub(crate) fn cell(row: &[String], col: usize) -> String {
    row.get(col).cloned().unwrap_or_default()
}
