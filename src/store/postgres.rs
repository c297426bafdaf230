use anyhow::Context;
use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, types::Json, Executor, PgPool};
use tokio::sync::OnceCell;
use tracing::debug;

use super::{check_columns, RecordStore, Row, Table};

/// Same DDL the migrator runs; every statement is idempotent.
const SCHEMA: &str = include_str!("../../migrations/20240101000000_sheets.sql");

/// Spreadsheet-shaped store in PostgreSQL: each table is a named sheet with a header
/// row, and every data row is a JSON array of text cells ordered by `row_no`.
#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
    schema: std::sync::Arc<OnceCell<()>>,
}

impl PgStore {
    pub async fn connect(database_url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let db = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .context("connect to database")?;
        Ok(Self::from_pool(db))
    }

    pub fn from_pool(db: PgPool) -> Self {
        Self {
            db,
            schema: Default::default(),
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.db
    }

    async fn ensure_schema(&self) -> anyhow::Result<()> {
        self.schema
            .get_or_try_init(|| async {
                // unprepared, so the whole multi-statement file runs at once
                (&self.db)
                    .execute(SCHEMA)
                    .await
                    .context("create sheet schema")?;
                debug!("sheet schema ready");
                Ok::<_, anyhow::Error>(())
            })
            .await?;
        Ok(())
    }
}

#[async_trait]
impl RecordStore for PgStore {
    async fn append(&self, table: Table, row: Row) -> anyhow::Result<()> {
        anyhow::ensure!(
            row.len() == table.width(),
            "row has {} cells, table {} expects {}",
            row.len(),
            table.name(),
            table.width()
        );
        self.ensure_schema().await?;

        let mut tx = self.db.begin().await.context("begin tx")?;
        sqlx::query(
            r#"
            INSERT INTO sheets (name, header)
            VALUES ($1, $2)
            ON CONFLICT (name) DO NOTHING
            "#,
        )
        .bind(table.name())
        .bind(Json(table.header_row()))
        .execute(&mut *tx)
        .await
        .context("initialise sheet")?;

        sqlx::query(
            r#"
            INSERT INTO sheet_rows (sheet, key, cells)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(table.name())
        .bind(&row[0])
        .bind(Json(&row))
        .execute(&mut *tx)
        .await
        .context("append row")?;
        tx.commit().await.context("commit tx")?;

        debug!(table = table.name(), key = %row[0], "row appended");
        Ok(())
    }

    async fn scan_all(&self, table: Table) -> anyhow::Result<Vec<Row>> {
        self.ensure_schema().await?;
        let rows = sqlx::query_as::<_, (Json<Row>,)>(
            r#"
            SELECT cells
              FROM sheet_rows
             WHERE sheet = $1
             ORDER BY row_no ASC
            "#,
        )
        .bind(table.name())
        .fetch_all(&self.db)
        .await
        .context("scan sheet")?;
        Ok(rows.into_iter().map(|(Json(cells),)| cells).collect())
    }

    async fn update_fields(
        &self,
        table: Table,
        key: &str,
        fields: &[(usize, String)],
    ) -> anyhow::Result<bool> {
        check_columns(table, fields)?;
        self.ensure_schema().await?;

        let mut tx = self.db.begin().await.context("begin tx")?;
        let found = sqlx::query_as::<_, (i64, Json<Row>)>(
            r#"
            SELECT row_no, cells
              FROM sheet_rows
             WHERE sheet = $1 AND key = $2
             ORDER BY row_no ASC
             LIMIT 1
             FOR UPDATE
            "#,
        )
        .bind(table.name())
        .bind(key)
        .fetch_optional(&mut *tx)
        .await
        .context("find row for update")?;

        let Some((row_no, Json(mut cells))) = found else {
            return Ok(false);
        };
        // rows written by older layouts may be narrower
        cells.resize(table.width(), String::new());
        for (col, value) in fields {
            cells[*col] = value.clone();
        }

        sqlx::query(r#"UPDATE sheet_rows SET cells = $1 WHERE row_no = $2"#)
            .bind(Json(&cells))
            .bind(row_no)
            .execute(&mut *tx)
            .await
            .context("update row")?;
        tx.commit().await.context("commit tx")?;
        Ok(true)
    }

    async fn delete_row(&self, table: Table, key: &str) -> anyhow::Result<bool> {
        self.ensure_schema().await?;
        let res = sqlx::query(
            r#"
            DELETE FROM sheet_rows
             WHERE row_no = (
                SELECT row_no
                  FROM sheet_rows
                 WHERE sheet = $1 AND key = $2
                 ORDER BY row_no ASC
                 LIMIT 1
             )
            "#,
        )
        .bind(table.name())
        .bind(key)
        .execute(&self.db)
        .await
        .context("delete row")?;
        Ok(res.rows_affected() > 0)
    }

    async fn header(&self, table: Table) -> anyhow::Result<Option<Row>> {
        self.ensure_schema().await?;
        let header = sqlx::query_as::<_, (Json<Row>,)>(
            r#"SELECT header FROM sheets WHERE name = $1"#,
        )
        .bind(table.name())
        .fetch_optional(&self.db)
        .await
        .context("read sheet header")?;
        Ok(header.map(|(Json(h),)| h))
    }
}
