//! PostgreSQL network source

use crate::error::{EtlError, Result};
use crate::source::{Dialect, RawRow, SourceConnection, SourceTable};
use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::Row;
use std::time::Duration;
use tracing::debug;

pub struct PostgresSource {
    pool: PgPool,
    location: String,
}

impl PostgresSource {
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(1)
            .acquire_timeout(Duration::from_secs(10))
            .connect(database_url)
            .await
            .map_err(|e| EtlError::Connection(format!("Failed to connect: {}", e)))?;

        sqlx::query("SELECT 1")
            .execute(&pool)
            .await
            .map_err(|e| EtlError::Connection(format!("Connection probe failed: {}", e)))?;

        let location = database_url.split('@').nth(1).unwrap_or("database").to_string();
        Ok(Self { pool, location })
    }
}

#[async_trait]
impl SourceConnection for PostgresSource {
    fn describe(&self) -> String {
        format!("postgres:{}", self.location)
    }

    fn dialect(&self) -> Dialect {
        Dialect::Snake
    }

    async fn table_columns(&mut self, table: &SourceTable) -> Result<Option<Vec<String>>> {
        let rows = sqlx::query(
            "SELECT column_name::text FROM information_schema.columns
             WHERE table_schema = current_schema() AND table_name = $1
             ORDER BY ordinal_position",
        )
        .bind(self.dialect().table_name(table))
        .fetch_all(&self.pool)
        .await?;

        let columns = rows
            .iter()
            .map(|row| row.try_get::<String, _>(0))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(if columns.is_empty() { None } else { Some(columns) })
    }

    async fn fetch_rows(&mut self, table: &SourceTable) -> Result<Vec<RawRow>> {
        let sql = self.dialect().select_sql(table);
        debug!("{}", sql);
        let width = table.columns.len();
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;

        let mut out = Vec::with_capacity(rows.len());
        for row in &rows {
            let mut cells = Vec::with_capacity(width);
            for i in 0..width {
                cells.push(row.try_get::<Option<String>, _>(i)?);
            }
            out.push(cells);
        }
        Ok(out)
    }

    async fn row_count(&mut self, table: &SourceTable) -> Result<i64> {
        let sql = self.dialect().count_sql(table);
        let (count,): (i64,) = sqlx::query_as(&sql).fetch_one(&self.pool).await?;
        Ok(count)
    }
}
