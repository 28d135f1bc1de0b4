//! Source connections
//!
//! Implementations:
//! - SqliteSource: database file, opened read-only
//! - PostgresSource: network database reached through `DATABASE_URL`

pub mod catalog;
pub mod decode;
pub mod postgres;
pub mod sqlite;

pub use catalog::{ColumnKind, Entity, SourceColumn, SourceTable, CATALOG};
pub use decode::RawRow;
pub use postgres::PostgresSource;
pub use sqlite::SqliteSource;

use crate::config::SourceConfig;
use crate::error::Result;
use async_trait::async_trait;
use tracing::info;

/// Identifier convention of a source database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// `"Order Details"."OrderID"`, as in the classic Northwind scripts
    Pascal,
    /// `order_details.order_id`, as in the PostgreSQL Northwind port
    Snake,
}

impl Dialect {
    pub fn table_name(&self, table: &SourceTable) -> String {
        match self {
            Dialect::Pascal => table.name.to_string(),
            Dialect::Snake => catalog::snake_case(table.name),
        }
    }

    pub fn column_name(&self, column: &str) -> String {
        match self {
            Dialect::Pascal => column.to_string(),
            Dialect::Snake => catalog::snake_case(column),
        }
    }

    /// Reads every catalog column as text, ordered by the natural key.
    pub fn select_sql(&self, table: &SourceTable) -> String {
        let columns = table
            .columns
            .iter()
            .map(|c| format!("CAST({} AS TEXT)", quote_ident(&self.column_name(c.name))))
            .collect::<Vec<_>>()
            .join(", ");
        let order_by = table
            .key
            .iter()
            .map(|k| quote_ident(&self.column_name(k)))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "SELECT {} FROM {} ORDER BY {}",
            columns,
            quote_ident(&self.table_name(table)),
            order_by
        )
    }

    pub fn count_sql(&self, table: &SourceTable) -> String {
        format!("SELECT COUNT(*) FROM {}", quote_ident(&self.table_name(table)))
    }
}

pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// A live, read-only connection to the Northwind source.
#[async_trait]
pub trait SourceConnection: Send {
    /// Human-readable location, without credentials.
    fn describe(&self) -> String;

    fn dialect(&self) -> Dialect;

    /// Column names of `table` as the source spells them, `None` if the
    /// table does not exist.
    async fn table_columns(&mut self, table: &SourceTable) -> Result<Option<Vec<String>>>;

    /// All rows of `table`, one text cell per catalog column, in catalog order.
    async fn fetch_rows(&mut self, table: &SourceTable) -> Result<Vec<RawRow>>;

    async fn row_count(&mut self, table: &SourceTable) -> Result<i64>;
}

/// Opens the configured source.
pub async fn connect(config: &SourceConfig) -> Result<Box<dyn SourceConnection>> {
    info!("Connecting to {}", config.redacted());
    let connection: Box<dyn SourceConnection> = match config {
        SourceConfig::Sqlite { path } => Box::new(SqliteSource::open(path)?),
        SourceConfig::Postgres { url } => Box::new(PostgresSource::connect(url).await?),
    };
    info!("Connected to {}", connection.describe());
    Ok(connection)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::catalog::ORDER_DETAILS;

    #[test]
    fn select_sql_follows_dialect() {
        assert_eq!(
            Dialect::Pascal.select_sql(&ORDER_DETAILS),
            "SELECT CAST(\"OrderID\" AS TEXT), CAST(\"ProductID\" AS TEXT), CAST(\"UnitPrice\" AS TEXT), \
             CAST(\"Quantity\" AS TEXT), CAST(\"Discount\" AS TEXT) FROM \"Order Details\" ORDER BY \"OrderID\", \"ProductID\""
        );
        assert!(Dialect::Snake
            .select_sql(&ORDER_DETAILS)
            .ends_with("FROM \"order_details\" ORDER BY \"order_id\", \"product_id\""));
    }

    #[test]
    fn quote_ident_escapes_quotes() {
        assert_eq!(quote_ident("a\"b"), "\"a\"\"b\"");
    }
}
