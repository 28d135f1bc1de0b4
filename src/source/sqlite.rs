//! SQLite file source

use crate::error::{EtlError, Result};
use crate::source::{quote_ident, Dialect, RawRow, SourceConnection, SourceTable};
use async_trait::async_trait;
use rusqlite::{Connection, OpenFlags};
use std::path::{Path, PathBuf};
use tracing::debug;

pub struct SqliteSource {
    path: PathBuf,
    conn: Connection,
}

impl SqliteSource {
    pub fn open(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(EtlError::Connection(format!(
                "Database file not found: {}",
                path.display()
            )));
        }
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| EtlError::Connection(format!("Failed to open {}: {}", path.display(), e)))?;
        Ok(Self {
            path: path.to_path_buf(),
            conn,
        })
    }
}

#[async_trait]
impl SourceConnection for SqliteSource {
    fn describe(&self) -> String {
        format!("sqlite:{}", self.path.display())
    }

    fn dialect(&self) -> Dialect {
        Dialect::Pascal
    }

    async fn table_columns(&mut self, table: &SourceTable) -> Result<Option<Vec<String>>> {
        let sql = format!("PRAGMA table_info({})", quote_ident(&self.dialect().table_name(table)));
        let mut stmt = self.conn.prepare(&sql)?;
        let columns = stmt
            .query_map([], |row| row.get::<_, String>(1))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(if columns.is_empty() { None } else { Some(columns) })
    }

    async fn fetch_rows(&mut self, table: &SourceTable) -> Result<Vec<RawRow>> {
        let sql = self.dialect().select_sql(table);
        debug!("{}", sql);
        let width = table.columns.len();
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], |row| {
                (0..width)
                    .map(|i| row.get::<_, Option<String>>(i))
                    .collect::<rusqlite::Result<RawRow>>()
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    async fn row_count(&mut self, table: &SourceTable) -> Result<i64> {
        let sql = self.dialect().count_sql(table);
        Ok(self.conn.query_row(&sql, [], |row| row.get(0))?)
    }
}
