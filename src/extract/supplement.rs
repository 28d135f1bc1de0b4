//! Supplementary source: per-table CSV exports
//!
//! A file named after the table (`Orders.csv`, `Order Details.csv` or
//! `Order_Details.csv`) contributes extra rows. Header names are matched with
//! spaces removed. Order identifiers are shifted by [`ORDER_ID_OFFSET`].

use crate::error::{EtlError, Result};
use crate::source::catalog::SourceTable;
use crate::source::decode::{rows_to_frame, RawRow};
use csv::ReaderBuilder;
use polars::prelude::*;
use std::path::{Path, PathBuf};

pub const ORDER_ID_OFFSET: i64 = 200_000;

pub fn find_file(table: &SourceTable, dir: &Path) -> Option<PathBuf> {
    table
        .file_stems()
        .into_iter()
        .map(|stem| dir.join(format!("{}.csv", stem)))
        .find(|path| path.is_file())
}

/// Rows of `table` from `dir`, or `None` if no export exists.
pub fn load(table: &SourceTable, dir: &Path) -> Result<Option<DataFrame>> {
    let Some(path) = find_file(table, dir) else {
        return Ok(None);
    };

    let rows = read_rows(table, &path)?;
    let frame = rows_to_frame(table, &rows)?;
    if !table.carries_order_id() {
        return Ok(Some(frame));
    }

    let shifted = frame
        .lazy()
        .filter(col("OrderID").is_not_null())
        .with_column((col("OrderID") + lit(ORDER_ID_OFFSET)).alias("OrderID"))
        .collect()?;
    Ok(Some(shifted))
}

fn read_rows(table: &SourceTable, path: &Path) -> Result<Vec<RawRow>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;

    let headers = rdr
        .headers()?
        .iter()
        .map(|h| h.trim().replace(' ', ""))
        .collect::<Vec<_>>();

    let positions = table
        .columns
        .iter()
        .map(|column| {
            headers
                .iter()
                .position(|h| h.eq_ignore_ascii_case(column.name))
                .ok_or_else(|| EtlError::MissingColumn {
                    table: path.display().to_string(),
                    column: column.name.to_string(),
                })
        })
        .collect::<Result<Vec<_>>>()?;

    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record?;
        rows.push(
            positions
                .iter()
                .map(|&idx| record.get(idx).map(str::to_string))
                .collect(),
        );
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::catalog::{ORDER_DETAILS, SHIPPERS};
    use std::fs;

    #[test]
    fn order_lines_are_shifted_and_headers_normalised() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("Order_Details.csv"),
            "Order ID,Product ID,Unit Price,Quantity,Discount\n10248,11,14,12,0\n,42,9.8,10,0\n",
        )
        .unwrap();

        let df = load(&ORDER_DETAILS, dir.path()).unwrap().unwrap();
        assert_eq!(df.height(), 1);
        assert_eq!(df.column("OrderID").unwrap().i64().unwrap().get(0), Some(210_248));
        assert_eq!(df.column("UnitPrice").unwrap().f64().unwrap().get(0), Some(14.0));
    }

    #[test]
    fn missing_export_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load(&SHIPPERS, dir.path()).unwrap().is_none());
    }

    #[test]
    fn missing_column_in_export_is_a_schema_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("Shippers.csv"), "ShipperID,CompanyName\n1,Speedy Express\n").unwrap();
        let err = load(&SHIPPERS, dir.path()).unwrap_err();
        assert!(err.is_schema_error());
    }
}
