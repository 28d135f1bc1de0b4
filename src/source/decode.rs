//! Text cells -> typed polars columns
//!
//! Every backend hands rows over as optional strings; decoding is shared so
//! the file and network sources type their data identically.

use crate::error::Result;
use crate::source::catalog::{ColumnKind, SourceTable};
use chrono::NaiveDate;
use polars::prelude::*;
use tracing::debug;

pub type RawRow = Vec<Option<String>>;

fn clean(cell: Option<&str>) -> Option<&str> {
    cell.map(str::trim).filter(|s| !s.is_empty())
}

pub fn parse_integer(cell: Option<&str>) -> Option<i64> {
    let s = clean(cell)?;
    if let Ok(v) = s.parse::<i64>() {
        return Some(v);
    }
    // "10.0" is how some engines render an integral REAL
    s.parse::<f64>()
        .ok()
        .filter(|f| f.is_finite() && f.fract() == 0.0)
        .map(|f| f as i64)
}

pub fn parse_float(cell: Option<&str>) -> Option<f64> {
    clean(cell)?.parse::<f64>().ok().filter(|f| f.is_finite())
}

pub fn parse_date(cell: Option<&str>) -> Option<NaiveDate> {
    let s = clean(cell)?;
    let day = s.get(..10).unwrap_or(s);
    NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(day, "%Y/%m/%d"))
        .ok()
}

pub fn parse_flag(cell: Option<&str>) -> Option<bool> {
    let s = clean(cell)?;
    match s.to_ascii_lowercase().as_str() {
        "1" | "true" | "t" | "yes" | "y" | "-1" => Some(true),
        "0" | "false" | "f" | "no" | "n" => Some(false),
        _ => None,
    }
}

pub fn parse_text(cell: Option<&str>) -> Option<String> {
    clean(cell).map(str::to_string)
}

/// Builds a frame with one typed column per catalog column. `rows` must be in
/// catalog column order.
pub fn rows_to_frame(table: &SourceTable, rows: &[RawRow]) -> Result<DataFrame> {
    let mut columns = Vec::with_capacity(table.columns.len());
    for (idx, column) in table.columns.iter().enumerate() {
        let cells = rows.iter().map(|row| row.get(idx).and_then(|c| c.as_deref()));
        let mut rejected = 0usize;
        let series = match column.kind {
            ColumnKind::Integer => {
                let values: Vec<Option<i64>> = cells
                    .map(|c| {
                        let v = parse_integer(c);
                        if v.is_none() && clean(c).is_some() {
                            rejected += 1;
                        }
                        v
                    })
                    .collect();
                Series::new(column.name, values)
            }
            ColumnKind::Float => {
                let values: Vec<Option<f64>> = cells
                    .map(|c| {
                        let v = parse_float(c);
                        if v.is_none() && clean(c).is_some() {
                            rejected += 1;
                        }
                        v
                    })
                    .collect();
                Series::new(column.name, values)
            }
            ColumnKind::Date => {
                let values: Vec<Option<NaiveDate>> = cells
                    .map(|c| {
                        let v = parse_date(c);
                        if v.is_none() && clean(c).is_some() {
                            rejected += 1;
                        }
                        v
                    })
                    .collect();
                Series::new(column.name, values)
            }
            ColumnKind::Flag => {
                let values: Vec<Option<bool>> = cells
                    .map(|c| {
                        let v = parse_flag(c);
                        if v.is_none() && clean(c).is_some() {
                            rejected += 1;
                        }
                        v
                    })
                    .collect();
                Series::new(column.name, values)
            }
            ColumnKind::Text => {
                let values: Vec<Option<String>> = cells.map(parse_text).collect();
                Series::new(column.name, values)
            }
        };
        if rejected > 0 {
            debug!("{}.{}: {} unparseable cell(s) read as null", table.name, column.name, rejected);
        }
        columns.push(series);
    }
    Ok(DataFrame::new(columns)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::catalog::ORDERS;

    #[test]
    fn integers_accept_integral_reals() {
        assert_eq!(parse_integer(Some(" 42 ")), Some(42));
        assert_eq!(parse_integer(Some("10.0")), Some(10));
        assert_eq!(parse_integer(Some("10.5")), None);
        assert_eq!(parse_integer(Some("")), None);
        assert_eq!(parse_integer(None), None);
    }

    #[test]
    fn dates_ignore_time_part() {
        let expected = NaiveDate::from_ymd_opt(1996, 7, 4);
        assert_eq!(parse_date(Some("1996-07-04")), expected);
        assert_eq!(parse_date(Some("1996-07-04 00:00:00.000")), expected);
        assert_eq!(parse_date(Some("1996/07/04")), expected);
        assert_eq!(parse_date(Some("July 4th")), None);
    }

    #[test]
    fn flags_accept_common_spellings() {
        assert_eq!(parse_flag(Some("1")), Some(true));
        assert_eq!(parse_flag(Some("FALSE")), Some(false));
        assert_eq!(parse_flag(Some("maybe")), None);
    }

    #[test]
    fn frame_has_typed_columns_in_catalog_order() {
        let rows = vec![
            vec![
                Some("10248".to_string()),
                Some(" VINET ".to_string()),
                Some("5".to_string()),
                Some("1996-07-04".to_string()),
                Some("3".to_string()),
                Some("32.38".to_string()),
            ],
            vec![Some("10249".to_string()), None, Some("x".to_string()), None, None, None],
        ];
        let df = rows_to_frame(&ORDERS, &rows).unwrap();
        assert_eq!(df.get_column_names(), vec!["OrderID", "CustomerID", "EmployeeID", "OrderDate", "ShipVia", "Freight"]);
        assert_eq!(df.column("OrderID").unwrap().dtype(), &DataType::Int64);
        assert_eq!(df.column("OrderDate").unwrap().dtype(), &DataType::Date);
        assert_eq!(df.column("CustomerID").unwrap().str().unwrap().get(0), Some("VINET"));
        assert_eq!(df.column("EmployeeID").unwrap().i64().unwrap().get(1), None);
        assert_eq!(df.column("Freight").unwrap().f64().unwrap().get(0), Some(32.38));
    }
}
