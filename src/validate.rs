//! Post-load validation of the written star schema
//!
//! Read-only: files are checked, never repaired. A table check covers
//! presence, row count and required columns; integrity checks then cover
//! dimension key uniqueness and fact foreign keys across files.

use crate::error::Result;
use crate::load::read_table;
use crate::star::OutputTable;
use polars::prelude::*;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const PREVIEW_ROWS: usize = 3;
const PREVIEW_COLUMNS: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum CheckOutcome {
    Passed,
    MissingFile,
    Empty,
    MissingColumns(Vec<String>),
    Unreadable(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct TableCheck {
    pub table: OutputTable,
    pub path: PathBuf,
    pub outcome: CheckOutcome,
    pub rows: usize,
    pub columns: usize,
    pub preview_columns: Vec<String>,
    pub preview: Vec<Vec<String>>,
}

impl TableCheck {
    pub fn passed(&self) -> bool {
        self.outcome == CheckOutcome::Passed
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub output_dir: PathBuf,
    pub tables: Vec<TableCheck>,
    pub integrity_issues: Vec<String>,
}

impl ValidationReport {
    pub fn passed(&self) -> bool {
        self.tables.iter().all(TableCheck::passed) && self.integrity_issues.is_empty()
    }

    pub fn check(&self, table: OutputTable) -> Option<&TableCheck> {
        self.tables.iter().find(|c| c.table == table)
    }
}

pub struct Validator {
    output_dir: PathBuf,
}

impl Validator {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn run(&self) -> Result<ValidationReport> {
        let mut tables = Vec::with_capacity(OutputTable::ALL.len());
        let mut frames: BTreeMap<OutputTable, DataFrame> = BTreeMap::new();

        for table in OutputTable::ALL {
            let (check, frame) = check_table(table, &self.output_dir)?;
            if let Some(frame) = frame {
                frames.insert(table, frame);
            }
            tables.push(check);
        }

        let integrity_issues = integrity_issues(&frames)?;
        for issue in &integrity_issues {
            warn!("integrity: {}", issue);
        }

        Ok(ValidationReport {
            output_dir: self.output_dir.clone(),
            tables,
            integrity_issues,
        })
    }
}

/// Returns the check and, when it passed, the loaded frame.
fn check_table(table: OutputTable, dir: &Path) -> Result<(TableCheck, Option<DataFrame>)> {
    let path = table.path_in(dir);
    let mut check = TableCheck {
        table,
        path: path.clone(),
        outcome: CheckOutcome::Passed,
        rows: 0,
        columns: 0,
        preview_columns: Vec::new(),
        preview: Vec::new(),
    };

    let metadata = match fs::metadata(&path) {
        Ok(m) if m.is_file() => m,
        _ => {
            check.outcome = CheckOutcome::MissingFile;
            return Ok((check, None));
        }
    };
    if metadata.len() == 0 {
        check.outcome = CheckOutcome::Empty;
        return Ok((check, None));
    }

    let frame = match read_table(&path) {
        Ok(frame) => frame,
        Err(e) => {
            debug!("{} unreadable: {}", path.display(), e);
            check.outcome = CheckOutcome::Unreadable(e.to_string());
            return Ok((check, None));
        }
    };
    check.rows = frame.height();
    check.columns = frame.width();

    let present: HashSet<&str> = frame.get_column_names().into_iter().collect();
    let missing: Vec<String> = table
        .required_columns()
        .iter()
        .filter(|c| !present.contains(**c))
        .map(|c| c.to_string())
        .collect();
    if !missing.is_empty() {
        check.outcome = CheckOutcome::MissingColumns(missing);
        return Ok((check, None));
    }
    if frame.height() == 0 {
        check.outcome = CheckOutcome::Empty;
        return Ok((check, None));
    }

    check.preview_columns = table
        .required_columns()
        .iter()
        .take(PREVIEW_COLUMNS)
        .map(|c| c.to_string())
        .collect();
    check.preview = preview(&frame, &check.preview_columns)?;
    Ok((check, Some(frame)))
}

fn preview(frame: &DataFrame, columns: &[String]) -> Result<Vec<Vec<String>>> {
    let rendered = columns
        .iter()
        .map(|name| Ok(frame.column(name)?.cast(&DataType::String)?))
        .collect::<Result<Vec<Series>>>()?;

    let mut rows = Vec::new();
    for i in 0..frame.height().min(PREVIEW_ROWS) {
        let mut row = Vec::with_capacity(rendered.len());
        for series in &rendered {
            row.push(series.str()?.get(i).unwrap_or("").to_string());
        }
        rows.push(row);
    }
    Ok(rows)
}

/// Key values rendered as text so integer and string keys compare alike.
fn key_values(frame: &DataFrame, column: &str) -> Result<Vec<Option<String>>> {
    let cast = frame.column(column)?.cast(&DataType::String)?;
    let values = cast.str()?.into_iter().map(|v| v.map(str::to_string)).collect();
    Ok(values)
}

fn integrity_issues(frames: &BTreeMap<OutputTable, DataFrame>) -> Result<Vec<String>> {
    let mut issues = Vec::new();
    let mut key_sets: BTreeMap<OutputTable, HashSet<String>> = BTreeMap::new();

    for (table, frame) in frames.iter().filter(|(t, _)| t.is_dimension()) {
        let Some(key) = table.key_column() else { continue };
        let values = key_values(frame, key)?;
        let nulls = values.iter().filter(|v| v.is_none()).count();
        let set: HashSet<String> = values.into_iter().flatten().collect();
        let duplicates = frame.height() - nulls - set.len();
        if nulls > 0 {
            issues.push(format!("{}: {} null {} values", table.file_name(), nulls, key));
        }
        if duplicates > 0 {
            issues.push(format!("{}: {} duplicate {} values", table.file_name(), duplicates, key));
        }
        key_sets.insert(*table, set);
    }

    for (table, frame) in frames.iter().filter(|(t, _)| !t.is_dimension()) {
        for fk in table.foreign_keys() {
            let Some(keys) = key_sets.get(&fk.dimension) else {
                issues.push(format!(
                    "{}: cannot check {} because {} failed",
                    table.file_name(),
                    fk.column,
                    fk.dimension.file_name()
                ));
                continue;
            };
            let unresolved = key_values(frame, fk.column)?
                .iter()
                .filter(|v| v.as_ref().map_or(true, |v| !keys.contains(v)))
                .count();
            if unresolved > 0 {
                issues.push(format!(
                    "{}: {} rows with {} not found in {}",
                    table.file_name(),
                    unresolved,
                    fk.column,
                    fk.dimension.file_name()
                ));
            }
        }
    }
    Ok(issues)
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "📂 Validating {}", self.output_dir.display())?;
        for check in &self.tables {
            let name = check.table.file_name();
            match &check.outcome {
                CheckOutcome::Passed => {
                    writeln!(f, "✅ {}: {} rows, {} columns", name, check.rows, check.columns)?;
                    writeln!(f, "   {}", check.preview_columns.join(" | "))?;
                    for row in &check.preview {
                        writeln!(f, "   {}", row.join(" | "))?;
                    }
                }
                CheckOutcome::MissingFile => writeln!(f, "❌ {}: file not found", name)?,
                CheckOutcome::Empty => writeln!(f, "❌ {}: no data rows", name)?,
                CheckOutcome::MissingColumns(cols) => {
                    writeln!(f, "❌ {}: missing columns {}", name, cols.join(", "))?
                }
                CheckOutcome::Unreadable(e) => writeln!(f, "❌ {}: unreadable ({})", name, e)?,
            }
        }
        if !self.integrity_issues.is_empty() {
            writeln!(f, "Integrity:")?;
            for issue in &self.integrity_issues {
                writeln!(f, "❌ {}", issue)?;
            }
        }
        if self.passed() {
            write!(f, "✅ Validation passed")
        } else {
            write!(f, "❌ Validation failed")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_and_unresolved_keys_are_reported() {
        let mut frames = BTreeMap::new();
        frames.insert(OutputTable::Shipper, df!["ShipperKey" => [1i64, 2, 2]].unwrap());
        frames.insert(
            OutputTable::Orders,
            df![
                "TimeKey" => [19_960_704i64],
                "CustomerKey" => ["ALFKI"],
                "EmployeeKey" => [1i64],
                "ShipperKey" => [3i64],
            ]
            .unwrap(),
        );

        let issues = integrity_issues(&frames).unwrap();
        assert!(issues.iter().any(|i| i.contains("1 duplicate ShipperKey")));
        assert!(issues.iter().any(|i| i.contains("ShipperKey not found in dim_shipper.csv")));
        assert!(issues.iter().any(|i| i.contains("cannot check CustomerKey")));
    }
}
