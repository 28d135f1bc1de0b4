//! Dashboard data: the written star schema joined back into analytic frames

use crate::error::{EtlError, Result};
use crate::load::read_table;
use crate::star::OutputTable;
use polars::prelude::*;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Size and modification time of every output file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSignature(Vec<(u64, Option<SystemTime>)>);

impl FileSignature {
    pub fn of(dir: &Path) -> Result<Self> {
        let mut parts = Vec::with_capacity(OutputTable::ALL.len());
        for table in OutputTable::ALL {
            let path = table.path_in(dir);
            let meta = fs::metadata(&path).map_err(|e| {
                EtlError::Dashboard(format!("cannot stat {}: {}", path.display(), e))
            })?;
            parts.push((meta.len(), meta.modified().ok()))
        }
        Ok(Self(parts))
    }
}

pub struct DashboardData {
    pub dir: PathBuf,
    /// One row per order line with dimension attributes attached.
    pub lines: DataFrame,
    /// One row per order with year, country and shipper attached.
    pub orders: DataFrame,
    pub signature: FileSignature,
}

fn load_table(dir: &Path, table: OutputTable) -> Result<LazyFrame> {
    let path = table.path_in(dir);
    if !path.is_file() {
        return Err(EtlError::Dashboard(format!(
            "{} not found; run northwind-etl first",
            path.display()
        )));
    }
    let frame = read_table(&path)
        .map_err(|e| EtlError::Dashboard(format!("cannot read {}: {}", path.display(), e)))?;
    for column in table.required_columns() {
        if frame.column(column).is_err() {
            return Err(EtlError::Dashboard(format!(
                "{} lacks column {}",
                path.display(),
                column
            )));
        }
    }
    Ok(frame.lazy())
}

fn join_left(lf: LazyFrame, other: LazyFrame, on: &str) -> LazyFrame {
    lf.join(other, [col(on)], [col(on)], JoinArgs::new(JoinType::Left))
}

impl DashboardData {
    pub fn load(dir: &Path) -> Result<Self> {
        let signature = FileSignature::of(dir)?;

        let time = load_table(dir, OutputTable::Time)?.select([
            col("TimeKey").cast(DataType::Int64),
            col("date").cast(DataType::String),
            col("year").cast(DataType::Int32),
            col("year_month").cast(DataType::String),
        ]);
        let customer = load_table(dir, OutputTable::Customer)?.select([
            col("CustomerKey").cast(DataType::String),
            col("CustomerName").cast(DataType::String),
            col("CustomerCountry").cast(DataType::String),
        ]);
        let product = load_table(dir, OutputTable::Product)?.select([
            col("ProductKey").cast(DataType::Int64),
            col("ProductName").cast(DataType::String),
            col("CategoryName").cast(DataType::String),
        ]);
        let employee = load_table(dir, OutputTable::Employee)?.select([
            col("EmployeeKey").cast(DataType::Int64),
            col("EmployeeFullName").cast(DataType::String),
        ]);
        let shipper = load_table(dir, OutputTable::Shipper)?.select([
            col("ShipperKey").cast(DataType::Int64),
            col("ShipperName").cast(DataType::String),
        ]);
        // Category keys are only validated here; names come denormalised on products.
        load_table(dir, OutputTable::Category)?;

        let sales = load_table(dir, OutputTable::Sales)?.select([
            col("OrderKey").cast(DataType::Int64),
            col("ProductKey").cast(DataType::Int64),
            col("CustomerKey").cast(DataType::String),
            col("EmployeeKey").cast(DataType::Int64),
            col("ShipperKey").cast(DataType::Int64),
            col("TimeKey").cast(DataType::Int64),
            col("Quantity").cast(DataType::Int64),
            col("UnitPrice").cast(DataType::Float64),
            col("Discount").cast(DataType::Float64),
            col("Revenue").cast(DataType::Float64),
        ]);
        let orders = load_table(dir, OutputTable::Orders)?.select([
            col("OrderKey").cast(DataType::Int64),
            col("CustomerKey").cast(DataType::String),
            col("ShipperKey").cast(DataType::Int64),
            col("TimeKey").cast(DataType::Int64),
            col("Freight").cast(DataType::Float64),
        ]);

        let lines = join_left(sales, time.clone(), "TimeKey");
        let lines = join_left(lines, customer.clone(), "CustomerKey");
        let lines = join_left(lines, product, "ProductKey");
        let lines = join_left(lines, employee, "EmployeeKey");
        let lines = join_left(lines, shipper.clone(), "ShipperKey").collect()?;

        let orders = join_left(orders, time.select([col("TimeKey"), col("year")]), "TimeKey");
        let orders = join_left(
            orders,
            customer.select([col("CustomerKey"), col("CustomerCountry")]),
            "CustomerKey",
        );
        let orders = join_left(orders, shipper, "ShipperKey").collect()?;

        Ok(Self {
            dir: dir.to_path_buf(),
            lines,
            orders,
            signature,
        })
    }

    pub fn options(&self) -> Result<FilterOptions> {
        let years = self
            .lines
            .column("year")?
            .i32()?
            .into_iter()
            .flatten()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let dates = distinct_strings(&self.lines, "date")?;
        Ok(FilterOptions {
            years,
            first_date: dates.first().cloned(),
            last_date: dates.last().cloned(),
            countries: distinct_strings(&self.lines, "CustomerCountry")?,
            categories: distinct_strings(&self.lines, "CategoryName")?,
            employees: distinct_strings(&self.lines, "EmployeeFullName")?,
            shippers: distinct_strings(&self.lines, "ShipperName")?,
        })
    }
}

/// Values offered by each filter control.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct FilterOptions {
    pub years: Vec<i32>,
    pub first_date: Option<String>,
    pub last_date: Option<String>,
    pub countries: Vec<String>,
    pub categories: Vec<String>,
    pub employees: Vec<String>,
    pub shippers: Vec<String>,
}

fn distinct_strings(frame: &DataFrame, column: &str) -> Result<Vec<String>> {
    let values: BTreeSet<String> = frame
        .column(column)?
        .str()?
        .into_iter()
        .flatten()
        .map(str::to_string)
        .collect();
    Ok(values.into_iter().collect())
}
