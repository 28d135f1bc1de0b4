//! Aggregates over a filtered slice of the line frame

use super::data::DashboardData;
use super::filter::DashboardFilter;
use crate::error::Result;
use itertools::Itertools;
use polars::prelude::*;
use serde::Serialize;
use std::cmp::Ordering;

pub const TOP_N: usize = 10;
pub const DETAIL_ROWS: usize = 200;

pub const DETAIL_COLUMNS: [&str; 12] = [
    "date",
    "OrderKey",
    "CustomerName",
    "CustomerCountry",
    "ProductName",
    "CategoryName",
    "EmployeeFullName",
    "ShipperName",
    "Quantity",
    "UnitPrice",
    "Discount",
    "Revenue",
];

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Kpis {
    pub revenue: f64,
    pub orders: usize,
    pub customers: usize,
    pub average_basket: f64,
    pub lines: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bucket {
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DetailTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub filter: DashboardFilter,
    pub kpis: Kpis,
    pub monthly_revenue: Vec<Bucket>,
    pub top_countries: Vec<Bucket>,
    pub top_customers: Vec<Bucket>,
    pub top_employees: Vec<Bucket>,
    pub revenue_by_category: Vec<Bucket>,
    pub freight_by_shipper: Vec<Bucket>,
    pub detail: DetailTable,
}

pub fn filtered_lines(data: &DashboardData, filter: &DashboardFilter) -> Result<DataFrame> {
    let lf = data.lines.clone().lazy();
    let lf = match filter.to_expr() {
        Some(predicate) => lf.filter(predicate),
        None => lf,
    };
    Ok(lf.collect()?)
}

pub fn summarize(data: &DashboardData, filter: &DashboardFilter) -> Result<Summary> {
    let slice = filtered_lines(data, filter)?;

    let mut monthly_revenue = buckets(&slice, "year_month", "Revenue")?;
    monthly_revenue.sort_by(|a, b| a.label.cmp(&b.label));

    let mut top_countries = ranked(&slice, "CustomerCountry", "Revenue")?;
    top_countries.truncate(TOP_N);
    let mut top_customers = ranked(&slice, "CustomerName", "Revenue")?;
    top_customers.truncate(TOP_N);
    let mut top_employees = ranked(&slice, "EmployeeFullName", "Revenue")?;
    top_employees.truncate(TOP_N);

    Ok(Summary {
        filter: filter.clone(),
        kpis: kpis(&slice)?,
        monthly_revenue,
        top_countries,
        top_customers,
        top_employees,
        revenue_by_category: ranked(&slice, "CategoryName", "Revenue")?,
        freight_by_shipper: freight_by_shipper(data, &slice)?,
        detail: detail(&slice, Some(DETAIL_ROWS))?,
    })
}

pub fn kpis(slice: &DataFrame) -> Result<Kpis> {
    if slice.height() == 0 {
        return Ok(Kpis::default());
    }
    let revenue = slice.column("Revenue")?.f64()?.sum().unwrap_or(0.0);
    let orders = slice.column("OrderKey")?.n_unique()?;
    let customers = slice.column("CustomerKey")?.n_unique()?;
    let average_basket = if orders == 0 { 0.0 } else { revenue / orders as f64 };
    Ok(Kpis {
        revenue,
        orders,
        customers,
        average_basket,
        lines: slice.height(),
    })
}

/// Sum of `value` per `label`, unordered. Null labels are grouped as "Unknown".
fn buckets(frame: &DataFrame, label: &str, value: &str) -> Result<Vec<Bucket>> {
    if frame.height() == 0 {
        return Ok(Vec::new());
    }
    let grouped = frame
        .clone()
        .lazy()
        .group_by([col(label).cast(DataType::String).fill_null(lit("Unknown"))])
        .agg([col(value).sum()])
        .collect()?;

    let labels = grouped.column(label)?.str()?;
    let values = grouped.column(value)?.f64()?;
    Ok(labels
        .into_iter()
        .zip(values.into_iter())
        .map(|(l, v)| Bucket {
            label: l.unwrap_or("Unknown").to_string(),
            value: v.unwrap_or(0.0),
        })
        .collect())
}

/// Buckets by descending value, ties broken by label.
fn ranked(frame: &DataFrame, label: &str, value: &str) -> Result<Vec<Bucket>> {
    Ok(buckets(frame, label, value)?
        .into_iter()
        .sorted_by(|a, b| {
            b.value
                .partial_cmp(&a.value)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.label.cmp(&b.label))
        })
        .collect())
}

/// Freight of orders with at least one line in the slice, per shipper.
fn freight_by_shipper(data: &DashboardData, slice: &DataFrame) -> Result<Vec<Bucket>> {
    if slice.height() == 0 {
        return Ok(Vec::new());
    }
    let order_keys = slice
        .clone()
        .lazy()
        .select([col("OrderKey")])
        .unique(None, UniqueKeepStrategy::Any);
    let orders = data
        .orders
        .clone()
        .lazy()
        .join(
            order_keys,
            [col("OrderKey")],
            [col("OrderKey")],
            JoinArgs::new(JoinType::Inner),
        )
        .collect()?;
    ranked(&orders, "ShipperName", "Freight")
}

/// Most recent lines first; `limit` of `None` keeps all of them.
pub fn detail(slice: &DataFrame, limit: Option<usize>) -> Result<DetailTable> {
    let sorted = detail_frame(slice, limit)?;
    let rendered = DETAIL_COLUMNS
        .iter()
        .map(|name| Ok(sorted.column(name)?.cast(&DataType::String)?))
        .collect::<Result<Vec<Series>>>()?;

    let mut rows = Vec::with_capacity(sorted.height());
    for i in 0..sorted.height() {
        let mut row = Vec::with_capacity(rendered.len());
        for series in &rendered {
            row.push(series.str()?.get(i).unwrap_or("").to_string());
        }
        rows.push(row);
    }
    Ok(DetailTable {
        columns: DETAIL_COLUMNS.iter().map(|c| c.to_string()).collect(),
        rows,
    })
}

pub fn detail_frame(slice: &DataFrame, limit: Option<usize>) -> Result<DataFrame> {
    let columns: Vec<Expr> = DETAIL_COLUMNS.iter().map(|c| col(c)).collect();
    let sorted = slice
        .clone()
        .lazy()
        .sort_by_exprs(
            vec![col("TimeKey"), col("OrderKey"), col("ProductKey")],
            SortMultipleOptions::default().with_order_descending(true),
        )
        .select(columns);
    let sorted = match limit {
        Some(n) => sorted.limit(n as IdxSize),
        None => sorted,
    };
    Ok(sorted.collect()?)
}

/// Full filtered detail as CSV bytes.
pub fn detail_csv(data: &DashboardData, filter: &DashboardFilter) -> Result<Vec<u8>> {
    let slice = filtered_lines(data, filter)?;
    let mut frame = detail_frame(&slice, None)?;
    let mut buf = Vec::new();
    CsvWriter::new(&mut buf)
        .include_header(true)
        .with_separator(b',')
        .finish(&mut frame)?;
    Ok(buf)
}
