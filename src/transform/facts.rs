//! Fact builders: order headers, order lines and the per-order rollup

use super::dimensions::{dedupe_by_key, time_key};
use crate::error::Result;
use chrono::NaiveDate;
use polars::prelude::*;

/// Order headers keyed by `OrderKey`, dates defaulted and turned into `TimeKey`.
pub struct OrderHeaders {
    pub frame: DataFrame,
    pub dates: Vec<NaiveDate>,
    pub duplicates: usize,
    pub defaulted_dates: usize,
}

pub fn order_headers(orders: &DataFrame, default_date: NaiveDate) -> Result<OrderHeaders> {
    let mut unique = dedupe_by_key(orders.clone().lazy(), "OrderID").collect()?;
    let duplicates = orders.height() - unique.height();

    let mut defaulted_dates = 0;
    let dates: Vec<NaiveDate> = unique
        .column("OrderDate")?
        .date()?
        .as_date_iter()
        .map(|d| {
            d.unwrap_or_else(|| {
                defaulted_dates += 1;
                default_date
            })
        })
        .collect();
    let keys: Vec<i64> = dates.iter().map(time_key).collect();
    unique.with_column(Series::new("TimeKey", keys))?;

    let frame = unique
        .lazy()
        .select([
            col("OrderID").alias("OrderKey"),
            col("CustomerID").alias("CustomerKey"),
            col("EmployeeID").alias("EmployeeKey"),
            col("ShipVia").alias("ShipperKey"),
            col("TimeKey"),
            col("Freight").fill_null(lit(0.0)).alias("Freight"),
        ])
        .collect()?;

    Ok(OrderHeaders {
        frame,
        dates,
        duplicates,
        defaulted_dates,
    })
}

/// Net line amount: quantity times unit price, less discount.
pub fn revenue_expr() -> Expr {
    col("Quantity").cast(DataType::Float64) * col("UnitPrice") * (lit(1.0) - col("Discount"))
}

/// Valid order lines with `Revenue`, plus the number rejected.
///
/// Null measures count as zero. A line is rejected when either key is null,
/// quantity or price is negative, or discount falls outside `[0, 1]`.
pub fn order_lines(details: &DataFrame) -> Result<(DataFrame, usize)> {
    let valid = details
        .clone()
        .lazy()
        .select([
            col("OrderID").alias("OrderKey"),
            col("ProductID").alias("ProductKey"),
            col("Quantity").fill_null(lit(0i64)).alias("Quantity"),
            col("UnitPrice").fill_null(lit(0.0)).alias("UnitPrice"),
            col("Discount").fill_null(lit(0.0)).alias("Discount"),
        ])
        .filter(
            col("OrderKey")
                .is_not_null()
                .and(col("ProductKey").is_not_null())
                .and(col("Quantity").gt_eq(lit(0i64)))
                .and(col("UnitPrice").gt_eq(lit(0.0)))
                .and(col("Discount").gt_eq(lit(0.0)))
                .and(col("Discount").lt_eq(lit(1.0))),
        )
        .with_column(revenue_expr().alias("Revenue"))
        .collect()?;

    let rejected = details.height() - valid.height();
    Ok((valid, rejected))
}

/// Attaches header keys to each line; lines without a header are dropped.
pub fn attach_headers(lines: &DataFrame, headers: &DataFrame) -> Result<(DataFrame, usize)> {
    let keys = headers.clone().lazy().select([
        col("OrderKey"),
        col("CustomerKey"),
        col("EmployeeKey"),
        col("ShipperKey"),
        col("TimeKey"),
    ]);
    let joined = lines
        .clone()
        .lazy()
        .join(keys, [col("OrderKey")], [col("OrderKey")], JoinArgs::new(JoinType::Inner))
        .collect()?;
    let orphans = lines.height() - joined.height();
    Ok((joined, orphans))
}

/// Keeps rows whose `key` occurs in `dimension`; returns the number dropped.
pub fn retain_resolved(frame: DataFrame, key: &str, dimension: &DataFrame) -> Result<(DataFrame, usize)> {
    let before = frame.height();
    let keys = dimension.clone().lazy().select([col(key)]);
    let kept = frame
        .lazy()
        .join(keys, [col(key)], [col(key)], JoinArgs::new(JoinType::Inner))
        .collect()?;
    let dropped = before - kept.height();
    Ok((kept, dropped))
}

/// Final column order of `fact_sales`, sorted on every distinguishing column
/// so reruns write identical files.
pub fn finish_sales(lines: DataFrame) -> Result<DataFrame> {
    Ok(lines
        .lazy()
        .select([
            col("OrderKey"),
            col("ProductKey"),
            col("CustomerKey"),
            col("EmployeeKey"),
            col("ShipperKey"),
            col("TimeKey"),
            col("Quantity"),
            col("UnitPrice"),
            col("Discount"),
            col("Revenue"),
        ])
        .sort_by_exprs(
            vec![
                col("OrderKey"),
                col("ProductKey"),
                col("Quantity"),
                col("UnitPrice"),
                col("Discount"),
            ],
            SortMultipleOptions::default(),
        )
        .collect()?)
}

/// One row per resolved order header with line measures rolled up.
/// Orders without surviving lines carry zero measures.
pub fn order_rollup(headers: &DataFrame, sales: &DataFrame) -> Result<DataFrame> {
    let summary = sales.clone().lazy().group_by([col("OrderKey")]).agg([
        len().cast(DataType::Int64).alias("DetailCount"),
        col("Quantity").sum().alias("TotalQuantity"),
        col("Discount").mean().alias("AverageDiscount"),
        col("Revenue").sum().alias("TotalLineTotal"),
    ]);

    Ok(headers
        .clone()
        .lazy()
        .join(summary, [col("OrderKey")], [col("OrderKey")], JoinArgs::new(JoinType::Left))
        .select([
            col("OrderKey"),
            col("CustomerKey"),
            col("EmployeeKey"),
            col("ShipperKey"),
            col("TimeKey"),
            col("DetailCount").fill_null(lit(0i64)).alias("DetailCount"),
            col("TotalQuantity").fill_null(lit(0i64)).alias("TotalQuantity"),
            col("AverageDiscount").fill_null(lit(0.0)).alias("AverageDiscount"),
            col("TotalLineTotal").fill_null(lit(0.0)).alias("TotalLineTotal"),
            col("Freight"),
        ])
        .sort_by_exprs(vec![col("OrderKey")], SortMultipleOptions::default())
        .collect()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn details() -> DataFrame {
        df! [
            "OrderID" => [Some(1i64), Some(1), Some(2), None, Some(3)],
            "ProductID" => [Some(10i64), Some(11), Some(10), Some(10), Some(12)],
            "UnitPrice" => [Some(10.0), Some(4.0), None, Some(1.0), Some(5.0)],
            "Quantity" => [Some(2i64), Some(5), Some(3), Some(1), Some(-1)],
            "Discount" => [Some(0.5), None, Some(0.0), Some(0.0), Some(0.0)],
        ]
        .unwrap()
    }

    #[test]
    fn invalid_lines_are_rejected_and_revenue_is_net() {
        let (lines, rejected) = order_lines(&details()).unwrap();
        assert_eq!(rejected, 2);
        assert_eq!(lines.height(), 3);
        let revenue: Vec<Option<f64>> = lines.column("Revenue").unwrap().f64().unwrap().into_iter().collect();
        assert_eq!(revenue, vec![Some(10.0), Some(20.0), Some(0.0)]);
    }

    #[test]
    fn missing_dates_take_the_default() {
        let orders = df! [
            "OrderID" => [Some(1i64), Some(2), Some(1)],
            "CustomerID" => [Some("ALFKI"), Some("BONAP"), Some("ALFKI")],
            "EmployeeID" => [Some(1i64), Some(2), Some(1)],
            "OrderDate" => [NaiveDate::from_ymd_opt(1997, 5, 1), None, None],
            "ShipVia" => [Some(1i64), Some(2), Some(1)],
            "Freight" => [Some(3.5), None, Some(1.0)],
        ]
        .unwrap();
        let default = NaiveDate::from_ymd_opt(1996, 1, 1).unwrap();
        let headers = order_headers(&orders, default).unwrap();

        assert_eq!(headers.duplicates, 1);
        assert_eq!(headers.defaulted_dates, 1);
        let keys: Vec<Option<i64>> = headers.frame.column("TimeKey").unwrap().i64().unwrap().into_iter().collect();
        assert_eq!(keys, vec![Some(19_970_501), Some(19_960_101)]);
        assert_eq!(headers.frame.column("Freight").unwrap().f64().unwrap().get(1), Some(0.0));
    }

    #[test]
    fn unresolved_keys_are_dropped_and_counted() {
        let facts = df!["ProductKey" => [1i64, 2, 3, 2]].unwrap();
        let dim = df!["ProductKey" => [2i64, 3]].unwrap();
        let (kept, dropped) = retain_resolved(facts, "ProductKey", &dim).unwrap();
        assert_eq!(kept.height(), 3);
        assert_eq!(dropped, 1);
    }
}
