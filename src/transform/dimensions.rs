//! Dimension builders

use crate::error::Result;
use chrono::{Datelike, NaiveDate};
use itertools::Itertools;
use polars::prelude::*;

/// Drops null keys and keeps the first row per key.
pub(crate) fn dedupe_by_key(lf: LazyFrame, key: &str) -> LazyFrame {
    lf.filter(col(key).is_not_null())
        .unique_stable(Some(vec![key.to_string()]), UniqueKeepStrategy::First)
}

pub(crate) fn sort_by_key(lf: LazyFrame, key: &str) -> LazyFrame {
    lf.sort_by_exprs(vec![col(key)], SortMultipleOptions::default())
}

pub fn customer_dimension(customers: &DataFrame) -> Result<DataFrame> {
    let lf = customers.clone().lazy().select([
        col("CustomerID").alias("CustomerKey"),
        col("CompanyName").alias("CustomerName"),
        col("ContactName"),
        col("ContactTitle"),
        col("City").alias("CustomerCity"),
        col("Country").alias("CustomerCountry"),
        col("Phone"),
    ]);
    Ok(sort_by_key(dedupe_by_key(lf, "CustomerKey"), "CustomerKey").collect()?)
}

pub fn category_dimension(categories: &DataFrame) -> Result<DataFrame> {
    let lf = categories.clone().lazy().select([
        col("CategoryID").alias("CategoryKey"),
        col("CategoryName"),
        col("Description"),
    ]);
    Ok(sort_by_key(dedupe_by_key(lf, "CategoryKey"), "CategoryKey").collect()?)
}

/// Products denormalised with their category name; "Unknown" when the
/// category does not resolve.
pub fn product_dimension(products: &DataFrame, categories: &DataFrame) -> Result<DataFrame> {
    let lf = products.clone().lazy().select([
        col("ProductID").alias("ProductKey"),
        col("ProductName"),
        col("QuantityPerUnit"),
        col("UnitPrice"),
        col("UnitsInStock"),
        col("UnitsOnOrder"),
        col("ReorderLevel"),
        col("Discontinued").fill_null(lit(false)).alias("Discontinued"),
        col("CategoryID").alias("CategoryKey"),
    ]);
    let names = categories
        .clone()
        .lazy()
        .select([col("CategoryKey"), col("CategoryName")]);

    let joined = dedupe_by_key(lf, "ProductKey")
        .join(
            names,
            [col("CategoryKey")],
            [col("CategoryKey")],
            JoinArgs::new(JoinType::Left),
        )
        .with_column(col("CategoryName").fill_null(lit("Unknown")).alias("CategoryName"));
    Ok(sort_by_key(joined, "ProductKey").collect()?)
}

pub fn employee_dimension(employees: &DataFrame) -> Result<DataFrame> {
    let first = employees.column("FirstName")?.str()?;
    let last = employees.column("LastName")?.str()?;
    let full: Vec<Option<String>> = first
        .into_iter()
        .zip(last.into_iter())
        .map(|(f, l)| full_name(f, l))
        .collect();

    let mut named = employees.clone();
    named.with_column(Series::new("EmployeeFullName", full))?;

    let lf = named.lazy().select([
        col("EmployeeID").alias("EmployeeKey"),
        col("EmployeeFullName"),
        col("FirstName"),
        col("LastName"),
        col("Title"),
        col("City"),
        col("Country"),
    ]);
    Ok(sort_by_key(dedupe_by_key(lf, "EmployeeKey"), "EmployeeKey").collect()?)
}

fn full_name(first: Option<&str>, last: Option<&str>) -> Option<String> {
    match (first, last) {
        (Some(f), Some(l)) => Some(format!("{} {}", f, l)),
        (Some(only), None) | (None, Some(only)) => Some(only.to_string()),
        (None, None) => None,
    }
}

pub fn shipper_dimension(shippers: &DataFrame) -> Result<DataFrame> {
    let lf = shippers.clone().lazy().select([
        col("ShipperID").alias("ShipperKey"),
        col("CompanyName").alias("ShipperName"),
        col("Phone"),
    ]);
    Ok(sort_by_key(dedupe_by_key(lf, "ShipperKey"), "ShipperKey").collect()?)
}

/// `yyyymmdd` as an integer.
pub fn time_key(date: &NaiveDate) -> i64 {
    date.year() as i64 * 10_000 + date.month() as i64 * 100 + date.day() as i64
}

/// One row per distinct date, ascending.
pub fn time_dimension(dates: &[NaiveDate]) -> Result<DataFrame> {
    let days: Vec<NaiveDate> = dates.iter().copied().sorted().dedup().collect();

    let keys: Vec<i64> = days.iter().map(time_key).collect();
    let years: Vec<i32> = days.iter().map(|d| d.year()).collect();
    let months: Vec<i32> = days.iter().map(|d| d.month() as i32).collect();
    let day_of_month: Vec<i32> = days.iter().map(|d| d.day() as i32).collect();
    let quarters: Vec<i32> = days.iter().map(|d| (d.month0() / 3 + 1) as i32).collect();
    let year_months: Vec<String> = days.iter().map(|d| d.format("%Y-%m").to_string()).collect();

    Ok(df! [
        "TimeKey" => keys,
        "date" => days,
        "year" => years,
        "month" => months,
        "day" => day_of_month,
        "quarter" => quarters,
        "year_month" => year_months,
    ]?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_key_is_yyyymmdd() {
        let d = NaiveDate::from_ymd_opt(1997, 3, 9).unwrap();
        assert_eq!(time_key(&d), 19_970_309);
    }

    #[test]
    fn time_dimension_is_distinct_and_sorted() {
        let d = |y, m, day| NaiveDate::from_ymd_opt(y, m, day).unwrap();
        let df = time_dimension(&[d(1997, 1, 2), d(1996, 7, 4), d(1997, 1, 2)]).unwrap();
        assert_eq!(df.height(), 2);
        let keys: Vec<Option<i64>> = df.column("TimeKey").unwrap().i64().unwrap().into_iter().collect();
        assert_eq!(keys, vec![Some(19_960_704), Some(19_970_102)]);
        assert_eq!(df.column("quarter").unwrap().i32().unwrap().get(0), Some(3));
        assert_eq!(df.column("year_month").unwrap().str().unwrap().get(1), Some("1997-01"));
    }

    #[test]
    fn full_name_uses_available_parts() {
        assert_eq!(full_name(Some("Nancy"), Some("Davolio")).as_deref(), Some("Nancy Davolio"));
        assert_eq!(full_name(None, Some("Fuller")).as_deref(), Some("Fuller"));
        assert_eq!(full_name(None, None), None);
    }

    #[test]
    fn customer_dimension_drops_null_and_duplicate_keys() {
        let customers = df! [
            "CustomerID" => [Some("BONAP"), None, Some("ALFKI"), Some("BONAP")],
            "CompanyName" => [Some("Bon app'"), Some("Ghost"), Some("Alfreds Futterkiste"), Some("Duplicate")],
            "ContactName" => [None::<&str>, None, None, None],
            "ContactTitle" => [None::<&str>, None, None, None],
            "City" => [Some("Marseille"), None, Some("Berlin"), None],
            "Country" => [Some("France"), None, Some("Germany"), None],
            "Phone" => [None::<&str>, None, None, None],
        ]
        .unwrap();
        let dim = customer_dimension(&customers).unwrap();
        assert_eq!(dim.height(), 2);
        let names: Vec<Option<&str>> = dim.column("CustomerName").unwrap().str().unwrap().into_iter().collect();
        assert_eq!(names, vec![Some("Alfreds Futterkiste"), Some("Bon app'")]);
    }
}
