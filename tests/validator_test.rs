mod common;

use common::prepared_output;
use northwind_star::validate::{CheckOutcome, Validator};
use northwind_star::OutputTable;
use std::fs::{self, OpenOptions};
use std::io::Write;

type TestResult = Result<(), Box<dyn std::error::Error>>;

#[tokio::test]
async fn fresh_output_passes_with_previews() -> TestResult {
    let (_tmp, _db, out) = prepared_output().await;
    let report = Validator::new(&out).run()?;

    assert!(report.passed(), "{}", report);
    let customers = report.check(OutputTable::Customer).unwrap();
    assert_eq!(customers.rows, 3);
    assert_eq!(customers.columns, 7);
    assert_eq!(customers.preview.len(), 3);
    assert_eq!(customers.preview_columns.len(), 5);
    assert_eq!(customers.preview[0][0], "ALFKI");

    let employees = report.check(OutputTable::Employee).unwrap();
    assert_eq!(employees.preview.len(), 2);
    assert_eq!(employees.preview_columns.len(), 5);
    assert!(report.to_string().ends_with("Validation passed"));
    Ok(())
}

#[tokio::test]
async fn missing_file_fails() -> TestResult {
    let (_tmp, _db, out) = prepared_output().await;
    fs::remove_file(OutputTable::Orders.path_in(&out))?;

    let report = Validator::new(&out).run()?;
    assert!(!report.passed());
    assert_eq!(report.check(OutputTable::Orders).unwrap().outcome, CheckOutcome::MissingFile);
    assert!(report.to_string().contains("fact_orders.csv: file not found"));
    Ok(())
}

#[tokio::test]
async fn header_only_and_zero_byte_files_are_empty() -> TestResult {
    let (_tmp, _db, out) = prepared_output().await;
    fs::write(OutputTable::Category.path_in(&out), "CategoryKey,CategoryName,Description\n")?;
    fs::write(OutputTable::Time.path_in(&out), "")?;

    let report = Validator::new(&out).run()?;
    assert!(!report.passed());
    assert_eq!(report.check(OutputTable::Category).unwrap().outcome, CheckOutcome::Empty);
    assert_eq!(report.check(OutputTable::Time).unwrap().outcome, CheckOutcome::Empty);
    Ok(())
}

#[tokio::test]
async fn missing_required_column_is_named() -> TestResult {
    let (_tmp, _db, out) = prepared_output().await;
    fs::write(
        OutputTable::Shipper.path_in(&out),
        "ShipperKey,ShipperName\n1,Speedy Express\n2,United Package\n",
    )?;

    let report = Validator::new(&out).run()?;
    assert_eq!(
        report.check(OutputTable::Shipper).unwrap().outcome,
        CheckOutcome::MissingColumns(vec!["Phone".to_string()])
    );
    assert!(!report.passed());
    Ok(())
}

#[tokio::test]
async fn unresolved_fact_key_is_an_integrity_failure() -> TestResult {
    let (_tmp, _db, out) = prepared_output().await;
    let mut sales = OpenOptions::new()
        .append(true)
        .open(OutputTable::Sales.path_in(&out))?;
    writeln!(sales, "10248,12345,ALFKI,1,1,19960704,1,1.0,0.0,1.0")?;

    let report = Validator::new(&out).run()?;
    assert!(report.tables.iter().all(|t| t.passed()));
    assert!(!report.passed());
    assert!(report
        .integrity_issues
        .iter()
        .any(|i| i.contains("fact_sales.csv: 1 rows with ProductKey not found in dim_product.csv")));
    Ok(())
}

#[tokio::test]
async fn duplicate_dimension_key_is_an_integrity_failure() -> TestResult {
    let (_tmp, _db, out) = prepared_output().await;
    let mut shippers = OpenOptions::new()
        .append(true)
        .open(OutputTable::Shipper.path_in(&out))?;
    writeln!(shippers, "1,Speedy Again,")?;

    let report = Validator::new(&out).run()?;
    assert!(!report.passed());
    assert!(report
        .integrity_issues
        .iter()
        .any(|i| i.contains("dim_shipper.csv: 1 duplicate ShipperKey values")));
    Ok(())
}
