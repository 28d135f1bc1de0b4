#![allow(dead_code)]

use northwind_star::pipeline::{self, PipelineSummary};
use northwind_star::EtlConfig;
use rusqlite::Connection;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Small Northwind database with one case of every cleaning rule:
/// - order 10251 has no customer
/// - order 10252 has no date
/// - order 10253 has no lines
/// - product 4 has no category
/// - one line references product 99, one has discount 1.5, one has no order
pub const NORTHWIND_SQL: &str = r#"
CREATE TABLE Categories (CategoryID INTEGER, CategoryName TEXT, Description TEXT, Picture BLOB);
INSERT INTO Categories VALUES
    (1, 'Beverages', 'Soft drinks, coffees, teas, beers, and ales', NULL),
    (2, 'Condiments', 'Sweet and savory sauces', NULL);

CREATE TABLE Products (ProductID INTEGER, ProductName TEXT, SupplierID INTEGER, CategoryID INTEGER,
    QuantityPerUnit TEXT, UnitPrice REAL, UnitsInStock INTEGER, UnitsOnOrder INTEGER,
    ReorderLevel INTEGER, Discontinued INTEGER);
INSERT INTO Products VALUES
    (1, 'Chai', 1, 1, '10 boxes x 20 bags', 18.0, 39, 0, 10, 0),
    (2, 'Chang', 1, 1, '24 - 12 oz bottles', 19.0, 17, 40, 25, 0),
    (3, 'Aniseed Syrup', 1, 2, '12 - 550 ml bottles', 10.0, 13, 70, 25, 1),
    (4, 'Mystery Box', 2, NULL, '1 box', 5.0, 0, 0, 0, NULL);

CREATE TABLE Customers (CustomerID TEXT, CompanyName TEXT, ContactName TEXT, ContactTitle TEXT,
    Address TEXT, City TEXT, Region TEXT, PostalCode TEXT, Country TEXT, Phone TEXT, Fax TEXT);
INSERT INTO Customers VALUES
    ('ALFKI', 'Alfreds Futterkiste', 'Maria Anders', 'Sales Representative', 'Obere Str. 57', 'Berlin', NULL, '12209', 'Germany', '030-0074321', NULL),
    ('ANATR', 'Ana Trujillo Emparedados y helados', 'Ana Trujillo', 'Owner', 'Avda. de la Constitucion 2222', 'Mexico D.F.', NULL, '05021', 'Mexico', '(5) 555-4729', NULL),
    ('BONAP', 'Bon app''', 'Laurence Lebihan', 'Owner', '12, rue des Bouchers', 'Marseille', NULL, '13008', 'France', '91.24.45.40', NULL);

CREATE TABLE Employees (EmployeeID INTEGER, LastName TEXT, FirstName TEXT, Title TEXT,
    City TEXT, Country TEXT, ReportsTo INTEGER);
INSERT INTO Employees VALUES
    (1, 'Davolio', 'Nancy', 'Sales Representative', 'Seattle', 'USA', 2),
    (2, 'Fuller', 'Andrew', 'Vice President, Sales', 'Tacoma', 'USA', NULL);

CREATE TABLE Shippers (ShipperID INTEGER, CompanyName TEXT, Phone TEXT);
INSERT INTO Shippers VALUES
    (1, 'Speedy Express', '(503) 555-9831'),
    (2, 'United Package', '(503) 555-3199');

CREATE TABLE Orders (OrderID INTEGER, CustomerID TEXT, EmployeeID INTEGER, OrderDate TEXT,
    RequiredDate TEXT, ShippedDate TEXT, ShipVia INTEGER, Freight REAL, ShipCountry TEXT);
INSERT INTO Orders VALUES
    (10248, 'ALFKI', 1, '1996-07-04 00:00:00', NULL, NULL, 1, 32.38, 'Germany'),
    (10249, 'BONAP', 2, '1996-07-05 00:00:00', NULL, NULL, 2, 11.61, 'France'),
    (10250, 'ANATR', 1, '1997-01-10 00:00:00', NULL, NULL, 1, 65.83, 'Mexico'),
    (10251, NULL, 2, '1997-02-01 00:00:00', NULL, NULL, 2, 41.34, NULL),
    (10252, 'BONAP', 2, NULL, NULL, NULL, 1, 51.30, 'France'),
    (10253, 'ALFKI', 1, '1997-03-01 00:00:00', NULL, NULL, 1, 58.17, 'Germany');

CREATE TABLE "Order Details" (OrderID INTEGER, ProductID INTEGER, UnitPrice REAL, Quantity INTEGER, Discount REAL);
INSERT INTO "Order Details" VALUES
    (10248, 1, 18.0, 10, 0.0),
    (10248, 2, 19.0, 5, 0.1),
    (10249, 3, 10.0, 20, 0.0),
    (10250, 1, 18.0, 4, 0.25),
    (10250, 2, 19.0, 6, 1.5),
    (10251, 2, 19.0, 1, 0.0),
    (10252, 3, 10.0, 2, 0.0),
    (10252, 99, 5.0, 3, 0.0),
    (99999, 1, 18.0, 1, 0.0);
"#;

/// Lines that survive cleaning, and their net revenue.
pub const EXPECTED_SALES_ROWS: usize = 5;
pub const EXPECTED_REVENUE: f64 = 180.0 + 85.5 + 200.0 + 54.0 + 20.0;

pub fn create_northwind_db(dir: &Path) -> PathBuf {
    let path = dir.join("northwind.db");
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(NORTHWIND_SQL).unwrap();
    path
}

pub fn execute(db: &Path, sql: &str) {
    let conn = Connection::open(db).unwrap();
    conn.execute_batch(sql).unwrap();
}

pub fn config_for(db: &Path, output_dir: &Path, extra_dir: Option<&Path>) -> EtlConfig {
    let mut env = HashMap::new();
    env.insert("NORTHWIND_SOURCE", "sqlite".to_string());
    env.insert("NORTHWIND_DB_PATH", db.display().to_string());
    env.insert("NORTHWIND_OUTPUT_DIR", output_dir.display().to_string());
    let extra = extra_dir
        .map(Path::to_path_buf)
        .unwrap_or_else(|| output_dir.join("no-extra"));
    env.insert("NORTHWIND_EXTRA_DIR", extra.display().to_string());
    EtlConfig::from_lookup(|key| env.get(key).cloned()).unwrap()
}

pub async fn run_etl(db: &Path, output_dir: &Path, extra_dir: Option<&Path>) -> PipelineSummary {
    pipeline::run(&config_for(db, output_dir, extra_dir)).await.unwrap()
}

/// Fixture database plus a completed ETL run into `<tmp>/out`.
pub async fn prepared_output() -> (tempfile::TempDir, PathBuf, PathBuf) {
    let tmp = tempfile::tempdir().unwrap();
    let db = create_northwind_db(tmp.path());
    let out = tmp.path().join("out");
    run_etl(&db, &out, None).await;
    (tmp, db, out)
}
