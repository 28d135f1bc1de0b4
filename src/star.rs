//! Output tables of the star schema

use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum OutputTable {
    Time,
    Customer,
    Product,
    Category,
    Employee,
    Shipper,
    Sales,
    Orders,
}

/// A fact column that must resolve into a dimension key.
#[derive(Debug, Clone, Copy)]
pub struct ForeignKey {
    pub column: &'static str,
    pub dimension: OutputTable,
}

const fn fk(column: &'static str, dimension: OutputTable) -> ForeignKey {
    ForeignKey { column, dimension }
}

impl OutputTable {
    pub const ALL: [OutputTable; 8] = [
        OutputTable::Time,
        OutputTable::Customer,
        OutputTable::Product,
        OutputTable::Category,
        OutputTable::Employee,
        OutputTable::Shipper,
        OutputTable::Sales,
        OutputTable::Orders,
    ];

    pub fn file_name(&self) -> &'static str {
        match self {
            OutputTable::Time => "dim_time.csv",
            OutputTable::Customer => "dim_customer.csv",
            OutputTable::Product => "dim_product.csv",
            OutputTable::Category => "dim_category.csv",
            OutputTable::Employee => "dim_employee.csv",
            OutputTable::Shipper => "dim_shipper.csv",
            OutputTable::Sales => "fact_sales.csv",
            OutputTable::Orders => "fact_orders.csv",
        }
    }

    pub fn path_in(&self, dir: &Path) -> PathBuf {
        dir.join(self.file_name())
    }

    pub fn is_dimension(&self) -> bool {
        !matches!(self, OutputTable::Sales | OutputTable::Orders)
    }

    /// Identifier column of a dimension.
    pub fn key_column(&self) -> Option<&'static str> {
        match self {
            OutputTable::Time => Some("TimeKey"),
            OutputTable::Customer => Some("CustomerKey"),
            OutputTable::Product => Some("ProductKey"),
            OutputTable::Category => Some("CategoryKey"),
            OutputTable::Employee => Some("EmployeeKey"),
            OutputTable::Shipper => Some("ShipperKey"),
            OutputTable::Sales | OutputTable::Orders => None,
        }
    }

    pub fn required_columns(&self) -> &'static [&'static str] {
        match self {
            OutputTable::Time => &["TimeKey", "date", "year", "month", "day"],
            OutputTable::Customer => &["CustomerKey", "CustomerName", "CustomerCity", "CustomerCountry", "Phone"],
            OutputTable::Product => &["ProductKey", "ProductName", "UnitPrice", "CategoryName", "Discontinued"],
            OutputTable::Category => &["CategoryKey", "CategoryName"],
            OutputTable::Employee => &[
                "EmployeeKey",
                "EmployeeFullName",
                "FirstName",
                "LastName",
                "Title",
                "City",
                "Country",
            ],
            OutputTable::Shipper => &["ShipperKey", "ShipperName", "Phone"],
            OutputTable::Sales => &[
                "OrderKey",
                "ProductKey",
                "TimeKey",
                "CustomerKey",
                "EmployeeKey",
                "ShipperKey",
                "Quantity",
                "UnitPrice",
                "Discount",
                "Revenue",
            ],
            OutputTable::Orders => &[
                "OrderKey",
                "TimeKey",
                "CustomerKey",
                "EmployeeKey",
                "ShipperKey",
                "DetailCount",
                "TotalQuantity",
                "AverageDiscount",
                "TotalLineTotal",
                "Freight",
            ],
        }
    }

    pub fn foreign_keys(&self) -> &'static [ForeignKey] {
        const SALES: [ForeignKey; 5] = [
            fk("TimeKey", OutputTable::Time),
            fk("CustomerKey", OutputTable::Customer),
            fk("ProductKey", OutputTable::Product),
            fk("EmployeeKey", OutputTable::Employee),
            fk("ShipperKey", OutputTable::Shipper),
        ];
        const ORDERS: [ForeignKey; 4] = [
            fk("TimeKey", OutputTable::Time),
            fk("CustomerKey", OutputTable::Customer),
            fk("EmployeeKey", OutputTable::Employee),
            fk("ShipperKey", OutputTable::Shipper),
        ];
        match self {
            OutputTable::Sales => &SALES,
            OutputTable::Orders => &ORDERS,
            _ => &[],
        }
    }
}
