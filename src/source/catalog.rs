//! Fixed Northwind source schema
//!
//! Column names are the canonical PascalCase names. Dialects that use
//! snake_case identifiers derive theirs with [`snake_case`].

/// How a source cell is decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Integer,
    Float,
    Text,
    Date,
    Flag,
}

#[derive(Debug, Clone, Copy)]
pub struct SourceColumn {
    pub name: &'static str,
    pub kind: ColumnKind,
}

const fn column(name: &'static str, kind: ColumnKind) -> SourceColumn {
    SourceColumn { name, kind }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Entity {
    Customers,
    Orders,
    OrderDetails,
    Products,
    Categories,
    Employees,
    Shippers,
}

#[derive(Debug, Clone, Copy)]
pub struct SourceTable {
    pub entity: Entity,
    pub name: &'static str,
    /// Natural key, also the read order.
    pub key: &'static [&'static str],
    pub columns: &'static [SourceColumn],
}

impl SourceTable {
    pub fn column(&self, name: &str) -> Option<&SourceColumn> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Candidate file stems for the supplementary CSV source.
    pub fn file_stems(&self) -> Vec<String> {
        let mut stems = vec![self.name.to_string()];
        let underscored = self.name.replace(' ', "_");
        if underscored != self.name {
            stems.push(underscored);
        }
        stems
    }

    /// Orders and order lines carry order identifiers that must not collide
    /// across sources.
    pub fn carries_order_id(&self) -> bool {
        matches!(self.entity, Entity::Orders | Entity::OrderDetails)
    }
}

use ColumnKind::*;

pub const CUSTOMERS: SourceTable = SourceTable {
    entity: Entity::Customers,
    name: "Customers",
    key: &["CustomerID"],
    columns: &[
        column("CustomerID", Text),
        column("CompanyName", Text),
        column("ContactName", Text),
        column("ContactTitle", Text),
        column("City", Text),
        column("Country", Text),
        column("Phone", Text),
    ],
};

pub const ORDERS: SourceTable = SourceTable {
    entity: Entity::Orders,
    name: "Orders",
    key: &["OrderID"],
    columns: &[
        column("OrderID", Integer),
        column("CustomerID", Text),
        column("EmployeeID", Integer),
        column("OrderDate", Date),
        column("ShipVia", Integer),
        column("Freight", Float),
    ],
};

pub const ORDER_DETAILS: SourceTable = SourceTable {
    entity: Entity::OrderDetails,
    name: "Order Details",
    key: &["OrderID", "ProductID"],
    columns: &[
        column("OrderID", Integer),
        column("ProductID", Integer),
        column("UnitPrice", Float),
        column("Quantity", Integer),
        column("Discount", Float),
    ],
};

pub const PRODUCTS: SourceTable = SourceTable {
    entity: Entity::Products,
    name: "Products",
    key: &["ProductID"],
    columns: &[
        column("ProductID", Integer),
        column("ProductName", Text),
        column("CategoryID", Integer),
        column("QuantityPerUnit", Text),
        column("UnitPrice", Float),
        column("UnitsInStock", Integer),
        column("UnitsOnOrder", Integer),
        column("ReorderLevel", Integer),
        column("Discontinued", Flag),
    ],
};

pub const CATEGORIES: SourceTable = SourceTable {
    entity: Entity::Categories,
    name: "Categories",
    key: &["CategoryID"],
    columns: &[
        column("CategoryID", Integer),
        column("CategoryName", Text),
        column("Description", Text),
    ],
};

pub const EMPLOYEES: SourceTable = SourceTable {
    entity: Entity::Employees,
    name: "Employees",
    key: &["EmployeeID"],
    columns: &[
        column("EmployeeID", Integer),
        column("LastName", Text),
        column("FirstName", Text),
        column("Title", Text),
        column("City", Text),
        column("Country", Text),
    ],
};

pub const SHIPPERS: SourceTable = SourceTable {
    entity: Entity::Shippers,
    name: "Shippers",
    key: &["ShipperID"],
    columns: &[
        column("ShipperID", Integer),
        column("CompanyName", Text),
        column("Phone", Text),
    ],
};

/// Extraction order.
pub const CATALOG: [SourceTable; 7] = [
    ORDERS,
    ORDER_DETAILS,
    CUSTOMERS,
    PRODUCTS,
    EMPLOYEES,
    SHIPPERS,
    CATEGORIES,
];

/// `OrderID` -> `order_id`, `Order Details` -> `order_details`,
/// `UnitsInStock` -> `units_in_stock`.
pub fn snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c == ' ' || c == '-' {
            if !out.ends_with('_') {
                out.push('_');
            }
            continue;
        }
        if c.is_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).map_or(false, |n| n.is_lowercase());
            let boundary = prev.is_lowercase() || prev.is_ascii_digit() || (prev.is_uppercase() && next_is_lower);
            if boundary && !out.ends_with('_') {
                out.push('_');
            }
        }
        out.extend(c.to_lowercase());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snake_case_handles_acronyms_and_spaces() {
        assert_eq!(snake_case("OrderID"), "order_id");
        assert_eq!(snake_case("ShipVia"), "ship_via");
        assert_eq!(snake_case("Order Details"), "order_details");
        assert_eq!(snake_case("UnitsInStock"), "units_in_stock");
        assert_eq!(snake_case("QuantityPerUnit"), "quantity_per_unit");
        assert_eq!(snake_case("Phone"), "phone");
    }

    #[test]
    fn every_key_column_is_declared() {
        for table in CATALOG {
            for key in table.key {
                assert!(table.column(key).is_some(), "{} key {} not declared", table.name, key);
            }
        }
    }

    #[test]
    fn file_stems_include_underscored_variant() {
        assert_eq!(ORDER_DETAILS.file_stems(), vec!["Order Details".to_string(), "Order_Details".to_string()]);
        assert_eq!(ORDERS.file_stems(), vec!["Orders".to_string()]);
    }
}
