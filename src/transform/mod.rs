//! Transformation: raw Northwind tables into the star schema
//!
//! Dimensions are cleaned first; facts are then restricted to keys that
//! resolve in every dimension they reference. Everything dropped along the way
//! is counted in [`TransformReport`].

pub mod dimensions;
pub mod facts;

use crate::error::Result;
use crate::extract::RawTables;
use crate::star::OutputTable;
use chrono::NaiveDate;
use polars::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct StarSchema {
    pub time: DataFrame,
    pub customer: DataFrame,
    pub product: DataFrame,
    pub category: DataFrame,
    pub employee: DataFrame,
    pub shipper: DataFrame,
    pub sales: DataFrame,
    pub orders: DataFrame,
}

impl StarSchema {
    pub fn table(&self, table: OutputTable) -> &DataFrame {
        match table {
            OutputTable::Time => &self.time,
            OutputTable::Customer => &self.customer,
            OutputTable::Product => &self.product,
            OutputTable::Category => &self.category,
            OutputTable::Employee => &self.employee,
            OutputTable::Shipper => &self.shipper,
            OutputTable::Sales => &self.sales,
            OutputTable::Orders => &self.orders,
        }
    }

    pub fn table_mut(&mut self, table: OutputTable) -> &mut DataFrame {
        match table {
            OutputTable::Time => &mut self.time,
            OutputTable::Customer => &mut self.customer,
            OutputTable::Product => &mut self.product,
            OutputTable::Category => &mut self.category,
            OutputTable::Employee => &mut self.employee,
            OutputTable::Shipper => &mut self.shipper,
            OutputTable::Sales => &mut self.sales,
            OutputTable::Orders => &mut self.orders,
        }
    }
}

/// Row accounting for one transformation run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TransformReport {
    pub orders_in: usize,
    pub duplicate_orders: usize,
    pub defaulted_order_dates: usize,
    pub order_lines_in: usize,
    pub invalid_lines: usize,
    pub orphan_lines: usize,
    /// Lines dropped per unresolved foreign key column.
    pub unresolved_lines: BTreeMap<String, usize>,
    /// Order headers dropped per unresolved foreign key column.
    pub unresolved_orders: BTreeMap<String, usize>,
}

impl TransformReport {
    pub fn dropped_lines(&self) -> usize {
        self.invalid_lines + self.orphan_lines + self.unresolved_lines.values().sum::<usize>()
    }

    pub fn log(&self) {
        info!(
            "   {} orders, {} order lines read",
            self.orders_in, self.order_lines_in
        );
        if self.duplicate_orders > 0 {
            warn!("   {} duplicate order ids ignored", self.duplicate_orders);
        }
        if self.defaulted_order_dates > 0 {
            warn!(
                "   {} orders without a date assigned the default date",
                self.defaulted_order_dates
            );
        }
        if self.invalid_lines > 0 {
            warn!("   {} invalid order lines rejected", self.invalid_lines);
        }
        if self.orphan_lines > 0 {
            warn!("   {} order lines without an order dropped", self.orphan_lines);
        }
        for (column, count) in self.unresolved_lines.iter().filter(|(_, c)| **c > 0) {
            warn!("   {} order lines with unresolved {} dropped", count, column);
        }
        for (column, count) in self.unresolved_orders.iter().filter(|(_, c)| **c > 0) {
            warn!("   {} orders with unresolved {} dropped", count, column);
        }
    }
}

pub struct Transformer {
    default_order_date: NaiveDate,
}

impl Transformer {
    pub fn new(default_order_date: NaiveDate) -> Self {
        Self { default_order_date }
    }

    pub fn run(&self, raw: &RawTables) -> Result<(StarSchema, TransformReport)> {
        let mut report = TransformReport {
            orders_in: raw.orders.height(),
            order_lines_in: raw.order_details.height(),
            ..Default::default()
        };

        info!("🔧 Building dimensions");
        let customer = dimensions::customer_dimension(&raw.customers)?;
        let category = dimensions::category_dimension(&raw.categories)?;
        let product = dimensions::product_dimension(&raw.products, &category)?;
        let employee = dimensions::employee_dimension(&raw.employees)?;
        let shipper = dimensions::shipper_dimension(&raw.shippers)?;

        let headers = facts::order_headers(&raw.orders, self.default_order_date)?;
        report.duplicate_orders = headers.duplicates;
        report.defaulted_order_dates = headers.defaulted_dates;
        let time = dimensions::time_dimension(&headers.dates)?;

        info!("🔧 Building facts");
        let (lines, invalid) = facts::order_lines(&raw.order_details)?;
        report.invalid_lines = invalid;
        let (mut lines, orphans) = facts::attach_headers(&lines, &headers.frame)?;
        report.orphan_lines = orphans;

        let line_checks: [(&str, &DataFrame); 5] = [
            ("CustomerKey", &customer),
            ("EmployeeKey", &employee),
            ("ShipperKey", &shipper),
            ("ProductKey", &product),
            ("TimeKey", &time),
        ];
        for (key, dimension) in line_checks {
            let (kept, dropped) = facts::retain_resolved(lines, key, dimension)?;
            report.unresolved_lines.insert(key.to_string(), dropped);
            lines = kept;
        }
        let sales = facts::finish_sales(lines)?;

        let mut resolved = headers.frame;
        let order_checks: [(&str, &DataFrame); 4] = [
            ("CustomerKey", &customer),
            ("EmployeeKey", &employee),
            ("ShipperKey", &shipper),
            ("TimeKey", &time),
        ];
        for (key, dimension) in order_checks {
            let (kept, dropped) = facts::retain_resolved(resolved, key, dimension)?;
            report.unresolved_orders.insert(key.to_string(), dropped);
            resolved = kept;
        }
        let orders = facts::order_rollup(&resolved, &sales)?;

        let star = StarSchema {
            time,
            customer,
            product,
            category,
            employee,
            shipper,
            sales,
            orders,
        };
        report.log();
        Ok((star, report))
    }
}
