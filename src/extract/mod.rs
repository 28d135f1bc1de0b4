//! Extraction: one raw frame per Northwind source table

pub mod supplement;

use crate::error::{EtlError, Result};
use crate::source::catalog::{self, Entity, SourceTable};
use crate::source::decode::rows_to_frame;
use crate::source::SourceConnection;
use polars::prelude::*;
use std::path::Path;
use tracing::info;

/// Raw source tables, columns named after the catalog.
#[derive(Debug, Clone)]
pub struct RawTables {
    pub customers: DataFrame,
    pub orders: DataFrame,
    pub order_details: DataFrame,
    pub products: DataFrame,
    pub categories: DataFrame,
    pub employees: DataFrame,
    pub shippers: DataFrame,
}

impl RawTables {
    pub fn get(&self, entity: Entity) -> &DataFrame {
        match entity {
            Entity::Customers => &self.customers,
            Entity::Orders => &self.orders,
            Entity::OrderDetails => &self.order_details,
            Entity::Products => &self.products,
            Entity::Categories => &self.categories,
            Entity::Employees => &self.employees,
            Entity::Shippers => &self.shippers,
        }
    }

    fn slot(&mut self, entity: Entity) -> &mut DataFrame {
        match entity {
            Entity::Customers => &mut self.customers,
            Entity::Orders => &mut self.orders,
            Entity::OrderDetails => &mut self.order_details,
            Entity::Products => &mut self.products,
            Entity::Categories => &mut self.categories,
            Entity::Employees => &mut self.employees,
            Entity::Shippers => &mut self.shippers,
        }
    }

    /// Empty frames for every entity, typed per catalog.
    pub fn empty() -> Result<Self> {
        let empty = |table: &SourceTable| rows_to_frame(table, &[]);
        Ok(Self {
            customers: empty(&catalog::CUSTOMERS)?,
            orders: empty(&catalog::ORDERS)?,
            order_details: empty(&catalog::ORDER_DETAILS)?,
            products: empty(&catalog::PRODUCTS)?,
            categories: empty(&catalog::CATEGORIES)?,
            employees: empty(&catalog::EMPLOYEES)?,
            shippers: empty(&catalog::SHIPPERS)?,
        })
    }
}

pub struct Extractor<'a> {
    conn: &'a mut dyn SourceConnection,
    extra_dir: Option<&'a Path>,
}

impl<'a> Extractor<'a> {
    pub fn new(conn: &'a mut dyn SourceConnection) -> Self {
        Self { conn, extra_dir: None }
    }

    /// Stacks rows from per-table CSV exports found in `dir` on top of the
    /// database rows.
    pub fn with_supplement(mut self, dir: Option<&'a Path>) -> Self {
        self.extra_dir = dir;
        self
    }

    pub async fn extract_all(&mut self) -> Result<RawTables> {
        let mut raw = RawTables::empty()?;
        for table in catalog::CATALOG.iter() {
            let frame = self.extract_table(table).await?;
            *raw.slot(table.entity) = frame;
        }
        Ok(raw)
    }

    pub async fn extract_table(&mut self, table: &SourceTable) -> Result<DataFrame> {
        self.check_schema(table).await?;

        let rows = self.conn.fetch_rows(table).await?;
        let mut frame = rows_to_frame(table, &rows)?;
        info!("   source {:<15}: {:>5} rows", table.name, frame.height());

        if let Some(dir) = self.extra_dir {
            if let Some(extra) = supplement::load(table, dir)? {
                info!("   extra  {:<15}: {:>5} rows", table.name, extra.height());
                frame = extra.vstack(&frame)?;
            }
        }
        Ok(frame)
    }

    /// A missing table or column is fatal.
    async fn check_schema(&mut self, table: &SourceTable) -> Result<()> {
        let dialect = self.conn.dialect();
        let present = self
            .conn
            .table_columns(table)
            .await?
            .ok_or_else(|| EtlError::MissingTable {
                table: dialect.table_name(table),
            })?;

        for column in table.columns {
            let wanted = dialect.column_name(column.name);
            if !present.iter().any(|p| p.eq_ignore_ascii_case(&wanted)) {
                return Err(EtlError::MissingColumn {
                    table: dialect.table_name(table),
                    column: wanted,
                });
            }
        }
        Ok(())
    }
}
