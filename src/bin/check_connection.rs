//! Connect to the configured source and list the Northwind tables
//!
//! Run with: cargo run --bin check-connection

use anyhow::{Context, Result};
use northwind_star::source::{self, CATALOG};
use northwind_star::{logging, EtlConfig};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    logging::init();

    let config = EtlConfig::from_env().context("invalid configuration")?;
    println!("🔌 Testing connection to {}\n", config.source.redacted());

    let mut conn = source::connect(&config.source)
        .await
        .with_context(|| format!("connecting to {}", config.source.redacted()))?;
    println!("✅ Connected: {}\n", conn.describe());

    let dialect = conn.dialect();
    let mut missing = 0;
    for table in CATALOG.iter() {
        let name = dialect.table_name(table);
        match conn.table_columns(table).await? {
            Some(columns) => {
                let rows = conn.row_count(table).await?;
                println!("   📋 {:<15} {:>6} rows, {} columns", name, rows, columns.len());
            }
            None => {
                missing += 1;
                println!("   ⚠️  {:<15} not found", name);
            }
        }
    }

    if missing > 0 {
        anyhow::bail!("{} of {} tables missing", missing, CATALOG.len());
    }
    println!("\n✅ All tables present");
    Ok(())
}
