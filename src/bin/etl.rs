//! Extract the Northwind database, build the star schema, write CSV files

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use northwind_star::{logging, pipeline, EtlConfig, SourceConfig};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "northwind-etl")]
#[command(about = "Build the Northwind sales star schema")]
struct Args {
    /// SQLite database file (overrides NORTHWIND_DB_PATH)
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// PostgreSQL URL; selects the postgres source
    #[arg(long)]
    database_url: Option<String>,

    /// Output directory (overrides NORTHWIND_OUTPUT_DIR)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Supplementary CSV directory (overrides NORTHWIND_EXTRA_DIR)
    #[arg(long)]
    extra_dir: Option<PathBuf>,

    /// Date used for orders without one, YYYY-MM-DD
    #[arg(long)]
    default_order_date: Option<NaiveDate>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    logging::init();
    let args = Args::parse();

    let mut config = EtlConfig::from_env().context("invalid configuration")?;
    if let Some(url) = args.database_url {
        config.source = SourceConfig::Postgres { url };
    } else if let Some(path) = args.db_path {
        config.source = SourceConfig::Sqlite { path };
    }
    if let Some(dir) = args.output_dir {
        config.output_dir = dir;
    }
    if let Some(dir) = args.extra_dir {
        config.extra_dir = Some(dir);
    }
    if let Some(date) = args.default_order_date {
        config.default_order_date = date;
    }

    let summary = pipeline::run(&config)
        .await
        .with_context(|| format!("ETL from {} failed", config.source.redacted()))?;
    println!("{}", summary);
    Ok(())
}
