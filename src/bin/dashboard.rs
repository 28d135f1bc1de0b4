//! Serve the sales dashboard over the written star schema

use anyhow::{Context, Result};
use clap::Parser;
use northwind_star::dashboard::{server, DashboardState};
use northwind_star::{logging, EtlConfig};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "northwind-dashboard")]
#[command(about = "Interactive Northwind sales dashboard")]
struct Args {
    /// Directory holding the CSV files (overrides NORTHWIND_OUTPUT_DIR)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Listen address (overrides DASHBOARD_ADDR)
    #[arg(short, long)]
    addr: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    logging::init();
    let args = Args::parse();

    let config = EtlConfig::from_env().context("invalid configuration")?;
    let output_dir = args.output_dir.unwrap_or(config.output_dir);
    let addr = args.addr.unwrap_or(config.dashboard_addr);

    let state = DashboardState::load(&output_dir)
        .with_context(|| format!("loading star schema from {}", output_dir.display()))?;
    server::serve(&addr, state)
        .await
        .with_context(|| format!("serving on {}", addr))?;
    Ok(())
}
