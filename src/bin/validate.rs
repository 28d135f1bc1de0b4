//! Check the written star schema; exits 1 when any check fails

use anyhow::{Context, Result};
use clap::Parser;
use northwind_star::validate::Validator;
use northwind_star::{logging, EtlConfig};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "northwind-validate")]
#[command(about = "Validate the Northwind star-schema output files")]
struct Args {
    /// Directory holding the CSV files (overrides NORTHWIND_OUTPUT_DIR)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<ExitCode> {
    dotenv::dotenv().ok();
    logging::init();
    let args = Args::parse();

    let output_dir = match args.output_dir {
        Some(dir) => dir,
        None => EtlConfig::from_env().context("invalid configuration")?.output_dir,
    };

    let report = Validator::new(&output_dir)
        .run()
        .with_context(|| format!("validating {}", output_dir.display()))?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", report);
    }

    Ok(if report.passed() { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}
