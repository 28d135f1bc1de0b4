//! End-to-end ETL run: connect, extract, transform, write

use crate::config::EtlConfig;
use crate::error::Result;
use crate::extract::Extractor;
use crate::load::{StarWriter, WrittenFile};
use crate::source::{self, SourceConnection};
use crate::transform::{TransformReport, Transformer};
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;
use std::path::Path;
use std::time::Instant;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
pub struct PipelineSummary {
    pub run_id: String,
    pub source: String,
    pub report: TransformReport,
    pub files: Vec<WrittenFile>,
    pub elapsed_ms: u128,
}

impl fmt::Display for PipelineSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "✅ ETL run {} from {} ({} ms)", self.run_id, self.source, self.elapsed_ms)?;
        for file in &self.files {
            writeln!(f, "   {:<16} {:>6} rows", file.table.file_name(), file.rows)?;
        }
        write!(f, "   order lines dropped: {}", self.report.dropped_lines())
    }
}

pub async fn run(config: &EtlConfig) -> Result<PipelineSummary> {
    info!("🔌 Connecting to {}", config.source.redacted());
    let mut conn = source::connect(&config.source).await?;
    let extra_dir = config.existing_extra_dir().map(|p| p.as_path());
    run_with_connection(
        conn.as_mut(),
        extra_dir,
        config.default_order_date,
        &config.output_dir,
    )
    .await
}

/// Runs the stages against an already open source.
pub async fn run_with_connection(
    conn: &mut dyn SourceConnection,
    extra_dir: Option<&Path>,
    default_order_date: NaiveDate,
    output_dir: &Path,
) -> Result<PipelineSummary> {
    let started = Instant::now();
    let run_id = Uuid::new_v4().to_string();
    let source = conn.describe();
    info!("🚀 ETL run {} starting from {}", run_id, source);

    info!("📥 Extracting");
    let raw = Extractor::new(conn).with_supplement(extra_dir).extract_all().await?;

    info!("🔧 Transforming");
    let (mut star, report) = Transformer::new(default_order_date).run(&raw)?;

    info!("💾 Writing to {}", output_dir.display());
    let files = StarWriter::new(output_dir).write_all(&mut star)?;

    let elapsed_ms = started.elapsed().as_millis();
    info!("✅ ETL run {} finished in {} ms", run_id, elapsed_ms);
    Ok(PipelineSummary {
        run_id,
        source,
        report,
        files,
        elapsed_ms,
    })
}
