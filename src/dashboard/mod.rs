//! Interactive sales dashboard over the written star schema

pub mod data;
pub mod filter;
pub mod metrics;
pub mod render;
pub mod server;

use crate::error::Result;
use data::{DashboardData, FileSignature};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub use filter::DashboardFilter;

/// Loaded data plus the directory it is refreshed from.
pub struct DashboardState {
    dir: PathBuf,
    data: DashboardData,
}

impl DashboardState {
    /// Fails if any output file is missing or malformed.
    pub fn load(dir: &Path) -> Result<Self> {
        let data = DashboardData::load(dir)?;
        info!(
            "📊 Loaded {} order lines and {} orders from {}",
            data.lines.height(),
            data.orders.height(),
            dir.display()
        );
        Ok(Self {
            dir: dir.to_path_buf(),
            data,
        })
    }

    pub fn data(&self) -> &DashboardData {
        &self.data
    }

    /// Reloads when the files changed since the last load. A failed reload
    /// keeps the current data. Returns whether new data was installed.
    pub fn refresh(&mut self) -> bool {
        match FileSignature::of(&self.dir) {
            Ok(sig) if sig == self.data.signature => false,
            Ok(_) => match DashboardData::load(&self.dir) {
                Ok(data) => {
                    info!("🔄 Output files changed, reloaded {} order lines", data.lines.height());
                    self.data = data;
                    true
                }
                Err(e) => {
                    warn!("Reload failed, serving previous data: {}", e);
                    false
                }
            },
            Err(e) => {
                warn!("Cannot check output files, serving previous data: {}", e);
                false
            }
        }
    }
}
