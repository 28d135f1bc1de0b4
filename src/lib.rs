//! Northwind star-schema ETL
//!
//! Reads the Northwind sales database, reshapes it into a star schema of six
//! dimensions and two fact tables, writes one CSV per table, validates the
//! written files and serves a filtered sales dashboard over them.

pub mod config;
pub mod dashboard;
pub mod error;
pub mod extract;
pub mod load;
pub mod logging;
pub mod pipeline;
pub mod source;
pub mod star;
pub mod transform;
pub mod validate;

pub use config::{EtlConfig, SourceConfig};
pub use error::{EtlError, Result};
pub use star::OutputTable;
