use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Missing source table: {table}")]
    MissingTable { table: String },

    #[error("Missing column {column} in {table}")]
    MissingColumn { table: String, column: String },

    #[error("Transform error: {0}")]
    Transform(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Dashboard error: {0}")]
    Dashboard(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Polars error: {0}")]
    Polars(String),
}

impl EtlError {
    /// Schema errors are the ones raised when the source does not match the catalog.
    pub fn is_schema_error(&self) -> bool {
        matches!(self, EtlError::MissingTable { .. } | EtlError::MissingColumn { .. })
    }
}

impl From<polars::error::PolarsError> for EtlError {
    fn from(err: polars::error::PolarsError) -> Self {
        EtlError::Polars(err.to_string())
    }
}

impl From<rusqlite::Error> for EtlError {
    fn from(err: rusqlite::Error) -> Self {
        EtlError::Database(err.to_string())
    }
}

impl From<sqlx::Error> for EtlError {
    fn from(err: sqlx::Error) -> Self {
        EtlError::Database(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
