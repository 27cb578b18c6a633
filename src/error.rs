//! Error types for the analytics pipeline.
//!
//! Only whole-run failures live here. Per-record problems (bad dates, missing
//! coordinates, `Unknown` labels) are absorbed by the analyzers.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("input is missing required columns: {}", missing.join(", "))]
    Schema { missing: Vec<String> },

    #[error("input contains no records")]
    EmptyInput,

    #[error("invalid clustering configuration: {0}")]
    InvalidConfig(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
