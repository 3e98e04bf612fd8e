use std::fmt;

use thiserror::Error;

/// Pipeline stage a failure originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Registry,
    Orders,
    Write,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Registry => "registry",
            Self::Orders => "orders",
            Self::Write => "write",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure of a single field value source.
#[derive(Debug, Clone, Error)]
#[error("{field}: {message}")]
pub struct SourceError {
    pub field: &'static str,
    pub message: String,
}

impl SourceError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Errors emitted by the generation engine.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("{stage} generation failed at row {row}: {source}")]
    Generation {
        stage: Stage,
        row: u64,
        #[source]
        source: SourceError,
    },
    #[error("cannot generate {requested} order(s): registry set is empty")]
    EmptyRegistry { requested: u64 },
    #[error("order references unknown national id '{national_id}'")]
    Referential { national_id: String },
    #[error("no unused national id after {attempts} attempt(s) ({issued} issued)")]
    NationalIdsExhausted { attempts: u32, issued: usize },
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("invalid dataset: {0}")]
    InvalidDataset(String),
    #[error("failed to create directory: {path}")]
    CreateDir {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),
    #[error("arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GenerationError {
    /// Stage the error is attributed to, when it carries one.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Self::Generation { stage, .. } => Some(*stage),
            Self::NationalIdsExhausted { .. } => Some(Stage::Registry),
            Self::EmptyRegistry { .. } | Self::Referential { .. } => Some(Stage::Orders),
            Self::CreateDir { .. }
            | Self::Io(_)
            | Self::Parquet(_)
            | Self::Arrow(_)
            | Self::Csv(_) => Some(Stage::Write),
            _ => None,
        }
    }
}
