use thiserror::Error;

/// Core error type shared across Fixtura crates.
#[derive(Debug, Error)]
pub enum Error {
    /// A persisted label does not map to any known categorical value.
    #[error("invalid value for {field}: '{value}'")]
    InvalidValue { field: &'static str, value: String },
}

/// Convenience alias for results returned by Fixtura crates.
pub type Result<T> = std::result::Result<T, Error>;
