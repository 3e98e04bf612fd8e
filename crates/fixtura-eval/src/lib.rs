//! Invariant evaluation for generated registry and order datasets.

pub mod engine;
pub mod errors;
pub mod metrics;
pub mod model;
pub mod report;

pub use engine::{EvaluationEngine, evaluate_datasets, evaluate_dir};
pub use errors::EvalError;
pub use metrics::{CheckStats, CheckSummary, FrequencyTable, MetricsReport};
pub use model::{EvaluateOptions, EvaluationResult, Violation};
pub use report::render_report;
