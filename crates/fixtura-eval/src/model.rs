use std::path::PathBuf;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::metrics::MetricsReport;

/// Options for dataset evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluateOptions {
    /// Fail on invariant violations.
    pub strict: bool,
    /// Limit the number of examples emitted in the report.
    pub max_examples: usize,
    /// Expected registry row count, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_registries: Option<u64>,
    /// Expected order row count, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_orders: Option<u64>,
    /// Reference date of the run. Age and date window checks are skipped
    /// without one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_date: Option<NaiveDate>,
    /// Optional output directory override for metrics.json and report.md.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub out_dir: Option<PathBuf>,
}

impl Default for EvaluateOptions {
    fn default() -> Self {
        Self {
            strict: false,
            max_examples: 20,
            expected_registries: None,
            expected_orders: None,
            reference_date: None,
            out_dir: None,
        }
    }
}

/// Structured violation record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Violation {
    pub code: String,
    pub path: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_index: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
}

impl Violation {
    pub(crate) fn new(code: &str, path: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            path: path.to_string(),
            message: message.into(),
            row_index: None,
            example: None,
        }
    }

    pub(crate) fn at(mut self, row: usize) -> Self {
        self.row_index = Some(row as u64);
        self
    }

    pub(crate) fn example(mut self, value: impl Into<String>) -> Self {
        self.example = Some(value.into());
        self
    }
}

/// Result of a dataset evaluation.
#[derive(Debug, Clone)]
pub struct EvaluationResult {
    /// Set when the metrics were written to disk.
    pub metrics_path: Option<PathBuf>,
    pub report_path: Option<PathBuf>,
    pub metrics: MetricsReport,
    pub report: String,
    pub violations: Vec<Violation>,
}
