use serde::{Deserialize, Serialize};

/// Metrics contract version for dataset evaluation.
pub const METRICS_VERSION: &str = "0.1";

/// Upper tail critical values of the chi-square distribution at p = 0.001,
/// indexed by degrees of freedom minus one.
pub const CHI_SQUARE_P999: [f64; 5] = [10.83, 13.82, 16.27, 18.47, 20.52];

/// Machine-readable metrics for a dataset evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsReport {
    pub metrics_version: String,
    pub run_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_date: Option<String>,
    pub datasets: Vec<DatasetMetrics>,
    pub checks: CheckSummary,
    pub frequencies: Vec<FrequencyTable>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<WarningItem>,
    pub performance: PerformanceMetrics,
}

/// Per-dataset row counts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetMetrics {
    pub dataset: String,
    pub rows_found: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows_expected: Option<u64>,
}

/// Outcome counters per invariant family.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckSummary {
    pub row_count: CheckStats,
    pub unique: CheckStats,
    pub foreign_key: CheckStats,
    pub delivery: CheckStats,
    pub value_range: CheckStats,
    pub coupon: CheckStats,
    pub date_window: CheckStats,
}

impl CheckSummary {
    /// `(name, stats)` pairs in report order.
    pub fn rows(&self) -> [(&'static str, &CheckStats); 7] {
        [
            ("row_count", &self.row_count),
            ("unique", &self.unique),
            ("foreign_key", &self.foreign_key),
            ("delivery", &self.delivery),
            ("value_range", &self.value_range),
            ("coupon", &self.coupon),
            ("date_window", &self.date_window),
        ]
    }

    pub fn total_violations(&self) -> u64 {
        self.rows().iter().map(|(_, stats)| stats.violations).sum()
    }
}

/// Generic check counter.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckStats {
    pub checked: u64,
    pub violations: u64,
}

impl CheckStats {
    pub(crate) fn record(&mut self, ok: bool) -> bool {
        self.checked += 1;
        if !ok {
            self.violations += 1;
        }
        ok
    }
}

/// Observed category frequencies of one field against its weights.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrequencyTable {
    pub field: String,
    pub total: u64,
    pub categories: Vec<CategoryFrequency>,
    pub chi_square: f64,
    pub degrees_of_freedom: u32,
    /// Statistic is below the p = 0.001 critical value.
    pub consistent: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryFrequency {
    pub label: String,
    pub observed: u64,
    pub observed_share: f64,
    pub expected_share: f64,
}

/// Structured warning entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarningItem {
    pub code: String,
    pub path: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

/// Performance timings for the evaluation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub load_ms: u128,
    pub validate_ms: u128,
    pub total_ms: u128,
}
