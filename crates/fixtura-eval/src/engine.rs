use std::collections::{HashMap, HashSet};
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{info, warn};

use fixtura_core::{
    DISCOUNT_VALUE_RANGE, Gender, HOUSE_NUMBER_RANGE, ORDER_VALUE_RANGE, ORDERS_DATASET,
    OrderRecord, OrderStatus, PaymentMethod, REGISTRY_DATASET, RegistryRecord,
    SHIPPING_VALUE_RANGE, WeightedValue,
};
use fixtura_generate::engine::REPORT_FILE;
use fixtura_generate::generators::DateWindow;
use fixtura_generate::{
    GenerationReport, OutputFormat, dataset_path, read_orders_parquet, read_registry_parquet,
};

use crate::errors::EvalError;
use crate::metrics::{
    CHI_SQUARE_P999, CategoryFrequency, CheckStats, CheckSummary, DatasetMetrics,
    FrequencyTable, METRICS_VERSION, MetricsReport, PerformanceMetrics, WarningItem,
};
use crate::model::{EvaluateOptions, EvaluationResult, Violation};
use crate::report::render_report;

pub const METRICS_FILE: &str = "metrics.json";
pub const REPORT_MD_FILE: &str = "report.md";

/// Evaluate generated datasets stored below a base directory.
#[derive(Debug, Clone)]
pub struct EvaluationEngine {
    options: EvaluateOptions,
}

impl EvaluationEngine {
    pub fn new(options: EvaluateOptions) -> Self {
        Self { options }
    }

    /// Read both Parquet datasets, evaluate them and write `metrics.json` and
    /// `report.md`. In strict mode any violation fails the run after the
    /// outputs are written.
    pub fn run(&self, dataset_dir: &Path) -> Result<EvaluationResult, EvalError> {
        let total_start = Instant::now();
        let load_start = Instant::now();

        let registry_path = existing_dataset(dataset_dir, REGISTRY_DATASET)?;
        let orders_path = existing_dataset(dataset_dir, ORDERS_DATASET)?;
        let registry = read_registry_parquet(&registry_path)?;
        let orders = read_orders_parquet(&orders_path)?;

        let run = detect_run(dataset_dir);
        let mut options = self.options.clone();
        if options.reference_date.is_none() {
            options.reference_date = run.as_ref().map(|report| report.reference_date);
        }
        let run_id = run
            .as_ref()
            .map(|report| report.run_id.clone())
            .unwrap_or_else(|| "unknown".to_string());
        let seed = run.as_ref().map(|report| report.seed);
        let load_ms = load_start.elapsed().as_millis();

        let mut result = evaluate(&registry, &orders, &options, run_id, seed);
        result.metrics.performance.load_ms = load_ms;
        result.metrics.performance.total_ms = total_start.elapsed().as_millis();
        result.report = render_report(&result.metrics, &result.violations, options.max_examples);

        let out_dir = options
            .out_dir
            .clone()
            .unwrap_or_else(|| dataset_dir.to_path_buf());
        std::fs::create_dir_all(&out_dir)?;

        let metrics_path = out_dir.join(METRICS_FILE);
        std::fs::write(&metrics_path, serde_json::to_vec_pretty(&result.metrics)?)?;
        let report_path = out_dir.join(REPORT_MD_FILE);
        std::fs::write(&report_path, result.report.as_bytes())?;
        result.metrics_path = Some(metrics_path);
        result.report_path = Some(report_path);

        info!(
            dir = %dataset_dir.display(),
            registries = registry.len(),
            orders = orders.len(),
            violations = result.violations.len(),
            total_ms = result.metrics.performance.total_ms as u64,
            "evaluation completed"
        );

        if options.strict && !result.violations.is_empty() {
            warn!(violations = result.violations.len(), "strict evaluation failed");
            return Err(EvalError::Violations(result.violations.len() as u64));
        }

        Ok(result)
    }
}

/// Evaluate the Parquet datasets below `base`.
pub fn evaluate_dir(base: &Path, options: &EvaluateOptions) -> Result<EvaluationResult, EvalError> {
    EvaluationEngine::new(options.clone()).run(base)
}

/// Evaluate in-memory record sets. Nothing is written and strict mode is not
/// applied; callers inspect `violations` directly.
pub fn evaluate_datasets(
    registry: &[RegistryRecord],
    orders: &[OrderRecord],
    options: &EvaluateOptions,
) -> EvaluationResult {
    let mut result = evaluate(registry, orders, options, "in-memory".to_string(), None);
    result.report = render_report(&result.metrics, &result.violations, options.max_examples);
    result
}

fn evaluate(
    registry: &[RegistryRecord],
    orders: &[OrderRecord],
    options: &EvaluateOptions,
    run_id: String,
    seed: Option<u64>,
) -> EvaluationResult {
    let validate_start = Instant::now();
    let mut checks = CheckSummary::default();
    let mut violations = Vec::new();
    let mut warnings = Vec::new();

    let windows = options.reference_date.and_then(|reference| {
        let birth = DateWindow::birth_dates(reference).ok()?;
        let history = DateWindow::history(reference).ok()?;
        Some(Windows { birth, history })
    });
    if windows.is_none() {
        warnings.push(WarningItem {
            code: "date_windows_skipped".to_string(),
            path: "*".to_string(),
            message: "no usable reference date; age and date windows not checked".to_string(),
            hint: Some("pass --reference-date or keep generation_report.json".to_string()),
        });
    }

    let datasets = vec![
        row_count(
            REGISTRY_DATASET,
            registry.len(),
            options.expected_registries,
            &mut checks.row_count,
            &mut violations,
        ),
        row_count(
            ORDERS_DATASET,
            orders.len(),
            options.expected_orders,
            &mut checks.row_count,
            &mut violations,
        ),
    ];

    let customers = check_registry(registry, windows.as_ref(), &mut checks, &mut violations);
    check_orders(
        orders,
        &customers,
        windows.as_ref(),
        &mut checks,
        &mut violations,
    );

    let frequencies = vec![
        frequency_table(
            "cadastros.gender",
            Gender::ALL.iter().map(|gender| (gender.to_string(), 0.5)).collect(),
            registry.iter().map(|record| record.gender.to_string()),
        ),
        weighted_frequency::<PaymentMethod>(
            "pedidos.payment_method",
            orders.iter().map(|order| order.payment_method),
        ),
        weighted_frequency::<OrderStatus>(
            "pedidos.order_status",
            orders.iter().map(|order| order.order_status),
        ),
    ];
    for table in frequencies.iter().filter(|table| !table.consistent) {
        warnings.push(WarningItem {
            code: "frequency_drift".to_string(),
            path: table.field.clone(),
            message: format!(
                "chi-square {:.2} with {} degree(s) of freedom exceeds the p=0.001 critical value",
                table.chi_square, table.degrees_of_freedom
            ),
            hint: Some("check the weight table used by the generator".to_string()),
        });
    }

    sort_warnings(&mut warnings);
    sort_violations(&mut violations);

    let metrics = MetricsReport {
        metrics_version: METRICS_VERSION.to_string(),
        run_id,
        seed,
        reference_date: options.reference_date.map(|date| date.to_string()),
        datasets,
        checks,
        frequencies,
        warnings,
        performance: PerformanceMetrics {
            load_ms: 0,
            validate_ms: validate_start.elapsed().as_millis(),
            total_ms: validate_start.elapsed().as_millis(),
        },
    };

    EvaluationResult {
        metrics_path: None,
        report_path: None,
        metrics,
        report: String::new(),
        violations,
    }
}

struct Windows {
    birth: DateWindow,
    history: DateWindow,
}

fn row_count(
    dataset: &str,
    found: usize,
    expected: Option<u64>,
    stats: &mut CheckStats,
    violations: &mut Vec<Violation>,
) -> DatasetMetrics {
    let found = found as u64;
    if let Some(expected) = expected {
        if !stats.record(found == expected) {
            violations.push(Violation::new(
                "row_count",
                dataset,
                format!("expected {expected} row(s), found {found}"),
            ));
        }
    }
    DatasetMetrics {
        dataset: dataset.to_string(),
        rows_found: found,
        rows_expected: expected,
    }
}

fn check_registry<'a>(
    registry: &'a [RegistryRecord],
    windows: Option<&Windows>,
    checks: &mut CheckSummary,
    violations: &mut Vec<Violation>,
) -> HashMap<&'a str, &'a RegistryRecord> {
    let mut customers: HashMap<&str, &RegistryRecord> = HashMap::with_capacity(registry.len());
    let mut ids: HashSet<&str> = HashSet::with_capacity(registry.len());
    let (min_number, max_number) = HOUSE_NUMBER_RANGE;

    for (row, record) in registry.iter().enumerate() {
        let first = !customers.contains_key(record.national_id.as_str());
        if first {
            customers.insert(record.national_id.as_str(), record);
        }
        if !checks.unique.record(first) {
            violations.push(
                Violation::new("duplicate_key", "cadastros.national_id", "national id repeated")
                    .at(row)
                    .example(record.national_id.clone()),
            );
        }
        if !checks.unique.record(ids.insert(record.id.as_str())) {
            violations.push(
                Violation::new("duplicate_key", "cadastros.id", "id repeated")
                    .at(row)
                    .example(record.id.clone()),
            );
        }

        if !checks
            .value_range
            .record((min_number..=max_number).contains(&record.number))
        {
            violations.push(
                Violation::new(
                    "value_range",
                    "cadastros.number",
                    format!("house number outside [{min_number}, {max_number}]"),
                )
                .at(row)
                .example(record.number.to_string()),
            );
        }

        if let Some(windows) = windows {
            if !checks.date_window.record(windows.birth.contains(record.birth_date)) {
                violations.push(
                    Violation::new("age_window", "cadastros.birth_date", "age outside [18, 85]")
                        .at(row)
                        .example(record.birth_date.to_string()),
                );
            }
            if !checks
                .date_window
                .record(windows.history.contains(record.registration_date))
            {
                violations.push(
                    Violation::new(
                        "date_window",
                        "cadastros.registration_date",
                        "registration date outside the trailing two years",
                    )
                    .at(row)
                    .example(record.registration_date.to_string()),
                );
            }
        }
    }

    customers
}

fn check_orders(
    orders: &[OrderRecord],
    customers: &HashMap<&str, &RegistryRecord>,
    windows: Option<&Windows>,
    checks: &mut CheckSummary,
    violations: &mut Vec<Violation>,
) {
    let mut order_ids: HashSet<&str> = HashSet::with_capacity(orders.len());

    for (row, order) in orders.iter().enumerate() {
        if !checks.unique.record(order_ids.insert(order.order_id.as_str())) {
            violations.push(
                Violation::new("duplicate_key", "pedidos.order_id", "order id repeated")
                    .at(row)
                    .example(order.order_id.clone()),
            );
        }

        let customer = customers.get(order.customer_national_id.as_str());
        if !checks.foreign_key.record(customer.is_some()) {
            violations.push(
                Violation::new(
                    "fk_missing",
                    "pedidos.customer_national_id",
                    "national id not found in cadastros",
                )
                .at(row)
                .example(order.customer_national_id.clone()),
            );
        }
        if let Some(customer) = customer {
            check_delivery(row, order, customer, &mut checks.delivery, violations);
        }

        money_in_range(
            row,
            "pedidos.order_value",
            order.order_value,
            ORDER_VALUE_RANGE,
            &mut checks.value_range,
            violations,
        );
        money_in_range(
            row,
            "pedidos.shipping_value",
            order.shipping_value,
            SHIPPING_VALUE_RANGE,
            &mut checks.value_range,
            violations,
        );
        if order.discount_value != 0.0 {
            money_in_range(
                row,
                "pedidos.discount_value",
                order.discount_value,
                DISCOUNT_VALUE_RANGE,
                &mut checks.value_range,
                violations,
            );
        } else {
            checks.value_range.record(true);
        }

        let coupon_ok = match &order.coupon {
            Some(coupon) => order.discount_value > 0.0 && !coupon.is_empty(),
            None => order.discount_value <= 0.0,
        };
        if !checks.coupon.record(coupon_ok) {
            violations.push(
                Violation::new(
                    "coupon_mismatch",
                    "pedidos.coupon",
                    "coupon must be present exactly when a discount is applied",
                )
                .at(row)
                .example(format!(
                    "discount={:.2} coupon={}",
                    order.discount_value,
                    order.coupon.as_deref().unwrap_or("null")
                )),
            );
        }

        if let Some(windows) = windows {
            if !checks.date_window.record(windows.history.contains(order.order_date)) {
                violations.push(
                    Violation::new(
                        "date_window",
                        "pedidos.order_date",
                        "order date outside the trailing two years",
                    )
                    .at(row)
                    .example(order.order_date.to_string()),
                );
            }
        }
    }
}

fn check_delivery(
    row: usize,
    order: &OrderRecord,
    customer: &RegistryRecord,
    stats: &mut CheckStats,
    violations: &mut Vec<Violation>,
) {
    let expected = customer.delivery_address();
    let fields = [
        ("pedidos.delivery_address", &order.delivery_address, &expected.address),
        ("pedidos.delivery_city", &order.delivery_city, &expected.city),
        ("pedidos.delivery_state", &order.delivery_state, &expected.state),
        ("pedidos.delivery_country", &order.delivery_country, &expected.country),
    ];
    for (path, found, wanted) in fields {
        if !stats.record(found == wanted) {
            violations.push(
                Violation::new(
                    "delivery_mismatch",
                    path,
                    "delivery field differs from the referenced registry record",
                )
                .at(row)
                .example(format!("found '{found}', expected '{wanted}'")),
            );
        }
    }
}

fn money_in_range(
    row: usize,
    path: &str,
    value: f64,
    range: (f64, f64),
    stats: &mut CheckStats,
    violations: &mut Vec<Violation>,
) {
    let (min, max) = range;
    let in_range = min <= value && value <= max;
    let in_cents = ((value * 100.0).round() / 100.0 - value).abs() < 1e-9;
    if !stats.record(in_range && in_cents) {
        violations.push(
            Violation::new(
                "value_range",
                path,
                format!("value outside [{min:.2}, {max:.2}] or not rounded to cents"),
            )
            .at(row)
            .example(value.to_string()),
        );
    }
}

fn weighted_frequency<T: WeightedValue + Display>(
    field: &str,
    values: impl Iterator<Item = T>,
) -> FrequencyTable {
    frequency_table(
        field,
        T::ALL
            .iter()
            .map(|value| (value.to_string(), value.share()))
            .collect(),
        values.map(|value| value.to_string()),
    )
}

fn frequency_table(
    field: &str,
    expected: Vec<(String, f64)>,
    labels: impl Iterator<Item = String>,
) -> FrequencyTable {
    let mut observed: HashMap<String, u64> = HashMap::new();
    let mut total = 0_u64;
    for label in labels {
        *observed.entry(label).or_default() += 1;
        total += 1;
    }

    let mut chi_square = 0.0;
    let categories: Vec<CategoryFrequency> = expected
        .into_iter()
        .map(|(label, expected_share)| {
            let count = observed.get(&label).copied().unwrap_or(0);
            let expected_count = expected_share * total as f64;
            if expected_count > 0.0 {
                chi_square += (count as f64 - expected_count).powi(2) / expected_count;
            }
            CategoryFrequency {
                observed_share: if total > 0 {
                    count as f64 / total as f64
                } else {
                    0.0
                },
                label,
                observed: count,
                expected_share,
            }
        })
        .collect();

    let degrees_of_freedom = categories.len().saturating_sub(1) as u32;
    let consistent = total == 0
        || degrees_of_freedom == 0
        || CHI_SQUARE_P999
            .get(degrees_of_freedom as usize - 1)
            .is_none_or(|critical| chi_square < *critical);

    FrequencyTable {
        field: field.to_string(),
        total,
        categories,
        chi_square,
        degrees_of_freedom,
        consistent,
    }
}

/// Checks read Parquet only; a CSV run is named in the error.
fn existing_dataset(base: &Path, dataset: &str) -> Result<PathBuf, EvalError> {
    let path = dataset_path(base, dataset, OutputFormat::Parquet);
    if !path.exists() {
        let csv = dataset_path(base, dataset, OutputFormat::Csv);
        if csv.exists() {
            return Err(EvalError::InvalidDataset(format!(
                "found CSV dataset '{}' but only Parquet runs can be checked; regenerate with --format parquet",
                csv.display()
            )));
        }
        return Err(EvalError::InvalidDataset(format!(
            "missing dataset file '{}'",
            path.display()
        )));
    }
    Ok(path)
}

fn detect_run(dataset_dir: &Path) -> Option<GenerationReport> {
    let contents = std::fs::read_to_string(dataset_dir.join(REPORT_FILE)).ok()?;
    serde_json::from_str::<GenerationReport>(&contents).ok()
}

fn sort_warnings(warnings: &mut [WarningItem]) {
    warnings.sort_by(|a, b| (a.path.as_str(), a.code.as_str()).cmp(&(b.path.as_str(), b.code.as_str())));
}

fn sort_violations(violations: &mut [Violation]) {
    violations.sort_by(|a, b| {
        (
            a.path.as_str(),
            a.code.as_str(),
            a.row_index.unwrap_or_default(),
        )
            .cmp(&(
                b.path.as_str(),
                b.code.as_str(),
                b.row_index.unwrap_or_default(),
            ))
    });
}
