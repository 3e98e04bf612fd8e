use std::path::PathBuf;

use chrono::NaiveDate;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use fixtura_core::{OrderRecord, RegistryRecord};
use fixtura_eval::{EvalError, EvaluateOptions, evaluate_datasets, evaluate_dir};
use fixtura_generate::generators::{GeneratorContext, generate_orders, generate_registry};
use fixtura_generate::{FakerSource, GenerateOptions, GenerationEngine, LocaleKey, OutputFormat};

fn reference_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 16).expect("valid date")
}

fn fixture(registries: u64, orders: u64) -> (Vec<RegistryRecord>, Vec<OrderRecord>) {
    let source = FakerSource::new(LocaleKey::PtBr);
    let ctx = GeneratorContext::new(&source, reference_date());
    let mut rng = ChaCha8Rng::seed_from_u64(77);
    let registry = generate_registry(registries, &ctx, &mut rng)
        .expect("registry")
        .records;
    let orders = generate_orders(&registry, orders, &ctx, &mut rng).expect("orders");
    (registry, orders)
}

fn options() -> EvaluateOptions {
    EvaluateOptions {
        expected_registries: Some(50),
        expected_orders: Some(400),
        reference_date: Some(reference_date()),
        ..EvaluateOptions::default()
    }
}

fn codes(violations: &[fixtura_eval::Violation]) -> Vec<&str> {
    violations.iter().map(|v| v.code.as_str()).collect()
}

#[test]
fn generated_datasets_have_no_violations() {
    let (registry, orders) = fixture(50, 400);
    let result = evaluate_datasets(&registry, &orders, &options());

    assert!(result.violations.is_empty(), "{:?}", result.violations);
    let checks = &result.metrics.checks;
    assert_eq!(checks.foreign_key.checked, 400);
    assert_eq!(checks.coupon.checked, 400);
    assert_eq!(checks.row_count.checked, 2);
    assert_eq!(checks.total_violations(), 0);
    assert_eq!(result.metrics.frequencies.len(), 3);
    assert!(result.report.contains("# Fixtura Evaluation Report"));
    assert!(result.report.contains("no violations detected"));
}

#[test]
fn corrupted_records_are_flagged() {
    let (mut registry, mut orders) = fixture(50, 400);

    registry[1].national_id = registry[0].national_id.clone();
    registry[2].birth_date = NaiveDate::from_ymd_opt(2020, 1, 1).expect("date");
    orders[0].customer_national_id = "999.999.999-99".to_string();
    let delivery = registry[0].delivery_address();
    orders[1].customer_national_id = registry[0].national_id.clone();
    orders[1].delivery_address = delivery.address;
    orders[1].delivery_state = delivery.state;
    orders[1].delivery_country = delivery.country;
    orders[1].delivery_city = "Atlantis".to_string();
    orders[2].order_value = 9_999.0;
    orders[3].discount_value = 5.0;
    orders[4].discount_value = 0.0;
    orders[4].coupon = Some("VOLTA".to_string());

    let result = evaluate_datasets(&registry, &orders, &options());
    let found = codes(&result.violations);
    for code in [
        "duplicate_key",
        "age_window",
        "fk_missing",
        "delivery_mismatch",
        "value_range",
        "coupon_mismatch",
    ] {
        assert!(found.contains(&code), "missing {code} in {found:?}");
    }
    assert!(result.report.contains("## Top violations"));
}

#[test]
fn row_count_mismatch_is_a_violation() {
    let (registry, orders) = fixture(50, 400);
    let mut opts = options();
    opts.expected_orders = Some(401);

    let result = evaluate_datasets(&registry, &orders, &opts);
    assert_eq!(codes(&result.violations), vec!["row_count"]);
}

#[test]
fn missing_reference_date_skips_date_windows() {
    let (registry, orders) = fixture(10, 20);
    let opts = EvaluateOptions::default();

    let result = evaluate_datasets(&registry, &orders, &opts);
    assert_eq!(result.metrics.checks.date_window.checked, 0);
    assert!(
        result
            .metrics
            .warnings
            .iter()
            .any(|w| w.code == "date_windows_skipped")
    );
}

fn temp_dir(label: &str) -> PathBuf {
    std::env::temp_dir().join(format!("fixtura_eval_{label}_{}", uuid::Uuid::new_v4()))
}

#[test]
fn evaluate_dir_reads_generated_run() {
    let base = temp_dir("dir");
    let generate = GenerateOptions {
        out_dir: base.clone(),
        registry_count: 60,
        order_count: 200,
        seed: Some(5),
        reference_date: Some(reference_date()),
        write_report: true,
        ..GenerateOptions::default()
    };
    GenerationEngine::new(generate).run().expect("generate");

    let opts = EvaluateOptions {
        strict: true,
        expected_registries: Some(60),
        expected_orders: Some(200),
        ..EvaluateOptions::default()
    };
    let result = evaluate_dir(&base, &opts).expect("evaluate");
    assert!(result.violations.is_empty());
    assert_eq!(result.metrics.seed, Some(5));
    assert_eq!(result.metrics.reference_date.as_deref(), Some("2026-10-16"));
    assert!(result.metrics.checks.date_window.checked > 0);
    assert!(base.join("metrics.json").exists());
    assert!(base.join("report.md").exists());

    let strict = EvaluateOptions {
        strict: true,
        expected_orders: Some(1),
        ..EvaluateOptions::default()
    };
    let err = evaluate_dir(&base, &strict).expect_err("strict must fail");
    assert!(matches!(err, EvalError::Violations(1)));

    let _ = std::fs::remove_dir_all(&base);
}

#[test]
fn evaluate_dir_requires_both_datasets() {
    let base = temp_dir("missing");
    std::fs::create_dir_all(&base).expect("create dir");

    let err = evaluate_dir(&base, &EvaluateOptions::default()).expect_err("must fail");
    assert!(matches!(err, EvalError::InvalidDataset(_)));

    let _ = std::fs::remove_dir_all(&base);
}

#[test]
fn evaluate_dir_names_csv_runs() {
    let base = temp_dir("csv");
    let generate = GenerateOptions {
        out_dir: base.clone(),
        registry_count: 10,
        order_count: 20,
        seed: Some(8),
        reference_date: Some(reference_date()),
        format: OutputFormat::Csv,
        ..GenerateOptions::default()
    };
    GenerationEngine::new(generate).run().expect("generate");

    let err = evaluate_dir(&base, &EvaluateOptions::default()).expect_err("must fail");
    match err {
        EvalError::InvalidDataset(message) => {
            assert!(message.contains("CSV"), "{message}");
            assert!(message.contains("cadastros.csv"), "{message}");
        }
        other => panic!("unexpected error: {other}"),
    }

    let _ = std::fs::remove_dir_all(&base);
}
