use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use sha2::{Digest, Sha256};

use fixtura_generate::{
    GenerateOptions, GenerationEngine, GenerationError, OutputFormat, Stage, process_data,
    read_orders_parquet, read_registry_parquet,
};

fn hash_file(path: &Path) -> Result<String, std::io::Error> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buffer = [0_u8; 8192];
    loop {
        let read = file.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }
    Ok(hex::encode(hasher.finalize()))
}

fn temp_dir(label: &str) -> PathBuf {
    std::env::temp_dir().join(format!("fixtura_{label}_{}", uuid::Uuid::new_v4()))
}

fn options(out_dir: PathBuf) -> GenerateOptions {
    GenerateOptions {
        out_dir,
        registry_count: 300,
        order_count: 900,
        seed: Some(2024),
        reference_date: NaiveDate::from_ymd_opt(2026, 10, 16),
        ..GenerateOptions::default()
    }
}

#[test]
fn engine_writes_both_datasets_in_layout() {
    let base = temp_dir("layout");
    let mut opts = options(base.clone());
    opts.write_report = true;

    let result = GenerationEngine::new(opts).run().expect("run");
    assert_eq!(result.registry_path, base.join("cadastros").join("cadastros.parquet"));
    assert_eq!(result.orders_path, base.join("pedidos").join("pedidos.parquet"));

    let registry = read_registry_parquet(&result.registry_path).expect("registry");
    let orders = read_orders_parquet(&result.orders_path).expect("orders");
    assert_eq!(registry.len(), 300);
    assert_eq!(orders.len(), 900);

    assert_eq!(result.report.seed, 2024);
    assert_eq!(result.report.datasets.len(), 2);
    let orders_report = result.report.dataset("pedidos").expect("orders report");
    assert_eq!(orders_report.rows_requested, 900);
    assert_eq!(orders_report.rows_generated, 900);
    let registry_report = result.report.dataset("cadastros").expect("registry report");
    assert_eq!(registry_report.rows_requested, 300);

    let report_path = base.join("generation_report.json");
    let raw = std::fs::read_to_string(&report_path).expect("report json");
    let value: serde_json::Value = serde_json::from_str(&raw).expect("parse report");
    assert_eq!(value["seed"], 2024);
    assert_eq!(value["datasets"][0]["dataset"], "cadastros");

    let _ = std::fs::remove_dir_all(&base);
}

#[test]
fn same_seed_writes_identical_files() {
    let first = temp_dir("determinism_a");
    let second = temp_dir("determinism_b");

    let a = GenerationEngine::new(options(first.clone())).run().expect("first run");
    let b = GenerationEngine::new(options(second.clone())).run().expect("second run");

    assert_eq!(
        hash_file(&a.registry_path).expect("hash"),
        hash_file(&b.registry_path).expect("hash")
    );
    assert_eq!(
        hash_file(&a.orders_path).expect("hash"),
        hash_file(&b.orders_path).expect("hash")
    );
    assert!(!first.join("generation_report.json").exists());

    let _ = std::fs::remove_dir_all(&first);
    let _ = std::fs::remove_dir_all(&second);
}

#[test]
fn csv_format_writes_headers_and_rows() {
    let base = temp_dir("csv");
    let mut opts = options(base.clone());
    opts.format = OutputFormat::Csv;
    opts.registry_count = 4;
    opts.order_count = 6;

    let result = GenerationEngine::new(opts).run().expect("run");
    assert_eq!(result.orders_path, base.join("pedidos").join("pedidos.csv"));

    let mut reader = csv::Reader::from_path(&result.orders_path).expect("open csv");
    let headers = reader.headers().expect("headers").clone();
    assert_eq!(headers.get(0), Some("order_id"));
    assert_eq!(headers.len(), 13);
    let rows: Vec<csv::StringRecord> = reader.records().collect::<Result<_, _>>().expect("rows");
    assert_eq!(rows.len(), 6);
    for row in &rows {
        let discount = row.get(4).expect("discount");
        let coupon = row.get(5).expect("coupon");
        assert_eq!(discount == "0.00", coupon.is_empty());
    }

    let registry = std::fs::read_to_string(&result.registry_path).expect("registry csv");
    assert_eq!(registry.lines().count(), 5);

    let _ = std::fs::remove_dir_all(&base);
}

#[test]
fn orders_without_registries_fail_before_writing() {
    let base = temp_dir("empty_registry");
    let mut opts = options(base.clone());
    opts.registry_count = 0;
    opts.order_count = 3;

    let err = GenerationEngine::new(opts).run().expect_err("must fail");
    assert!(matches!(err, GenerationError::EmptyRegistry { .. }));
    assert_eq!(err.stage(), Some(Stage::Orders));
    assert!(!base.join("cadastros").exists());
}

#[test]
fn process_data_uses_default_layout() {
    let base = temp_dir("process");
    process_data(3, 10, &base).expect("process");

    let registry = read_registry_parquet(&base.join("cadastros/cadastros.parquet")).expect("read");
    let orders = read_orders_parquet(&base.join("pedidos/pedidos.parquet")).expect("read");
    assert_eq!(registry.len(), 3);
    assert_eq!(orders.len(), 10);

    let _ = std::fs::remove_dir_all(&base);
}

#[test]
fn output_dir_that_is_a_file_fails_in_write_stage() {
    let blocker = temp_dir("blocker");
    std::fs::write(&blocker, b"not a directory").expect("create file");

    let err = GenerationEngine::new(options(blocker.clone()))
        .run()
        .expect_err("must fail");
    assert!(matches!(err, GenerationError::CreateDir { .. }), "{err}");
    assert_eq!(err.stage(), Some(Stage::Write));

    let _ = std::fs::remove_file(&blocker);
}
