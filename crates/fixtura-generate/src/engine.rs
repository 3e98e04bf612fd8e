use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::NaiveDate;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{info, warn};

use fixtura_core::{ORDERS_DATASET, OrderRecord, REGISTRY_DATASET, RegistryRecord};

use crate::errors::GenerationError;
use crate::faker_rs::{FakerSource, FieldSource};
use crate::generators::{GeneratorContext, generate_orders, generate_registry};
use crate::model::{Compression, DatasetReport, GenerateOptions, GenerationReport, OutputFormat};
use crate::output::csv::{write_orders_csv, write_registry_csv};
use crate::output::parquet::{write_orders_parquet, write_registry_parquet};

pub const REPORT_FILE: &str = "generation_report.json";

/// Result of a generation run.
#[derive(Debug, Clone)]
pub struct GenerationResult {
    pub registry_path: PathBuf,
    pub orders_path: PathBuf,
    pub report: GenerationReport,
}

/// Entry point for generating the registry and order datasets.
#[derive(Debug, Clone)]
pub struct GenerationEngine {
    options: GenerateOptions,
}

impl GenerationEngine {
    pub fn new(options: GenerateOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &GenerateOptions {
        &self.options
    }

    /// Run the full pipeline with the faker source of the configured locale.
    pub fn run(&self) -> Result<GenerationResult, GenerationError> {
        let source = FakerSource::new(self.options.locale);
        self.run_with_source(&source)
    }

    /// Run the full pipeline against an injected field source.
    pub fn run_with_source(
        &self,
        source: &dyn FieldSource,
    ) -> Result<GenerationResult, GenerationError> {
        let start = Instant::now();
        let run_id = uuid::Uuid::new_v4().to_string();
        let seed = self
            .options
            .seed
            .unwrap_or_else(|| rand::rng().random::<u64>());
        let reference_date = self
            .options
            .reference_date
            .unwrap_or_else(|| chrono::Utc::now().date_naive());

        let mut report =
            GenerationReport::new(run_id.clone(), seed, source.locale(), reference_date);

        info!(
            run_id = %run_id,
            seed,
            locale = %source.locale(),
            registries = self.options.registry_count,
            orders = self.options.order_count,
            reference_date = %reference_date,
            out_dir = %self.options.out_dir.display(),
            "generation started"
        );

        match self.execute(source, seed, reference_date, &mut report) {
            Ok((registry_path, orders_path)) => {
                report.duration_ms = start.elapsed().as_millis() as u64;
                if self.options.write_report {
                    let report_path = self.options.out_dir.join(REPORT_FILE);
                    std::fs::write(&report_path, serde_json::to_vec_pretty(&report)?)?;
                }
                info!(
                    run_id = %run_id,
                    duration_ms = report.duration_ms,
                    bytes_written = report.bytes_written,
                    national_id_retries = report.national_id_retries,
                    "generation completed"
                );
                Ok(GenerationResult {
                    registry_path,
                    orders_path,
                    report,
                })
            }
            Err(err) => {
                warn!(
                    run_id = %run_id,
                    stage = err.stage().map(|stage| stage.as_str()).unwrap_or("setup"),
                    error = %err,
                    "generation failed"
                );
                Err(err)
            }
        }
    }

    fn execute(
        &self,
        source: &dyn FieldSource,
        seed: u64,
        reference_date: NaiveDate,
        report: &mut GenerationReport,
    ) -> Result<(PathBuf, PathBuf), GenerationError> {
        if self.options.max_attempts_national_id == 0 {
            return Err(GenerationError::InvalidConfig(
                "max_attempts_national_id must be at least 1".to_string(),
            ));
        }

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut ctx = GeneratorContext::new(source, reference_date);
        ctx.max_attempts_national_id = self.options.max_attempts_national_id;

        let stage_start = Instant::now();
        let registry = generate_registry(self.options.registry_count, &ctx, &mut rng)?;
        report.national_id_retries = registry.national_id_retries;
        info!(
            rows = registry.records.len(),
            national_id_retries = registry.national_id_retries,
            duration_ms = stage_start.elapsed().as_millis() as u64,
            "registry generated"
        );

        let stage_start = Instant::now();
        let orders = generate_orders(&registry.records, self.options.order_count, &ctx, &mut rng)?;
        info!(
            rows = orders.len(),
            duration_ms = stage_start.elapsed().as_millis() as u64,
            "orders generated"
        );

        let [mut registry_report, mut orders_report] = write_datasets(
            &self.options.out_dir,
            &registry.records,
            &orders,
            self.options.format,
            self.options.compression,
        )?;
        registry_report.rows_requested = self.options.registry_count;
        orders_report.rows_requested = self.options.order_count;
        let registry_path = registry_report.path.clone();
        let orders_path = orders_report.path.clone();
        report.record_dataset(registry_report);
        report.record_dataset(orders_report);

        Ok((registry_path, orders_path))
    }
}

/// Generate `registry_count` registry records and `order_count` orders with
/// default options and write them below `base_path`.
pub fn process_data(
    registry_count: u64,
    order_count: u64,
    base_path: impl AsRef<Path>,
) -> Result<(), GenerationError> {
    let options = GenerateOptions {
        out_dir: base_path.as_ref().to_path_buf(),
        registry_count,
        order_count,
        ..GenerateOptions::default()
    };
    GenerationEngine::new(options).run()?;
    Ok(())
}

/// `{base}/{dataset}/{dataset}.{ext}`
pub fn dataset_path(base: &Path, dataset: &str, format: OutputFormat) -> PathBuf {
    base.join(dataset)
        .join(format!("{dataset}.{}", format.extension()))
}

/// Write both record sets below `base`, one file per dataset.
pub fn write_datasets(
    base: &Path,
    registry: &[RegistryRecord],
    orders: &[OrderRecord],
    format: OutputFormat,
    compression: Compression,
) -> Result<[DatasetReport; 2], GenerationError> {
    let registry_path = dataset_path(base, REGISTRY_DATASET, format);
    let orders_path = dataset_path(base, ORDERS_DATASET, format);
    ensure_parent(&registry_path)?;
    ensure_parent(&orders_path)?;

    let registry_bytes = match format {
        OutputFormat::Parquet => write_registry_parquet(&registry_path, registry, compression)?,
        OutputFormat::Csv => write_registry_csv(&registry_path, registry)?,
    };
    info!(
        dataset = REGISTRY_DATASET,
        path = %registry_path.display(),
        rows = registry.len(),
        bytes = registry_bytes,
        "dataset written"
    );

    let orders_bytes = match format {
        OutputFormat::Parquet => write_orders_parquet(&orders_path, orders, compression)?,
        OutputFormat::Csv => write_orders_csv(&orders_path, orders)?,
    };
    info!(
        dataset = ORDERS_DATASET,
        path = %orders_path.display(),
        rows = orders.len(),
        bytes = orders_bytes,
        "dataset written"
    );

    Ok([
        DatasetReport {
            dataset: REGISTRY_DATASET.to_string(),
            path: registry_path,
            format,
            rows_requested: registry.len() as u64,
            rows_generated: registry.len() as u64,
            bytes_written: registry_bytes,
        },
        DatasetReport {
            dataset: ORDERS_DATASET.to_string(),
            path: orders_path,
            format,
            rows_requested: orders.len() as u64,
            rows_generated: orders.len() as u64,
            bytes_written: orders_bytes,
        },
    ])
}

fn ensure_parent(path: &Path) -> Result<(), GenerationError> {
    let Some(dir) = path.parent() else {
        return Ok(());
    };
    std::fs::create_dir_all(dir).map_err(|source| GenerationError::CreateDir {
        path: dir.display().to_string(),
        source,
    })
}
