use std::path::PathBuf;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::faker_rs::LocaleKey;

/// Options for the generation engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerateOptions {
    /// Base directory; datasets land in `cadastros/` and `pedidos/` below it.
    pub out_dir: PathBuf,
    /// Number of registry records to generate.
    pub registry_count: u64,
    /// Number of order records to generate.
    pub order_count: u64,
    /// Seed for the run RNG. Drawn from OS entropy when absent.
    pub seed: Option<u64>,
    /// Locale of the fake-data source.
    pub locale: LocaleKey,
    /// Date that anchors age and history windows. Today when absent.
    pub reference_date: Option<NaiveDate>,
    pub format: OutputFormat,
    pub compression: Compression,
    /// Maximum draws to find an unused national id for one record.
    pub max_attempts_national_id: u32,
    /// Write `generation_report.json` next to the datasets.
    pub write_report: bool,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from("./data/"),
            registry_count: 10_000,
            order_count: 5_000,
            seed: None,
            locale: LocaleKey::PtBr,
            reference_date: None,
            format: OutputFormat::Parquet,
            compression: Compression::Snappy,
            max_attempts_national_id: 1_000,
            write_report: false,
        }
    }
}

/// On-disk format of the datasets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Parquet,
    Csv,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Parquet => "parquet",
            Self::Csv => "csv",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "parquet" => Some(Self::Parquet),
            "csv" => Some(Self::Csv),
            _ => None,
        }
    }
}

/// Parquet compression codec
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Compression {
    /// No compression
    None,
    /// Snappy compression (fast, moderate ratio)
    #[default]
    Snappy,
    /// LZ4 compression (very fast, lower ratio)
    Lz4,
    /// Zstd compression (slower, best ratio)
    Zstd,
}

impl Compression {
    pub fn to_parquet(self) -> parquet::basic::Compression {
        match self {
            Self::None => parquet::basic::Compression::UNCOMPRESSED,
            Self::Snappy => parquet::basic::Compression::SNAPPY,
            Self::Lz4 => parquet::basic::Compression::LZ4,
            Self::Zstd => parquet::basic::Compression::ZSTD(Default::default()),
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "none" | "uncompressed" => Some(Self::None),
            "snappy" => Some(Self::Snappy),
            "lz4" => Some(Self::Lz4),
            "zstd" => Some(Self::Zstd),
            _ => None,
        }
    }
}

/// Summary of one written dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetReport {
    pub dataset: String,
    pub path: PathBuf,
    pub format: OutputFormat,
    pub rows_requested: u64,
    pub rows_generated: u64,
    pub bytes_written: u64,
}

/// Report for a generation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationReport {
    pub run_id: String,
    pub seed: u64,
    pub locale: LocaleKey,
    pub reference_date: NaiveDate,
    pub datasets: Vec<DatasetReport>,
    /// National id draws rejected because the value was already issued.
    pub national_id_retries: u64,
    pub bytes_written: u64,
    pub duration_ms: u64,
}

impl GenerationReport {
    pub fn new(run_id: String, seed: u64, locale: LocaleKey, reference_date: NaiveDate) -> Self {
        Self {
            run_id,
            seed,
            locale,
            reference_date,
            datasets: Vec::new(),
            national_id_retries: 0,
            bytes_written: 0,
            duration_ms: 0,
        }
    }

    pub fn record_dataset(&mut self, dataset: DatasetReport) {
        self.bytes_written = self.bytes_written.saturating_add(dataset.bytes_written);
        self.datasets.push(dataset);
    }

    pub fn dataset(&self, name: &str) -> Option<&DatasetReport> {
        self.datasets.iter().find(|dataset| dataset.dataset == name)
    }
}
