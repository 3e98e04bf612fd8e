use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;

use fixtura_generate::{Compression, GenerateOptions, LocaleKey, OutputFormat};

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("toml decode error: {0}")]
    TomlDecode(#[from] toml::de::Error),
}

/// Contents of a `--config` TOML file.
///
/// ```toml
/// [generate]
/// registries = 2000
/// seed = 7
/// reference_date = "2026-10-16"
///
/// [logging]
/// file = "fixtura.log"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileSettings {
    pub generate: GenerateOverrides,
    pub logging: LoggingSettings,
}

/// Partial generation options. Unset fields keep the lower layer's value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GenerateOverrides {
    pub registries: Option<u64>,
    pub orders: Option<u64>,
    pub out: Option<PathBuf>,
    pub seed: Option<u64>,
    pub locale: Option<LocaleKey>,
    pub format: Option<OutputFormat>,
    pub compression: Option<Compression>,
    pub reference_date: Option<NaiveDate>,
    pub max_attempts_national_id: Option<u32>,
    pub report: Option<bool>,
}

impl GenerateOverrides {
    pub fn apply(&self, options: &mut GenerateOptions) {
        if let Some(value) = self.registries {
            options.registry_count = value;
        }
        if let Some(value) = self.orders {
            options.order_count = value;
        }
        if let Some(value) = &self.out {
            options.out_dir = value.clone();
        }
        if let Some(value) = self.seed {
            options.seed = Some(value);
        }
        if let Some(value) = self.locale {
            options.locale = value;
        }
        if let Some(value) = self.format {
            options.format = value;
        }
        if let Some(value) = self.compression {
            options.compression = value;
        }
        if let Some(value) = self.reference_date {
            options.reference_date = Some(value);
        }
        if let Some(value) = self.max_attempts_national_id {
            options.max_attempts_national_id = value;
        }
        if let Some(value) = self.report {
            options.write_report = value;
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingSettings {
    pub file: Option<PathBuf>,
    pub json: Option<bool>,
}

pub fn load_settings(path: &Path) -> Result<FileSettings, SettingsError> {
    let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
        path: path.display().to_string(),
        source,
    })?;
    Ok(toml::from_str(&content)?)
}

/// Defaults, then the file section, then command-line flags.
pub fn resolve_generate_options(
    file: Option<&FileSettings>,
    flags: &GenerateOverrides,
) -> GenerateOptions {
    let mut options = GenerateOptions::default();
    if let Some(file) = file {
        file.generate.apply(&mut options);
    }
    flags.apply(&mut options);
    options
}

pub fn parse_locale(value: &str) -> Result<LocaleKey, String> {
    LocaleKey::parse(value).ok_or_else(|| format!("unknown locale '{value}' (pt_BR, en_US)"))
}

pub fn parse_format(value: &str) -> Result<OutputFormat, String> {
    OutputFormat::parse(value).ok_or_else(|| format!("unknown format '{value}' (parquet, csv)"))
}

pub fn parse_compression(value: &str) -> Result<Compression, String> {
    Compression::parse(value)
        .ok_or_else(|| format!("unknown compression '{value}' (none, snappy, lz4, zstd)"))
}
