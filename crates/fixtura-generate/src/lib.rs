//! Synthetic registry and order dataset generation for fixtura.
//!
//! Registry records are generated first with unique national ids; orders
//! reference them by national id and carry a copy of the customer's delivery
//! address. Both sets are written as Parquet (or CSV) below a base directory.

pub mod engine;
pub mod errors;
pub mod faker_rs;
pub mod foreign;
pub mod generators;
pub mod model;
pub mod output;

pub use engine::{GenerationEngine, GenerationResult, dataset_path, process_data, write_datasets};
pub use errors::{GenerationError, SourceError, Stage};
pub use faker_rs::{FakeField, FakerSource, FieldSource, LocaleKey};
pub use model::{Compression, DatasetReport, GenerateOptions, GenerationReport, OutputFormat};
pub use output::parquet::{read_orders_parquet, read_registry_parquet};
