pub mod csv;
pub mod parquet;
