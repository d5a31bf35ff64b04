//! File I/O utilities

pub mod parquet;

pub use self::parquet::{DEFAULT_BATCH_SIZE, read_parquet, write_parquet};
