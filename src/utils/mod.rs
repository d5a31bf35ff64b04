//! Shared utilities
//!
//! Arrow column extraction, Parquet file I/O and operation logging.

pub mod arrow;
pub mod io;
pub mod logging;

// Re-export commonly used functions for convenience
pub use io::{DEFAULT_BATCH_SIZE, read_parquet, write_parquet};
pub use logging::{log_operation_complete, log_operation_start, log_warning};
