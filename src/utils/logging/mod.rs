//! Logging utilities
//!
//! Consistent operation logging on top of the `log` facade. The binary
//! installs `env_logger`; library code only emits records.

pub mod log;

// Re-export commonly used functions for convenience
pub use log::{log_operation_complete, log_operation_start, log_warning};
