//! Arrow data handling utilities
//!
//! Helpers for reading typed columns out of Arrow record batches.

pub mod array_utils;
pub mod extractors;

// Re-export commonly used functions for convenience
pub use array_utils::{downcast_array, get_column};
pub use extractors::{
    extract_boolean, extract_date32, extract_int64, extract_strings, extract_timestamp_millis,
};
