//! Parquet file operations
//!
//! Reading whole Parquet files into Arrow record batches and writing record
//! batches back out.

use std::fs::File;
use std::path::Path;
use std::time::Instant;

use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use crate::error::{AnalyticsError, Result};
use crate::utils::logging::{log_operation_complete, log_operation_start};

/// Default batch size for Parquet reading
pub const DEFAULT_BATCH_SIZE: usize = 16384;

/// Helper function to get batch size from environment
#[must_use]
pub fn get_batch_size() -> Option<usize> {
    std::env::var("PARQUET_BATCH_SIZE")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
}

/// Read a parquet file into Arrow record batches
///
/// # Arguments
/// * `path` - Path to the Parquet file
///
/// # Errors
/// Returns `RegistryUnavailable` if the file cannot be opened or is not valid
/// Parquet.
pub fn read_parquet(path: &Path) -> Result<Vec<RecordBatch>> {
    let start = Instant::now();
    log_operation_start("Reading parquet file", path.display());

    let file = File::open(path).map_err(|e| {
        AnalyticsError::registry_unavailable_with_source(
            format!("Failed to open file {}", path.display()),
            e,
        )
    })?;

    let reader = ParquetRecordBatchReaderBuilder::try_new(file)
        .and_then(|builder| {
            builder
                .with_batch_size(get_batch_size().unwrap_or(DEFAULT_BATCH_SIZE))
                .build()
        })
        .map_err(|e| {
            AnalyticsError::registry_unavailable_with_source(
                format!("Failed to read parquet file {}", path.display()),
                e,
            )
        })?;

    let batches = reader
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| {
            AnalyticsError::registry_unavailable_with_source(
                format!("Failed to read record batch from {}", path.display()),
                e,
            )
        })?;

    log_operation_complete("read", path.display(), batches.len(), Some(start.elapsed()));
    Ok(batches)
}

/// Write a record batch to a parquet file, replacing any existing file
///
/// # Errors
/// Returns an error if the file cannot be created or written.
pub fn write_parquet(path: &Path, batch: &RecordBatch) -> anyhow::Result<()> {
    use anyhow::Context;

    let file = File::create(path)
        .with_context(|| format!("Failed to create parquet file {}", path.display()))?;
    let mut writer = ArrowWriter::try_new(file, batch.schema(), None)
        .with_context(|| format!("Failed to start parquet writer for {}", path.display()))?;
    writer
        .write(batch)
        .with_context(|| format!("Failed to write record batch to {}", path.display()))?;
    writer
        .close()
        .with_context(|| format!("Failed to finish parquet file {}", path.display()))?;

    log_operation_complete("wrote", path.display(), batch.num_rows(), None);
    Ok(())
}
