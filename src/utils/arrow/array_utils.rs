//! Utilities for working with Arrow arrays.
//!
//! Column lookup with numeric widening and typed downcasts. Failures are
//! reported as `RegistryUnavailable`, since a registry file whose columns
//! cannot be read is a registry that cannot be queried.

use arrow::array::{Array, ArrayRef};
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use log::{debug, warn};

use crate::error::{AnalyticsError, Result};

/// Get a column from a record batch, cast to the expected type if needed
///
/// # Arguments
///
/// * `batch` - The record batch containing the column
/// * `column_name` - The name of the column to extract
/// * `expected_type` - The expected data type for the column
/// * `required` - Whether the column is required (error if missing) or optional (None if missing)
///
/// # Returns
///
/// * `Ok(Some(ArrayRef))` - The column array (converted if necessary) if found
/// * `Ok(None)` - If the column is not found and `required` is false
/// * `Err` - If the column is required but missing, or cannot be cast
pub fn get_column(
    batch: &RecordBatch,
    column_name: &str,
    expected_type: &DataType,
    required: bool,
) -> Result<Option<ArrayRef>> {
    let Ok(idx) = batch.schema().index_of(column_name) else {
        if required {
            return Err(AnalyticsError::registry_unavailable(format!(
                "Column '{column_name}' not found"
            )));
        }
        warn!("Column '{column_name}' not found in record batch");
        return Ok(None);
    };

    let column = batch.column(idx);
    let actual_type = column.data_type();

    // If types already match, return the column as is
    if actual_type == expected_type {
        return Ok(Some(column.clone()));
    }

    debug!("Casting column '{column_name}' from {actual_type:?} to {expected_type:?}");
    arrow::compute::kernels::cast::cast(column, expected_type)
        .map(Some)
        .map_err(|e| {
            AnalyticsError::registry_unavailable_with_source(
                format!("Column '{column_name}' cannot be read as {expected_type:?}"),
                e,
            )
        })
}

/// Downcast a column to a specific array type with clear error messages
///
/// # Type Parameters
///
/// * `A` - The target array type to downcast to
///
/// # Arguments
///
/// * `array` - The array reference to downcast
/// * `column_name` - The name of the column (for error messages)
/// * `expected_type_name` - A human-readable name of the expected type (for error messages)
pub fn downcast_array<'a, A: Array + 'static>(
    array: &'a ArrayRef,
    column_name: &str,
    expected_type_name: &str,
) -> Result<&'a A> {
    array.as_any().downcast_ref::<A>().ok_or_else(|| {
        AnalyticsError::registry_unavailable(format!(
            "Column '{column_name}' is not a {expected_type_name} array"
        ))
    })
}
