//! Column extraction utilities for Arrow record batches
//!
//! Each extractor reads one whole column into a `Vec<Option<T>>`, one entry
//! per row, with nulls (and missing optional columns) as `None`.

use arrow::array::{Array, BooleanArray, Date32Array, Int64Array, StringArray, TimestampMillisecondArray};
use arrow::datatypes::{DataType, TimeUnit};
use arrow::record_batch::RecordBatch;
use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::error::Result;
use crate::utils::arrow::array_utils::{downcast_array, get_column};

/// Apply `value` to every non-null row of a downcast column
fn collect_column<A, T>(array: &A, value: impl Fn(&A, usize) -> Option<T>) -> Vec<Option<T>>
where
    A: Array,
{
    (0..array.len())
        .map(|row| {
            if array.is_null(row) {
                None
            } else {
                value(array, row)
            }
        })
        .collect()
}

/// Extract a string column
///
/// Empty strings are treated as missing.
pub fn extract_strings(
    batch: &RecordBatch,
    column_name: &str,
    required: bool,
) -> Result<Vec<Option<String>>> {
    let Some(array) = get_column(batch, column_name, &DataType::Utf8, required)? else {
        return Ok(vec![None; batch.num_rows()]);
    };
    let strings = downcast_array::<StringArray>(&array, column_name, "String")?;

    Ok(collect_column(strings, |a, row| {
        let value = a.value(row);
        (!value.is_empty()).then(|| value.to_string())
    }))
}

/// Extract an integer column as `i64`
///
/// Narrower integer columns are widened.
pub fn extract_int64(batch: &RecordBatch, column_name: &str, required: bool) -> Result<Vec<Option<i64>>> {
    let Some(array) = get_column(batch, column_name, &DataType::Int64, required)? else {
        return Ok(vec![None; batch.num_rows()]);
    };
    let ints = downcast_array::<Int64Array>(&array, column_name, "Int64")?;

    Ok(collect_column(ints, |a, row| Some(a.value(row))))
}

/// Extract a boolean column
pub fn extract_boolean(
    batch: &RecordBatch,
    column_name: &str,
    required: bool,
) -> Result<Vec<Option<bool>>> {
    let Some(array) = get_column(batch, column_name, &DataType::Boolean, required)? else {
        return Ok(vec![None; batch.num_rows()]);
    };
    let bools = downcast_array::<BooleanArray>(&array, column_name, "Boolean")?;

    Ok(collect_column(bools, |a, row| Some(a.value(row))))
}

/// Extract a date column (Date32, days since the Unix epoch)
pub fn extract_date32(
    batch: &RecordBatch,
    column_name: &str,
    required: bool,
) -> Result<Vec<Option<NaiveDate>>> {
    let Some(array) = get_column(batch, column_name, &DataType::Date32, required)? else {
        return Ok(vec![None; batch.num_rows()]);
    };
    let dates = downcast_array::<Date32Array>(&array, column_name, "Date32")?;

    Ok(collect_column(dates, |a, row| {
        DateTime::from_timestamp(i64::from(a.value(row)) * 86_400, 0).map(|dt| dt.date_naive())
    }))
}

/// Extract a timestamp column (milliseconds since the Unix epoch, no time zone)
pub fn extract_timestamp_millis(
    batch: &RecordBatch,
    column_name: &str,
    required: bool,
) -> Result<Vec<Option<NaiveDateTime>>> {
    let expected = DataType::Timestamp(TimeUnit::Millisecond, None);
    let Some(array) = get_column(batch, column_name, &expected, required)? else {
        return Ok(vec![None; batch.num_rows()]);
    };
    let stamps = downcast_array::<TimestampMillisecondArray>(&array, column_name, "Timestamp")?;

    Ok(collect_column(stamps, |a, row| {
        DateTime::from_timestamp_millis(a.value(row)).map(|dt| dt.naive_utc())
    }))
}
