//! Parquet-backed registry
//!
//! Reads `puroks.parquet`, `households.parquet` and `residents.parquet` from
//! a directory. Files are re-read on every query so each call sees the
//! registry as it is on disk at that instant.
//!
//! Expected columns:
//!
//! | file                 | columns                                                                 |
//! |----------------------|-------------------------------------------------------------------------|
//! | `puroks.parquet`     | `id` Int64, `name` Utf8, `code` Utf8                                    |
//! | `households.parquet` | `id` Int64, `purok_id` Int64, `created_at` Timestamp(ms)                |
//! | `residents.parquet`  | `id` Int64, `household_id` Int64, `birthdate` Date32, `sex` Utf8,       |
//! |                      | `is_pwd` Boolean, `occupation_status` Utf8, `created_at` Timestamp(ms)  |

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use arrow::array::{
    ArrayRef, BooleanArray, Date32Array, Int64Array, StringArray, TimestampMillisecondArray,
};
use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use arrow::record_batch::RecordBatch;
use chrono::{NaiveDate, NaiveDateTime};
use itertools::izip;

use crate::error::{AnalyticsError, Result};
use crate::models::types::PurokId;
use crate::models::{Household, OccupationStatus, Purok, Resident, Sex};
use crate::registry::{InMemoryRegistry, RegistryStore, ResidentQuery};
use crate::utils::arrow::{
    extract_boolean, extract_date32, extract_int64, extract_strings, extract_timestamp_millis,
};
use crate::utils::io::{read_parquet, write_parquet};
use crate::utils::logging::log_warning;

/// File holding purok records
pub const PUROKS_FILE: &str = "puroks.parquet";
/// File holding household records
pub const HOUSEHOLDS_FILE: &str = "households.parquet";
/// File holding resident records
pub const RESIDENTS_FILE: &str = "residents.parquet";

/// A registry stored as Parquet files in one directory
#[derive(Debug, Clone)]
pub struct ParquetRegistry {
    dir: PathBuf,
}

impl ParquetRegistry {
    /// Open a registry directory
    ///
    /// # Errors
    /// Returns `RegistryUnavailable` if `dir` is not an existing directory.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        if !dir.is_dir() {
            return Err(AnalyticsError::registry_unavailable(format!(
                "Registry directory does not exist: {}",
                dir.display()
            )));
        }
        Ok(Self { dir })
    }

    /// Read all three files into an in-memory snapshot
    ///
    /// # Errors
    /// Returns `RegistryUnavailable` if any file cannot be read.
    pub fn load_snapshot(&self) -> Result<InMemoryRegistry> {
        Ok(InMemoryRegistry::from_records(
            self.read_puroks()?,
            self.read_households()?,
            self.read_residents()?,
        ))
    }

    fn read_puroks(&self) -> Result<Vec<Purok>> {
        let path = self.dir.join(PUROKS_FILE);
        let mut puroks = Vec::new();
        let mut skipped = 0usize;

        for batch in read_parquet(&path)? {
            let ids = extract_int64(&batch, "id", true)?;
            let names = extract_strings(&batch, "name", false)?;
            let codes = extract_strings(&batch, "code", false)?;

            for (id, name, code) in izip!(ids, names, codes) {
                match id {
                    Some(id) => puroks.push(Purok::new(
                        id,
                        name.unwrap_or_default(),
                        code.unwrap_or_default(),
                    )),
                    None => skipped += 1,
                }
            }
        }

        warn_skipped(skipped, &path);
        Ok(puroks)
    }

    fn read_households(&self) -> Result<Vec<Household>> {
        let path = self.dir.join(HOUSEHOLDS_FILE);
        let mut households = Vec::new();
        let mut skipped = 0usize;

        for batch in read_parquet(&path)? {
            let ids = extract_int64(&batch, "id", true)?;
            let puroks = extract_int64(&batch, "purok_id", true)?;
            let created = extract_timestamp_millis(&batch, "created_at", true)?;

            for (id, purok_id, created_at) in izip!(ids, puroks, created) {
                match (id, purok_id, created_at) {
                    (Some(id), Some(purok_id), Some(created_at)) => {
                        households.push(Household::new(id, purok_id, created_at));
                    }
                    _ => skipped += 1,
                }
            }
        }

        warn_skipped(skipped, &path);
        Ok(households)
    }

    fn read_residents(&self) -> Result<Vec<Resident>> {
        let path = self.dir.join(RESIDENTS_FILE);
        let mut residents = Vec::new();
        let mut skipped = 0usize;

        for batch in read_parquet(&path)? {
            let ids = extract_int64(&batch, "id", true)?;
            let households = extract_int64(&batch, "household_id", true)?;
            let birthdates = extract_date32(&batch, "birthdate", true)?;
            let sexes = extract_strings(&batch, "sex", false)?;
            let pwd = extract_boolean(&batch, "is_pwd", false)?;
            let occupations = extract_strings(&batch, "occupation_status", false)?;
            let created = extract_timestamp_millis(&batch, "created_at", true)?;

            for (id, household_id, birthdate, sex, is_pwd, occupation, created_at) in
                izip!(ids, households, birthdates, sexes, pwd, occupations, created)
            {
                let (Some(id), Some(household_id), Some(birthdate), Some(created_at)) =
                    (id, household_id, birthdate, created_at)
                else {
                    skipped += 1;
                    continue;
                };

                residents.push(
                    Resident::new(id, household_id, birthdate, created_at)
                        .with_sex(sex.as_deref().map_or(Sex::Unknown, Sex::from))
                        .with_pwd(is_pwd.unwrap_or(false))
                        .with_occupation(
                            occupation
                                .as_deref()
                                .map_or(OccupationStatus::Unknown, OccupationStatus::from),
                        ),
                );
            }
        }

        warn_skipped(skipped, &path);
        Ok(residents)
    }
}

fn warn_skipped(skipped: usize, path: &Path) {
    if skipped > 0 {
        log_warning(
            &format!("Skipped {skipped} rows with missing required values"),
            Some(&path.display()),
        );
    }
}

impl RegistryStore for ParquetRegistry {
    fn puroks(&self) -> Result<Vec<Purok>> {
        self.read_puroks()
    }

    fn households(&self, purok: Option<PurokId>) -> Result<Vec<Household>> {
        let mut households = self.read_households()?;
        if let Some(purok) = purok {
            households.retain(|h| h.purok_id == purok);
        }
        Ok(households)
    }

    fn residents(&self, query: &ResidentQuery) -> Result<Vec<Resident>> {
        let mut residents = self.read_residents()?;
        residents.retain(|r| query.matches(r));
        Ok(residents)
    }
}

fn days_since_epoch(date: NaiveDate) -> i32 {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or(NaiveDate::MIN);
    i32::try_from((date - epoch).num_days()).unwrap_or(i32::MAX)
}

fn millis_since_epoch(instant: NaiveDateTime) -> i64 {
    instant.and_utc().timestamp_millis()
}

fn timestamp_field(name: &str) -> Field {
    Field::new(name, DataType::Timestamp(TimeUnit::Millisecond, None), false)
}

/// Write an in-memory registry to `dir` in the layout `ParquetRegistry` reads
///
/// # Errors
/// Returns an error if the directory or any file cannot be written.
pub fn write_registry(dir: &Path, registry: &InMemoryRegistry) -> anyhow::Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create registry directory {}", dir.display()))?;

    let puroks = registry.all_puroks();
    let schema = Schema::new(vec![
        Field::new("id", DataType::Int64, false),
        Field::new("name", DataType::Utf8, false),
        Field::new("code", DataType::Utf8, false),
    ]);
    let columns: Vec<ArrayRef> = vec![
        Arc::new(Int64Array::from_iter_values(puroks.iter().map(|p| p.id))),
        Arc::new(StringArray::from_iter_values(puroks.iter().map(|p| p.name.as_str()))),
        Arc::new(StringArray::from_iter_values(puroks.iter().map(|p| p.code.as_str()))),
    ];
    write_parquet(
        &dir.join(PUROKS_FILE),
        &RecordBatch::try_new(Arc::new(schema), columns)?,
    )?;

    let households = registry.all_households();
    let schema = Schema::new(vec![
        Field::new("id", DataType::Int64, false),
        Field::new("purok_id", DataType::Int64, false),
        timestamp_field("created_at"),
    ]);
    let columns: Vec<ArrayRef> = vec![
        Arc::new(Int64Array::from_iter_values(households.iter().map(|h| h.id))),
        Arc::new(Int64Array::from_iter_values(households.iter().map(|h| h.purok_id))),
        Arc::new(TimestampMillisecondArray::from_iter_values(
            households.iter().map(|h| millis_since_epoch(h.created_at)),
        )),
    ];
    write_parquet(
        &dir.join(HOUSEHOLDS_FILE),
        &RecordBatch::try_new(Arc::new(schema), columns)?,
    )?;

    let residents = registry.all_residents();
    let schema = Schema::new(vec![
        Field::new("id", DataType::Int64, false),
        Field::new("household_id", DataType::Int64, false),
        Field::new("birthdate", DataType::Date32, false),
        Field::new("sex", DataType::Utf8, false),
        Field::new("is_pwd", DataType::Boolean, false),
        Field::new("occupation_status", DataType::Utf8, false),
        timestamp_field("created_at"),
    ]);
    let columns: Vec<ArrayRef> = vec![
        Arc::new(Int64Array::from_iter_values(residents.iter().map(|r| r.id))),
        Arc::new(Int64Array::from_iter_values(residents.iter().map(|r| r.household_id))),
        Arc::new(Date32Array::from_iter_values(
            residents.iter().map(|r| days_since_epoch(r.birthdate)),
        )),
        Arc::new(StringArray::from_iter_values(residents.iter().map(|r| r.sex.as_str()))),
        Arc::new(BooleanArray::from(
            residents.iter().map(|r| r.is_pwd).collect::<Vec<_>>(),
        )),
        Arc::new(StringArray::from_iter_values(
            residents.iter().map(|r| r.occupation_status.as_str()),
        )),
        Arc::new(TimestampMillisecondArray::from_iter_values(
            residents.iter().map(|r| millis_since_epoch(r.created_at)),
        )),
    ];
    write_parquet(
        &dir.join(RESIDENTS_FILE),
        &RecordBatch::try_new(Arc::new(schema), columns)?,
    )?;

    Ok(())
}
