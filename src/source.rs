//! Usage data sources
//!
//! [`UsageSource`] is the seam between the reports and the store. The
//! production implementation is [`SqliteSource`], which opens a fresh
//! read-only connection for every call and drops it before returning.
//! [`MemorySource`] serves fixed rows for tests and dry runs.

use crate::models::{MonthlyTotal, UsageRecord};
use crate::month_parser::MonthParser;
use anyhow::{Context, Result};
use rusqlite::{Connection, OpenFlags};
use std::path::PathBuf;
use tracing::{debug, error, info};

/// Read-only access to the usage store
pub trait UsageSource {
    /// Every raw usage row, in store order
    fn usage_records(&self) -> Result<Vec<UsageRecord>>;

    /// Every precomputed monthly total, in store order
    fn monthly_totals(&self) -> Result<Vec<MonthlyTotal>>;
}

impl<S: UsageSource + ?Sized> UsageSource for &S {
    fn usage_records(&self) -> Result<Vec<UsageRecord>> {
        (**self).usage_records()
    }

    fn monthly_totals(&self) -> Result<Vec<MonthlyTotal>> {
        (**self).monthly_totals()
    }
}

pub struct SqliteSource {
    db_path: PathBuf,
    usage_table: String,
    totals_table: String,
}

impl SqliteSource {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self::with_tables(db_path, "data", "totals")
    }

    /// Table names are interpolated into the queries and must already be
    /// validated identifiers (see `Config::validate`).
    pub fn with_tables(db_path: impl Into<PathBuf>, usage_table: &str, totals_table: &str) -> Self {
        Self {
            db_path: db_path.into(),
            usage_table: usage_table.to_string(),
            totals_table: totals_table.to_string(),
        }
    }

    fn open(&self) -> Result<Connection> {
        debug!(path = %self.db_path.display(), "Opening SQLite connection (read-only)");
        Connection::open_with_flags(
            &self.db_path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| {
            error!(path = %self.db_path.display(), error = %e, "Failed to open SQLite database");
            e
        })
        .with_context(|| format!("Failed to open usage database: {}", self.db_path.display()))
    }
}

impl UsageSource for SqliteSource {
    fn usage_records(&self) -> Result<Vec<UsageRecord>> {
        let conn = self.open()?;
        let sql = format!(
            "SELECT library, version, file, year, month, requests, bandwidth FROM {}",
            self.usage_table
        );

        let mut stmt = conn
            .prepare(&sql)
            .with_context(|| format!("Failed to query usage table '{}'", self.usage_table))?;

        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, i64>(3)?,
                row.get::<_, i64>(4)?,
                row.get::<_, i64>(5)?,
                row.get::<_, i64>(6)?,
            ))
        })?;

        let mut records = Vec::new();
        for (index, row) in rows.enumerate() {
            let (library, version, file, year, month, requests, bandwidth) =
                row.with_context(|| format!("Malformed usage row #{}", index + 1))?;
            records.push(
                to_usage_record(library, version, file, year, month, requests, bandwidth)
                    .with_context(|| format!("Invalid usage row #{}", index + 1))?,
            );
        }

        info!(
            table = %self.usage_table,
            rows = records.len(),
            "Loaded usage records"
        );
        Ok(records)
    }

    fn monthly_totals(&self) -> Result<Vec<MonthlyTotal>> {
        let conn = self.open()?;
        let sql = format!(
            "SELECT date, total_requests, total_bandwidth FROM {}",
            self.totals_table
        );

        let mut stmt = conn
            .prepare(&sql)
            .with_context(|| format!("Failed to query totals '{}'", self.totals_table))?;

        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, i64>(2)?,
            ))
        })?;

        let mut totals = Vec::new();
        for (index, row) in rows.enumerate() {
            let (date, total_requests, total_bandwidth) =
                row.with_context(|| format!("Malformed totals row #{}", index + 1))?;
            totals.push(MonthlyTotal {
                date,
                total_requests: non_negative("total_requests", total_requests)
                    .with_context(|| format!("Invalid totals row #{}", index + 1))?,
                total_bandwidth: non_negative("total_bandwidth", total_bandwidth)
                    .with_context(|| format!("Invalid totals row #{}", index + 1))?,
            });
        }

        info!(
            table = %self.totals_table,
            rows = totals.len(),
            "Loaded monthly totals"
        );
        Ok(totals)
    }
}

fn to_usage_record(
    library: String,
    version: String,
    file: String,
    year: i64,
    month: i64,
    requests: i64,
    bandwidth: i64,
) -> Result<UsageRecord> {
    let year = i32::try_from(year).with_context(|| format!("Year out of range: {}", year))?;
    let month = u32::try_from(month).with_context(|| format!("Month out of range: {}", month))?;
    MonthParser::validate(year, month)?;

    Ok(UsageRecord {
        library,
        version,
        file,
        year,
        month,
        requests: non_negative("requests", requests)?,
        bandwidth: non_negative("bandwidth", bandwidth)?,
    })
}

fn non_negative(column: &str, value: i64) -> Result<u64> {
    u64::try_from(value).with_context(|| format!("Column '{}' must not be negative, got {}", column, value))
}

/// Fixed in-memory rows
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    pub records: Vec<UsageRecord>,
    pub totals: Vec<MonthlyTotal>,
}

impl MemorySource {
    pub fn new(records: Vec<UsageRecord>, totals: Vec<MonthlyTotal>) -> Self {
        Self { records, totals }
    }
}

impl UsageSource for MemorySource {
    fn usage_records(&self) -> Result<Vec<UsageRecord>> {
        Ok(self.records.clone())
    }

    fn monthly_totals(&self) -> Result<Vec<MonthlyTotal>> {
        Ok(self.totals.clone())
    }
}
