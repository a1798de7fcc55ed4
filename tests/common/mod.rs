#![allow(dead_code)]

use anyhow::Result;
use cdn_usage_charts::chart::{ChartSpec, SeriesRenderer};
use cdn_usage_charts::models::{MonthlyTotal, UsageRecord};
use rusqlite::Connection;
use std::cell::RefCell;
use std::path::{Path, PathBuf};

pub fn usage(library: &str, year: i32, month: u32, requests: u64) -> UsageRecord {
    UsageRecord {
        library: library.to_string(),
        version: "1.0.0".to_string(),
        file: format!("{}.min.js", library),
        year,
        month,
        requests,
        bandwidth: requests * 2,
    }
}

pub fn total(date: &str, requests: u64, bandwidth: u64) -> MonthlyTotal {
    MonthlyTotal {
        date: date.to_string(),
        total_requests: requests,
        total_bandwidth: bandwidth,
    }
}

/// Create a usage database shaped like the production store: a raw `data`
/// table and a `totals` view aggregating it per month.
pub fn create_test_db(dir: &Path, records: &[UsageRecord]) -> Result<PathBuf> {
    let path = dir.join("data.db");
    let conn = Connection::open(&path)?;
    conn.execute_batch(
        r#"
        CREATE TABLE data (
            year INTEGER NOT NULL,
            month INTEGER NOT NULL,
            library TEXT NOT NULL,
            version TEXT NOT NULL,
            file TEXT NOT NULL,
            requests INTEGER NOT NULL,
            bandwidth INTEGER NOT NULL
        );
        CREATE VIEW totals AS
            SELECT printf('%04d-%02d', year, month) AS date,
                   SUM(requests) AS total_requests,
                   SUM(bandwidth) AS total_bandwidth
            FROM data
            GROUP BY year, month
            ORDER BY year DESC, month DESC;
        "#,
    )?;

    for r in records {
        conn.execute(
            "INSERT INTO data (year, month, library, version, file, requests, bandwidth) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            rusqlite::params![r.year, r.month, r.library, r.version, r.file, r.requests as i64, r.bandwidth as i64],
        )?;
    }

    Ok(path)
}

/// Renderer that records what it was asked to draw instead of drawing it
#[derive(Default)]
pub struct RecordingRenderer {
    pub charts: RefCell<Vec<(ChartSpec, PathBuf)>>,
}

impl SeriesRenderer for RecordingRenderer {
    fn render(&self, chart: &ChartSpec, output: &Path) -> Result<()> {
        self.charts
            .borrow_mut()
            .push((chart.clone(), output.to_path_buf()));
        Ok(())
    }
}

pub struct FailingRenderer;

impl SeriesRenderer for FailingRenderer {
    fn render(&self, _chart: &ChartSpec, _output: &Path) -> Result<()> {
        anyhow::bail!("no display surface")
    }
}
