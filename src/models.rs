//! Core Data Models
//!
//! Typed rows read from the usage store and the plot-ready shapes derived
//! from them.
//!
//! ## Data Flow
//!
//! 1. **Raw Data**: [`UsageRecord`] and [`MonthlyTotal`] - rows as read from the store
//! 2. **Ranking**: [`RankedEntry`] - a record placed within its month's top-K
//! 3. **Series**: [`ResourceSeries`] and [`TotalsSeries`] - what the chart renderer consumes
//!
//! All of these live only for the duration of one report run.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One row of raw monthly usage for a single CDN resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageRecord {
    pub library: String,
    pub version: String,
    pub file: String,
    pub year: i32,
    pub month: u32,
    pub requests: u64,
    pub bandwidth: u64,
}

impl UsageRecord {
    pub fn month_key(&self) -> MonthKey {
        MonthKey::new(self.year, self.month)
    }

    pub fn resource(&self) -> ResourceId {
        ResourceId {
            library: self.library.clone(),
            version: self.version.clone(),
            file: self.file.clone(),
        }
    }
}

/// Canonical `YYYY-MM` month identifier.
///
/// Year is padded to four digits and month to two, so the derived `Ord`
/// (plain string order) is also chronological order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MonthKey(String);

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Self {
        Self(format!("{:04}-{:02}", year, month))
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self(date.format("%Y-%m").to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identity of a CDN resource: the (library, version, file) triple.
///
/// Field order matters: the derived `Ord` compares library, then version,
/// then file, which is the ranking tie-break order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ResourceId {
    pub library: String,
    pub version: String,
    pub file: String,
}

impl ResourceId {
    pub fn new(library: &str, version: &str, file: &str) -> Self {
        Self {
            library: library.to_string(),
            version: version.to_string(),
            file: file.to_string(),
        }
    }

    /// Legend label, `library/version/file`
    pub fn label(&self) -> String {
        format!("{}/{}/{}", self.library, self.version, self.file)
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.library, self.version, self.file)
    }
}

/// A usage record placed within its month's top-K.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedEntry {
    pub position: usize,
    pub month: MonthKey,
    pub requests: u64,
    pub bandwidth: u64,
    pub library: String,
    pub version: String,
    pub file: String,
}

impl RankedEntry {
    pub fn from_record(position: usize, record: &UsageRecord) -> Self {
        Self {
            position,
            month: record.month_key(),
            requests: record.requests,
            bandwidth: record.bandwidth,
            library: record.library.clone(),
            version: record.version.clone(),
            file: record.file.clone(),
        }
    }

    pub fn resource(&self) -> ResourceId {
        ResourceId::new(&self.library, &self.version, &self.file)
    }
}

/// One month of a tracked resource's series. `entry` is `None` when the
/// resource fell outside that month's top-K.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub month: MonthKey,
    pub entry: Option<RankedEntry>,
}

impl SeriesPoint {
    pub fn position(&self) -> Option<usize> {
        self.entry.as_ref().map(|e| e.position)
    }
}

/// Rank-or-absent history of one tracked resource, ordered by month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceSeries {
    pub resource: ResourceId,
    pub points: Vec<SeriesPoint>,
}

impl ResourceSeries {
    pub fn label(&self) -> String {
        self.resource.label()
    }

    pub fn positions(&self) -> Vec<Option<usize>> {
        self.points.iter().map(SeriesPoint::position).collect()
    }

    /// Best (lowest) position ever reached
    pub fn best_position(&self) -> Option<usize> {
        self.points.iter().filter_map(SeriesPoint::position).min()
    }
}

/// A precomputed monthly aggregate row. `date` is the raw `YYYY-MM` string
/// from the store; it is validated by the totals formatter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyTotal {
    pub date: String,
    pub total_requests: u64,
    pub total_bandwidth: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimePoint {
    pub date: NaiveDate,
    pub value: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSeries {
    pub label: String,
    pub points: Vec<TimePoint>,
}

impl TimeSeries {
    pub fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            points: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn values(&self) -> Vec<u64> {
        self.points.iter().map(|p| p.value).collect()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.date).collect()
    }
}

/// Requests and bandwidth split into two parallel series over the same dates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TotalsSeries {
    pub requests: TimeSeries,
    pub bandwidth: TimeSeries,
}

impl TotalsSeries {
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.requests.dates()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }
}
