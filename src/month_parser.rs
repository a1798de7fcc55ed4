use anyhow::Result;
use chrono::NaiveDate;

/// Handles parsing the `YYYY-MM` month strings stored in the totals view
pub struct MonthParser;

impl MonthParser {
    /// Parse a `YYYY-MM` string into the first day of that month.
    /// Surrounding whitespace is ignored; anything else that does not name
    /// a real calendar month is rejected.
    pub fn parse(month_str: &str) -> Result<NaiveDate> {
        let trimmed = month_str.trim();

        if let Ok(date) = NaiveDate::parse_from_str(&format!("{}-01", trimmed), "%Y-%m-%d") {
            return Ok(date);
        }

        anyhow::bail!("Failed to parse month: {:?} (expected YYYY-MM)", month_str)
    }

    /// Check a (year, month) pair read from the raw usage table
    pub fn validate(year: i32, month: u32) -> Result<NaiveDate> {
        NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or_else(|| anyhow::anyhow!("Invalid year/month: {}-{}", year, month))
    }
}
