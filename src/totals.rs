//! Monthly totals formatter
//!
//! Turns the precomputed monthly totals into two parallel, date-ascending
//! series (requests and bandwidth) that share the same dates.

use crate::models::*;
use crate::month_parser::MonthParser;
use anyhow::{Context, Result};
use tracing::debug;

pub const REQUESTS_LABEL: &str = "Total Requests";
pub const BANDWIDTH_LABEL: &str = "Total Bandwidth";

pub struct TotalsFormatter;

impl TotalsFormatter {
    /// Duplicate dates are kept as separate points in input order.
    pub fn format(totals: &[MonthlyTotal]) -> Result<TotalsSeries> {
        let mut dated = totals
            .iter()
            .map(|row| {
                MonthParser::parse(&row.date)
                    .with_context(|| format!("Invalid date in monthly totals: {:?}", row.date))
                    .map(|date| (date, row))
            })
            .collect::<Result<Vec<_>>>()?;

        dated.sort_by_key(|(date, _)| *date);

        let mut requests = TimeSeries::new(REQUESTS_LABEL);
        let mut bandwidth = TimeSeries::new(BANDWIDTH_LABEL);

        for (date, row) in dated {
            requests.points.push(TimePoint {
                date,
                value: row.total_requests,
            });
            bandwidth.points.push(TimePoint {
                date,
                value: row.total_bandwidth,
            });
        }

        debug!(points = requests.len(), "Formatted monthly totals");

        Ok(TotalsSeries {
            requests,
            bandwidth,
        })
    }
}
