//! Report runner
//!
//! [`UsageReporter`] runs the two reports against a [`UsageSource`] and a
//! [`SeriesRenderer`]:
//!
//! 1. **Top resources**: fetch raw usage rows, rank each month's top-K,
//!    render the rank-over-time chart
//! 2. **Requests and bandwidth**: fetch monthly totals, split them into two
//!    date-aligned series, render the dual-axis chart
//!
//! The reports share no state; each fetches its own rows and a failure in
//! one is returned to the caller as-is.

use crate::chart::*;
use crate::config::ChartsConfig;
use crate::display::DisplayManager;
use crate::models::*;
use crate::ranking::{RankingAggregator, RankingReport};
use crate::source::UsageSource;
use crate::totals::TotalsFormatter;
use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::{info, info_span, warn};

pub const REQUESTS_COLOR: Rgb = Rgb(0xD9, 0x64, 0x3A);
pub const BANDWIDTH_COLOR: Rgb = Rgb(0x1E, 0xAD, 0xAE);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    All,
    Ranking,
    Totals,
}

pub struct UsageReporter<S: UsageSource, R: SeriesRenderer> {
    source: S,
    renderer: R,
    charts: ChartsConfig,
    display: DisplayManager,
    render: bool,
}

impl<S: UsageSource, R: SeriesRenderer> UsageReporter<S, R> {
    pub fn new(source: S, renderer: R, charts: ChartsConfig, display: DisplayManager) -> Self {
        Self {
            source,
            renderer,
            charts,
            display,
            render: true,
        }
    }

    /// Skip image rendering; data is still fetched, prepared and displayed
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.render = !dry_run;
        self
    }

    pub fn run(&self, kind: ReportKind) -> Result<()> {
        match kind {
            ReportKind::All => {
                self.top_resources()?;
                self.requests_and_bandwidth()?;
            }
            ReportKind::Ranking => {
                self.top_resources()?;
            }
            ReportKind::Totals => {
                self.requests_and_bandwidth()?;
            }
        }
        Ok(())
    }

    /// Rank-over-time chart of each month's most requested resources
    pub fn top_resources(&self) -> Result<RankingReport> {
        let _span = info_span!("top_resources", limit = self.charts.top_limit).entered();

        let records = self
            .source
            .usage_records()
            .context("Failed to load usage records")?;

        let report = RankingAggregator::new(self.charts.top_limit).aggregate(&records);
        if report.is_empty() {
            warn!("No usage records found, the ranking chart will be blank");
        }

        let title = self.charts.ranking_title();
        let image = self.render_chart(&ranking_chart(&report, &title), self.charts.ranking_output())?;

        info!(
            months = report.months.len(),
            tracked = report.tracked_count(),
            "Top resources report complete"
        );

        self.display.display_ranking(&title, &report, image.as_deref())?;
        Ok(report)
    }

    /// Dual-axis chart of total requests and total bandwidth per month
    pub fn requests_and_bandwidth(&self) -> Result<TotalsSeries> {
        let _span = info_span!("requests_and_bandwidth").entered();

        let totals = self
            .source
            .monthly_totals()
            .context("Failed to load monthly totals")?;

        let series = TotalsFormatter::format(&totals)?;
        if series.is_empty() {
            warn!("No monthly totals found, the totals chart will be blank");
        }

        let title = self.charts.totals_title();
        let image = self.render_chart(&totals_chart(&series, &title), self.charts.totals_output())?;

        info!(months = series.requests.len(), "Requests and bandwidth report complete");

        self.display.display_totals(&title, &series, image.as_deref())?;
        Ok(series)
    }

    fn render_chart(&self, chart: &ChartSpec, output: PathBuf) -> Result<Option<PathBuf>> {
        if !self.render {
            info!(title = %chart.title, "Dry run, skipping chart rendering");
            return Ok(None);
        }

        self.renderer
            .render(chart, &output)
            .with_context(|| format!("Failed to render chart '{}'", chart.title))?;
        Ok(Some(output))
    }
}

/// One line per tracked resource on an inverted rank axis, gaps where the
/// resource was outside the top list.
pub fn ranking_chart(report: &RankingReport, title: &str) -> ChartSpec {
    let mut axis = Axis::new(AxisScale::Rank {
        limit: report.limit,
    });
    axis.series = report
        .series
        .iter()
        .map(|series| PlotSeries {
            label: series.label(),
            values: series
                .positions()
                .into_iter()
                .map(|p| p.map(|p| p as f64))
                .collect(),
            color: None,
        })
        .collect();

    ChartSpec {
        title: title.to_string(),
        x_labels: report.month_labels(),
        primary: axis,
        secondary: None,
        markers: true,
    }
}

/// Requests on the left axis, bandwidth on the right, shared month axis
pub fn totals_chart(totals: &TotalsSeries, title: &str) -> ChartSpec {
    let values = |series: &TimeSeries| -> Vec<Option<f64>> {
        series.points.iter().map(|p| Some(p.value as f64)).collect()
    };

    let mut requests = Axis::new(AxisScale::Linear);
    requests.units = Some(UnitScale::billions());
    requests.color = Some(REQUESTS_COLOR);
    requests.series.push(PlotSeries {
        label: totals.requests.label.clone(),
        values: values(&totals.requests),
        color: Some(REQUESTS_COLOR),
    });

    let mut bandwidth = Axis::new(AxisScale::Linear);
    bandwidth.units = Some(UnitScale::petabytes_from_gigabytes());
    bandwidth.color = Some(BANDWIDTH_COLOR);
    bandwidth.series.push(PlotSeries {
        label: totals.bandwidth.label.clone(),
        values: values(&totals.bandwidth),
        color: Some(BANDWIDTH_COLOR),
    });

    ChartSpec {
        title: title.to_string(),
        x_labels: totals
            .dates()
            .into_iter()
            .map(|d| MonthKey::from_date(d).to_string())
            .collect(),
        primary: requests,
        secondary: Some(bandwidth),
        markers: false,
    }
}
