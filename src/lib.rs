//! CDN Usage Charts
//!
//! Reads monthly CDN usage statistics from a local SQLite store and renders
//! two charts: the top-K most requested resources per month as a ranking
//! over time, and total requests against total bandwidth on a dual axis.
//!
//! ## Architecture Overview
//!
//! - [`models`] - Typed usage rows, month keys and plot-ready series
//! - [`source`] - The [`source::UsageSource`] seam and its SQLite implementation
//! - [`ranking`] - Monthly top-K ranking and the per-resource pivot
//! - [`totals`] - Monthly totals split into date-aligned series
//! - [`chart`] - Chart description and the plotters renderer
//! - [`reporter`] - Runs the reports end to end
//! - [`display`] - Terminal summary and JSON output
//! - [`config`] - Configuration from defaults, TOML file and environment
//! - [`logging`] - Structured logging setup
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use cdn_usage_charts::chart::PlottersRenderer;
//! use cdn_usage_charts::config::Config;
//! use cdn_usage_charts::display::DisplayManager;
//! use cdn_usage_charts::reporter::{ReportKind, UsageReporter};
//! use cdn_usage_charts::source::SqliteSource;
//!
//! # fn example() -> anyhow::Result<()> {
//! let config = Config::default();
//! let reporter = UsageReporter::new(
//!     SqliteSource::new("data.db"),
//!     PlottersRenderer::new(config.charts.width, config.charts.height),
//!     config.charts.clone(),
//!     DisplayManager::new(false),
//! );
//! reporter.run(ReportKind::All)?;
//! # Ok(())
//! # }
//! ```

pub mod chart;
pub mod config;
pub mod display;
pub mod logging;
pub mod models;
pub mod month_parser;
pub mod ranking;
pub mod reporter;
pub mod source;
pub mod totals;

pub use models::*;
pub use ranking::{RankingAggregator, RankingReport};
pub use reporter::{ReportKind, UsageReporter};
pub use totals::TotalsFormatter;
