//! Terminal output
//!
//! Prints what each report prepared: a coloured summary for people, or the
//! prepared series as JSON when `--json` is given.
//!
//! ### Ranking summary
//! One block per month with that month's top list (position, resource,
//! requests), followed by the number of tracked resources.
//!
//! ### Totals summary
//! Month count, covered range and the latest month's requests and bandwidth
//! in the same units as the chart axes.

use crate::chart::{group_thousands, UnitScale};
use crate::models::*;
use crate::ranking::RankingReport;
use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;

pub struct DisplayManager {
    json_output: bool,
}

impl DisplayManager {
    pub fn new(json_output: bool) -> Self {
        Self { json_output }
    }

    pub fn display_ranking(&self, title: &str, report: &RankingReport, image: Option<&Path>) -> Result<()> {
        if self.json_output {
            let output = serde_json::json!({
                "ranking": {
                    "title": title,
                    "image": image.map(|p| p.display().to_string()),
                    "limit": report.limit,
                    "months": report.months,
                    "series": report.series,
                }
            });
            let json_str = serde_json::to_string_pretty(&output)
                .context("Error serializing ranking data to JSON")?;
            println!("{}", json_str);
            return Ok(());
        }

        print_header(title);

        if report.months.is_empty() {
            println!("No usage records found.");
            return Ok(());
        }

        println!(
            "\n{} {} months • {} tracked resources\n",
            "📊".bright_yellow(),
            report.months.len().to_string().bright_white().bold(),
            report.tracked_count().to_string().bright_white().bold()
        );

        for (month, entries) in &report.monthly_top {
            println!("{} {}", "📅".bright_blue(), month.as_str().bright_white().bold());
            for entry in entries {
                println!(
                    "   {} {} ({} requests)",
                    format!("#{}", entry.position).bright_yellow(),
                    entry.resource().label().bright_cyan(),
                    group_thousands(&entry.requests.to_string()).bright_white()
                );
            }
        }

        print_image_line(image);
        Ok(())
    }

    pub fn display_totals(&self, title: &str, totals: &TotalsSeries, image: Option<&Path>) -> Result<()> {
        if self.json_output {
            let output = serde_json::json!({
                "totals": {
                    "title": title,
                    "image": image.map(|p| p.display().to_string()),
                    "requests": totals.requests,
                    "bandwidth": totals.bandwidth,
                }
            });
            let json_str = serde_json::to_string_pretty(&output)
                .context("Error serializing totals data to JSON")?;
            println!("{}", json_str);
            return Ok(());
        }

        print_header(title);

        let (first, last) = match (totals.requests.points.first(), totals.requests.points.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => {
                println!("No monthly totals found.");
                return Ok(());
            }
        };

        let latest_bandwidth = totals.bandwidth.points.last().map(|p| p.value).unwrap_or(0);

        println!("\n{} Total Usage Summary:", "📊".bright_yellow());
        println!(
            "   Months: {}",
            totals.requests.len().to_string().bright_white().bold()
        );
        println!(
            "   Range: {} → {}",
            MonthKey::from_date(first.date).as_str().bright_white(),
            MonthKey::from_date(last.date).as_str().bright_white()
        );
        println!(
            "   Latest requests: {}",
            UnitScale::billions().format(last.value as f64).bright_green().bold()
        );
        println!(
            "   Latest bandwidth: {}",
            UnitScale::petabytes_from_gigabytes()
                .format(latest_bandwidth as f64)
                .bright_green()
                .bold()
        );

        print_image_line(image);
        Ok(())
    }
}

fn print_header(title: &str) {
    println!("\n{}", "=".repeat(80).bright_cyan());
    println!("{}", title.bright_white().bold());
    println!("{}", "=".repeat(80).bright_cyan());
}

fn print_image_line(image: Option<&Path>) {
    if let Some(path) = image {
        println!("\n{} Saved {}", "🖼".bright_blue(), path.display().to_string().bright_white());
    }
    println!();
}
