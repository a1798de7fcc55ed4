use anyhow::{Context, Result};
use cdn_usage_charts::chart::PlottersRenderer;
use cdn_usage_charts::config::{init_config, Config};
use cdn_usage_charts::display::DisplayManager;
use cdn_usage_charts::logging::init_logging;
use cdn_usage_charts::reporter::{ReportKind, UsageReporter};
use cdn_usage_charts::source::SqliteSource;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;
use tracing::{error, info, info_span};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "cdn-usage-charts")]
#[command(about = "Render monthly CDN usage charts from a local SQLite store")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file (TOML); replaces the default lookup
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// SQLite database with the usage data
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    /// Number of resources ranked per month
    #[arg(long, global = true)]
    limit: Option<usize>,

    /// Directory the chart images are written to
    #[arg(long, global = true)]
    output_dir: Option<PathBuf>,

    /// Print the prepared series as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Prepare and print the data without rendering images
    #[arg(long, global = true)]
    dry_run: bool,
}

#[derive(Subcommand, Clone, Copy)]
enum Commands {
    /// Render both charts (default)
    All,
    /// Render the top resources ranking chart
    Ranking,
    /// Render the requests and bandwidth chart
    Totals,
}

impl From<Commands> for ReportKind {
    fn from(command: Commands) -> Self {
        match command {
            Commands::All => ReportKind::All,
            Commands::Ranking => ReportKind::Ranking,
            Commands::Totals => ReportKind::Totals,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    let json = cli.json;

    let config = match resolve_config(&cli) {
        Ok(config) => init_config(config),
        Err(e) => handle_error(e, json),
    };

    let log_guard = init_logging(&config.logging, &config.paths.log_directory);

    if let Err(e) = run(&cli, config) {
        error!(error = %format!("{:#}", e), "Report run failed");
        drop(log_guard);
        handle_error(e, json);
    }
}

fn resolve_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            let mut config = Config::load_from_file(path)?;
            config.apply_env_overrides()?;
            config
        }
        None => Config::load()?,
    };

    if let Some(database) = &cli.database {
        config.database.path = database.clone();
    }
    if let Some(limit) = cli.limit {
        config.charts.top_limit = limit;
    }
    if let Some(output_dir) = &cli.output_dir {
        config.charts.output_dir = output_dir.clone();
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn run(cli: &Cli, config: &Config) -> Result<()> {
    let run_id = Uuid::new_v4();
    let _span = info_span!("report_run", run_id = %run_id).entered();

    let kind: ReportKind = cli.command.unwrap_or(Commands::All).into();
    info!(
        database = %config.database.path.display(),
        output_dir = %config.charts.output_dir.display(),
        limit = config.charts.top_limit,
        ?kind,
        "Starting report run"
    );

    let source = SqliteSource::with_tables(
        &config.database.path,
        &config.database.usage_table,
        &config.database.totals_table,
    );
    let renderer = PlottersRenderer::new(config.charts.width, config.charts.height);

    UsageReporter::new(source, renderer, config.charts.clone(), DisplayManager::new(cli.json))
        .dry_run(cli.dry_run)
        .run(kind)
}

fn handle_error(e: anyhow::Error, json: bool) -> ! {
    if json {
        println!("{}", serde_json::json!({ "error": format!("{:#}", e) }));
    } else {
        eprintln!("Error: {:#}", e);
    }
    process::exit(1);
}
