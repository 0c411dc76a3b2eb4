//! ColorfulClouds CLI
//!
//! Fetches CaiYun forecasts once or keeps them refreshed on an interval.

#![allow(clippy::print_stdout)]

mod report;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use application::{RefreshCoordinator, SnapshotListener};
use chrono::Utc;
use clap::{Parser, Subcommand};
use domain::{Language, Snapshot};
use infrastructure::{
    AppConfig, CaiyunWeatherAdapter, SchedulerConfig, SystemClock, TaskScheduler,
    WEATHER_REFRESH_TASK, create_weather_refresh_task, init_tracing,
};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

use crate::report::{View, build_report, summary_line};

/// ColorfulClouds CLI
#[derive(Parser)]
#[command(name = "colorfulclouds")]
#[command(author, version, about = "CaiYun weather forecasts", long_about = None)]
struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Configuration file (defaults to ./config.toml when present)
    #[arg(short, long, env = "COLORFULCLOUDS_CONFIG")]
    config: Option<PathBuf>,

    /// Label language, overrides `caiyun.language`
    #[arg(long, value_parser = ["zh", "en"])]
    lang: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the forecast once and print it as JSON
    Forecast {
        /// Part of the forecast to print
        #[arg(long, value_enum, default_value_t = View::All)]
        view: View,

        /// Print compact instead of pretty JSON
        #[arg(long)]
        compact: bool,
    },

    /// Refresh on the configured interval until interrupted
    ///
    /// Prints a one line summary after every successful refresh.
    Watch {
        /// Poll interval in minutes, overrides `caiyun.poll_interval_minutes`
        #[arg(short, long)]
        interval: Option<u64>,
    },

    /// Load and validate the configuration, then print it with secrets redacted
    CheckConfig,
}

const fn log_filter_from_verbosity(verbose: u8) -> Option<&'static str> {
    match verbose {
        0 => None,
        1 => Some("info"),
        2 => Some("debug"),
        _ => Some("trace"),
    }
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<AppConfig> {
    let config = match path {
        Some(path) => AppConfig::load_from(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => AppConfig::load().context("failed to load configuration")?,
    };
    config.validate().context("invalid configuration")?;
    Ok(config)
}

fn build_coordinator(config: &AppConfig) -> anyhow::Result<Arc<RefreshCoordinator>> {
    let coordinator_config = config
        .caiyun
        .to_coordinator_config()
        .context("caiyun coordinates out of range")?;
    let adapter = CaiyunWeatherAdapter::new(config.caiyun.to_client_config())?;
    Ok(Arc::new(RefreshCoordinator::new(
        Arc::new(adapter),
        Arc::new(SystemClock),
        coordinator_config,
    )))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_ref())?;
    if let Some(filter) = log_filter_from_verbosity(cli.verbose) {
        config.telemetry.log_filter = filter.to_string();
    }
    init_tracing(&config.telemetry)?;

    let language = match cli.lang.as_deref() {
        Some(lang) => lang.parse::<Language>()?,
        None => config.caiyun.language,
    };

    match cli.command {
        Commands::Forecast { view, compact } => {
            let coordinator = build_coordinator(&config)?;
            let snapshot = coordinator.refresh().await?;
            let report = build_report(&snapshot, Utc::now(), language, view)?;
            let output = if compact {
                serde_json::to_string(&report)?
            } else {
                serde_json::to_string_pretty(&report)?
            };
            println!("{output}");
        },
        Commands::Watch { interval } => {
            if let Some(minutes) = interval {
                config.caiyun.poll_interval_minutes = minutes;
            }
            config.validate().context("invalid configuration")?;
            watch(&config, language).await?;
        },
        Commands::CheckConfig => {
            println!("✅ Configuration is valid");
            println!("{}", serde_json::to_string_pretty(&config)?);
        },
    }

    Ok(())
}

async fn watch(config: &AppConfig, language: Language) -> anyhow::Result<()> {
    let coordinator = build_coordinator(config)?;

    let listener: SnapshotListener = Arc::new(move |snapshot: Arc<Snapshot>| {
        match summary_line(&snapshot, Utc::now(), language) {
            Ok(line) => println!("{line}"),
            Err(e) => warn!(error = %e, "Snapshot could not be summarized"),
        }
    });
    coordinator.subscribe(listener);

    // A failed first fetch is retried on the next tick
    if let Err(e) = coordinator.refresh().await {
        warn!(error = %e, "Initial weather refresh failed");
    }

    let scheduler = TaskScheduler::new(SchedulerConfig::default()).await?;
    let mut reports = scheduler.subscribe();
    tokio::spawn(async move {
        loop {
            match reports.recv().await {
                Ok(report) => {
                    if let Err(e) = report.outcome {
                        println!("⚠️  {e}");
                    }
                },
                Err(RecvError::Lagged(_)) => {},
                Err(RecvError::Closed) => break,
            }
        }
    });
    scheduler
        .schedule_every(
            WEATHER_REFRESH_TASK,
            config.caiyun.poll_interval(),
            create_weather_refresh_task(Arc::clone(&coordinator)),
        )
        .await?;
    info!(
        interval_minutes = config.caiyun.poll_interval_minutes,
        location = %coordinator.config().location_key,
        "Watching weather"
    );

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for ctrl-c")?;

    if let Some(stats) = scheduler.stats(WEATHER_REFRESH_TASK) {
        info!(runs = stats.runs, failures = stats.failures, "Shutting down");
    }
    scheduler.stop().await?;
    Ok(())
}
