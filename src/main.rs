use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime, Utc};
use clap::{Args, Parser, Subcommand};
use log::{info, warn};
use serde::Serialize;

use purok_analytics::algorithm::trend::TrendFamily;
use purok_analytics::models::types::{PurokId, Role};
use purok_analytics::registry::{
    SyntheticRegistryConfig, generate_synthetic_registry, write_registry,
};
use purok_analytics::{
    AnalyticsConfig, CallerContext, ParquetRegistry, ReportResponse, ReportService, ReportStatus,
};

/// Role-scoped demographic reports over a purok registry
///
/// Examples:
///   purok-analytics generate --out ./registry --households 500
///   purok-analytics summary --data ./registry --role admin
///   purok-analytics trend --data ./registry --role purok_leader --zone 3 --family vulnerable
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the dashboard summary for a caller as JSON
    Summary {
        #[command(flatten)]
        caller: CallerArgs,

        /// Reference instant (`YYYY-MM-DD` or `YYYY-MM-DDTHH:MM:SS`); defaults to now
        #[arg(long, value_parser = parse_instant)]
        at: Option<NaiveDateTime>,
    },

    /// Print a monthly trend series for a caller as JSON
    Trend {
        #[command(flatten)]
        caller: CallerArgs,

        /// Category family: `registrations` or `vulnerable`
        #[arg(long, default_value = "vulnerable")]
        family: TrendFamily,

        /// Window length in months; defaults to the configured window for the family
        #[arg(long, value_name = "N")]
        months: Option<u32>,

        /// Anchor instant (`YYYY-MM-DD` or `YYYY-MM-DDTHH:MM:SS`); defaults to now
        #[arg(long, value_parser = parse_instant)]
        at: Option<NaiveDateTime>,
    },

    /// Write a synthetic registry as Parquet files
    Generate {
        /// Output directory
        #[arg(short, long, value_name = "DIR")]
        out: PathBuf,

        /// Number of puroks
        #[arg(long, default_value = "7")]
        puroks: usize,

        /// Number of households
        #[arg(long, default_value = "400")]
        households: usize,

        /// Random seed
        #[arg(long, default_value = "42")]
        seed: u64,
    },

    /// Warm a process-local cache for a caller, then invalidate it
    Invalidate {
        #[command(flatten)]
        caller: CallerArgs,

        /// Invalidate entries affected by a change in this purok instead of the caller's
        #[arg(long, value_name = "ID", conflicts_with = "all")]
        purok: Option<PurokId>,

        /// Invalidate every entry
        #[arg(long)]
        all: bool,
    },
}

#[derive(Args, Debug)]
struct CallerArgs {
    /// Registry directory containing the Parquet files
    #[arg(short, long, value_name = "DIR", env = "PUROK_DATA_DIR")]
    data: PathBuf,

    /// Caller role: `admin`, `secretary` or `purok_leader`
    #[arg(short, long)]
    role: Role,

    /// Purok assigned to the caller
    #[arg(short, long, value_name = "ID")]
    zone: Option<PurokId>,
}

impl CallerArgs {
    fn caller(&self) -> CallerContext {
        CallerContext::new(self.role, self.zone)
    }

    fn service(&self) -> Result<ReportService<ParquetRegistry>> {
        let config = AnalyticsConfig::from_env().context("Invalid PUROK_* environment")?;
        info!("{config}");
        let registry = ParquetRegistry::open(self.data.clone())
            .with_context(|| format!("Cannot open registry at {}", self.data.display()))?;
        Ok(ReportService::new(registry, config))
    }
}

fn parse_instant(value: &str) -> std::result::Result<NaiveDateTime, String> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d").map(|date| date.and_time(chrono::NaiveTime::MIN))
        })
        .map_err(|e| format!("invalid instant '{value}': {e}"))
}

fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context("Failed to serialize output")?
    );
    Ok(())
}

fn exit_code(status: ReportStatus) -> ExitCode {
    match status {
        ReportStatus::Ok | ReportStatus::NoData => ExitCode::SUCCESS,
        ReportStatus::Failed => ExitCode::FAILURE,
    }
}

#[derive(Serialize)]
struct InvalidationOutcome {
    warmed: usize,
    removed: usize,
}

fn run(command: Command) -> Result<ExitCode> {
    match command {
        Command::Summary { caller, at } => {
            let service = caller.service()?;
            let response =
                ReportResponse::from_result(service.summary(&caller.caller(), at.unwrap_or_else(now)));
            print_json(&response)?;
            Ok(exit_code(response.status))
        }
        Command::Trend {
            caller,
            family,
            months,
            at,
        } => {
            let service = caller.service()?;
            let response = ReportResponse::from_result(service.trend(
                &caller.caller(),
                family,
                months,
                at.unwrap_or_else(now),
            ));
            print_json(&response)?;
            Ok(exit_code(response.status))
        }
        Command::Generate {
            out,
            puroks,
            households,
            seed,
        } => {
            let config = SyntheticRegistryConfig {
                puroks,
                households,
                seed,
                ..SyntheticRegistryConfig::default()
            };
            info!("{config}");
            let registry = generate_synthetic_registry(&config);
            write_registry(&out, &registry)
                .with_context(|| format!("Failed to write registry to {}", out.display()))?;
            info!("Wrote synthetic registry to {}", out.display());
            Ok(ExitCode::SUCCESS)
        }
        Command::Invalidate { caller, purok, all } => {
            let service = caller.service()?;
            let who = caller.caller();
            let at = now();

            let warmed = [
                service.summary(&who, at).map(|_| ()),
                service.vulnerable_trend(&who, at).map(|_| ()),
                service.registration_trend(&who, at).map(|_| ()),
            ]
            .into_iter()
            .filter(|result| match result {
                Ok(()) => true,
                Err(e) => {
                    warn!("Could not warm cache: {e}");
                    false
                }
            })
            .count();

            let removed = if all {
                service.invalidate_all()
            } else if let Some(purok) = purok {
                service.invalidate_zone(purok)
            } else {
                service.invalidate_caller(&who)?
            };

            print_json(&InvalidationOutcome { warmed, removed })?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Setup logging
    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    run(cli.command)
}
