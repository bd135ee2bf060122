use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{Duration, Local, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use qcforge_analytics::config::Config;
use qcforge_analytics::models::Snapshot;
use qcforge_analytics::report::{self, Dashboard};
use qcforge_analytics::rollup::MAX_WINDOW_DAYS;
use qcforge_analytics::{db, format, group_by_day, normalize, stats};

#[derive(Parser)]
#[command(name = "qcforge-analytics")]
#[command(about = "Inspection analytics for QCForge dashboards", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct SourceArgs {
    /// Read a JSON snapshot instead of Postgres
    #[arg(long, env = "QCFORGE_INPUT")]
    input: Option<PathBuf>,
    /// Only load inspections created in the last N days (Postgres only)
    #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(i64).range(1..=MAX_WINDOW_DAYS as i64))]
    since_days: i64,
    /// Last day of the trend window (defaults to today, local time)
    #[arg(long)]
    date: Option<NaiveDate>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Load realistic seed data
    Seed,
    /// Import inspections from a CSV file
    Import {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Inspection counts and average scores per industry
    Breakdown {
        #[command(flatten)]
        source: SourceArgs,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Daily inspection counts and average scores
    Trends {
        #[command(flatten)]
        source: SourceArgs,
        #[arg(long, default_value_t = 7, value_parser = clap::value_parser!(u64).range(1..=MAX_WINDOW_DAYS as u64))]
        days: u64,
    },
    /// Shipment counts by status and direction
    Shipments {
        #[command(flatten)]
        source: SourceArgs,
    },
    /// QC Cloud project and inspection totals
    Cloud {
        #[command(flatten)]
        source: SourceArgs,
    },
    /// Estimate a duty drawback
    Drawback {
        /// Total value of imported goods (USD)
        #[arg(long)]
        value: f64,
        /// Import duty rate paid (%)
        #[arg(long)]
        rate: f64,
    },
    /// Generate a markdown report
    Report {
        #[command(flatten)]
        source: SourceArgs,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("warn")
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn connect(config: &Config) -> anyhow::Result<PgPool> {
    let database_url = config.require_database_url()?;
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(database_url)
        .await
        .context("failed to connect to Postgres")
}

fn read_snapshot(path: &Path) -> anyhow::Result<Snapshot> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("{} is not a valid snapshot", path.display()))
}

async fn load_snapshot(config: &Config, source: &SourceArgs) -> anyhow::Result<Snapshot> {
    let snapshot = match &source.input {
        Some(path) => read_snapshot(path)?,
        None => {
            let pool = connect(config).await?;
            let since = Utc::now() - Duration::days(source.since_days);
            db::fetch_snapshot(&pool, since).await?
        }
    };
    debug!(
        inspections = snapshot.inspections.len(),
        shipments = snapshot.shipments.len(),
        projects = snapshot.projects.len(),
        "loaded snapshot"
    );
    Ok(snapshot)
}

fn reference_date(source: &SourceArgs) -> NaiveDate {
    source.date.unwrap_or_else(|| Local::now().date_naive())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let config = Config::from_env()?;

    match cli.command {
        Commands::InitDb => {
            let pool = connect(&config).await?;
            db::init_db(&pool).await?;
            println!("Schema ready.");
        }
        Commands::Seed => {
            let pool = connect(&config).await?;
            db::seed(&pool).await?;
            println!("Seed data inserted.");
        }
        Commands::Import { csv } => {
            let pool = connect(&config).await?;
            let inserted = db::import_csv(&pool, &csv).await?;
            println!("Inserted {inserted} inspections from {}.", csv.display());
        }
        Commands::Breakdown { source, limit } => {
            let snapshot = load_snapshot(&config, &source).await?;
            let dashboard = Dashboard::from_snapshot(&snapshot, reference_date(&source), &Local)?;

            if dashboard.breakdown.is_empty() {
                println!("No inspections found.");
                return Ok(());
            }

            println!("Industry breakdown:");
            for row in format::breakdown_rows(&dashboard.breakdown, &config.palette)
                .iter()
                .take(limit)
            {
                println!(
                    "- {} [{}]: {} inspections ({}% avg, {}% of total)",
                    row.label, row.color, row.count, row.average_score, row.percentage
                );
            }
        }
        Commands::Trends { source, days } => {
            let snapshot = load_snapshot(&config, &source).await?;
            let inspections = normalize::inspections_from_values(&snapshot.inspections)?;
            let normalized = normalize::normalize(&inspections)?;
            let daily = group_by_day(&normalized, reference_date(&source), days as usize, &Local);

            println!("Quality trend:");
            for point in format::trend_points(&daily) {
                println!(
                    "- {}: {} inspections, {}% avg",
                    point.label, point.count, point.average_score
                );
            }
        }
        Commands::Shipments { source } => {
            let snapshot = load_snapshot(&config, &source).await?;
            let shipments = stats::shipments_from_values(&snapshot.shipments)?;
            let totals = stats::shipment_stats(&shipments);
            println!(
                "Total shipments: {}\nIn transit: {}\nDelivered: {}\nDelayed: {}\nImports: {}\nExports: {}",
                totals.total,
                totals.in_transit,
                totals.delivered,
                totals.delayed,
                totals.imports,
                totals.exports
            );
        }
        Commands::Cloud { source } => {
            let snapshot = load_snapshot(&config, &source).await?;
            let dashboard = Dashboard::from_snapshot(&snapshot, reference_date(&source), &Local)?;
            let cloud = &dashboard.cloud;
            println!(
                "Active projects: {} of {}\nTotal inspections: {}\nAverage quality: {}%",
                cloud.active_projects,
                cloud.total_projects,
                cloud.total_inspections,
                format::round_display(cloud.average_quality)
            );
        }
        Commands::Drawback { value, rate } => {
            println!("{}", report::drawback_summary(value, rate));
        }
        Commands::Report { source, out } => {
            let snapshot = load_snapshot(&config, &source).await?;
            let dashboard = Dashboard::from_snapshot(&snapshot, reference_date(&source), &Local)?;
            let report = report::build_report(&dashboard, &config.palette);
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            info!(path = %out.display(), "report written");
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}
