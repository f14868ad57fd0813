//! capitol-scrape - legislative data scan-and-ingest tool

use anyhow::Result;
use capitol_common::logging::{init_logging, LogConfig, LogLevel};
use capitol_common::types::MeasureType;
use capitol_scrape::config::ScanConfig;
use capitol_scrape::engine::{DimensionReport, ScanEngine};
use capitol_scrape::fetch::FetchClient;
use capitol_store::SqliteStore;
use chrono::Datelike;
use clap::{Parser, Subcommand};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "capitol-scrape")]
#[command(author, version, about = "Legislature data scraper")]
struct Cli {
    #[command(subcommand)]
    mode: Mode,

    /// SQLite database URL
    #[arg(long, default_value = capitol_scrape::config::DEFAULT_DATABASE_URL, global = true)]
    database: String,

    /// Delay between requests in milliseconds
    #[arg(long, global = true)]
    delay_ms: Option<u64>,

    /// Concurrent workers for closed scans (1-8)
    #[arg(long, global = true)]
    concurrency: Option<usize>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Mode {
    /// Create the database schema and exit
    InitDb,

    /// Scan measures for a year
    Measures {
        #[arg(short, long)]
        year: u16,

        /// Measure types to scan (default: all)
        #[arg(short, long, value_delimiter = ',')]
        types: Option<Vec<MeasureTypeArg>>,

        /// First measure number to probe
        #[arg(long, default_value_t = 1)]
        start_number: u32,
    },

    /// Scan a member-ID range for a year
    Members {
        #[arg(short, long)]
        year: u16,

        #[arg(long, default_value_t = 1)]
        start_id: u32,

        #[arg(long, default_value_t = 1_500)]
        end_id: u32,
    },

    /// Scan measures then members for a year
    Both {
        #[arg(short, long)]
        year: u16,
    },

    /// Full historical scan across a year range
    Full {
        #[arg(long, default_value_t = 2008)]
        start_year: u16,

        /// Defaults to the current year
        #[arg(long)]
        end_year: Option<u16>,
    },

    /// Re-scan the current and previous year
    Update,

    /// Probe a handful of known keys to verify the pipeline
    Sample,
}

/// clap-friendly wrapper so `--types sb,hb` parses case-insensitively
#[derive(Debug, Clone)]
struct MeasureTypeArg(MeasureType);

impl std::str::FromStr for MeasureTypeArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(MeasureTypeArg)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut log_config = LogConfig::from_env()
        .unwrap_or_else(|_| LogConfig::builder().file_prefix("capitol-scrape").build());
    if cli.verbose {
        log_config.level = LogLevel::Debug;
    }
    init_logging(&log_config)?;

    let mut config = ScanConfig::from_env()?;
    if let Some(delay) = cli.delay_ms {
        config.request_delay_ms = delay;
    }
    if let Some(concurrency) = cli.concurrency {
        config.concurrency = concurrency;
    }
    config.validate()?;

    let store = SqliteStore::connect(&cli.database).await?;

    if let Mode::InitDb = cli.mode {
        info!(
            measures = store.measure_count().await?,
            members = store.member_count().await?,
            "database initialized"
        );
        return Ok(());
    }

    let fetcher = FetchClient::new(&config)?;
    let engine = ScanEngine::new(fetcher, store, config);
    let current_year = chrono::Utc::now().year() as u16;

    let reports = match cli.mode {
        Mode::InitDb => unreachable!("handled above"),

        Mode::Measures {
            year,
            types,
            start_number,
        } => {
            let types: Option<Vec<MeasureType>> =
                types.map(|list| list.into_iter().map(|t| t.0).collect());
            engine
                .scan_measures_for_year(year, types.as_deref(), start_number)
                .await
        },

        Mode::Members {
            year,
            start_id,
            end_id,
        } => vec![engine.scan_members_for_year(year, start_id, end_id).await],

        Mode::Both { year } => {
            let mut reports = engine.scan_measures_for_year(year, None, 1).await;
            let member_ceiling = engine.config().member_ceiling;
            reports.push(engine.scan_members_for_year(year, 1, member_ceiling).await);
            reports
        },

        Mode::Full {
            start_year,
            end_year,
        } => {
            engine
                .full_historical(start_year, end_year.unwrap_or(current_year))
                .await
        },

        Mode::Update => engine.update_recent(current_year).await,

        Mode::Sample => {
            let measures = engine
                .scan_specific_measures(&[
                    (MeasureType::SB, 1, current_year),
                    (MeasureType::HB, 1, current_year),
                    (MeasureType::SB, 1300, current_year),
                ])
                .await;
            let members = engine
                .scan_specific_members(&[(1, current_year), (7, current_year), (253, current_year)])
                .await;
            vec![measures, members]
        },
    };

    print_reports(&reports);
    Ok(())
}

fn print_reports(reports: &[DimensionReport]) {
    for report in reports {
        info!(dimension = %report.dimension, stop = %report.stop, stats = %report.stats,
              "scan summary");
    }
}
