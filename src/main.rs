mod analyzer;
mod capture;
mod config;
mod model;
mod parser;
mod scraper;
mod storage;
mod utils;

use analyzer::{SeriesBuilder, Statistic};
use anyhow::{bail, Context};
use capture::{read_url_list, CaptureRunner};
use chrono::{Local, NaiveDate};
use clap::{Parser as ClapParser, ValueEnum};
use config::{load_config, AppConfig, StorageBackend};
use model::Price;
use parser::{PriceExtractor, PriceParser};
use scraper::HttpFetcher;
use std::io::{self, Write};
use std::time::Duration;
use storage::{FsPageStore, PageStore, SqlitePageStore};
use tracing::{debug, error, info, Level};
use utils::parse_date;

#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
enum StatArg {
    Min,
    Max,
    Mean,
    Median,
    /// Tickets priced below `--threshold`.
    CountBelow,
}

/// Captures ticket listing pages and prints a daily price series per event.
#[derive(ClapParser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Capture every url in the url list before running the analysis.
    #[arg(long)]
    scrape: bool,

    /// JSON config file.
    #[arg(long)]
    config: Option<String>,

    /// Url list, one event page per line.
    #[arg(long)]
    urls: Option<String>,

    /// Storage root: the directory whose subdirectories are subjects (default
    /// `captures`, not the working directory), or the database file for sqlite.
    #[arg(long)]
    root: Option<String>,

    /// First day of the series, YYYY-MM-DD.
    #[arg(long, value_parser = parse_date)]
    start: Option<NaiveDate>,

    /// Last day of the series, YYYY-MM-DD. Defaults to today.
    #[arg(long, value_parser = parse_date)]
    end: Option<NaiveDate>,

    #[arg(long, value_enum, default_value_t = StatArg::Min)]
    statistic: StatArg,

    #[arg(long)]
    threshold: Option<Price>,

    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn statistic(&self) -> anyhow::Result<Statistic> {
        Ok(match self.statistic {
            StatArg::Min => Statistic::Min,
            StatArg::Max => Statistic::Max,
            StatArg::Mean => Statistic::Mean,
            StatArg::Median => Statistic::Median,
            StatArg::CountBelow => match self.threshold {
                Some(threshold) => Statistic::CountBelow(threshold),
                None => bail!("--statistic count-below needs --threshold"),
            },
        })
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries only the series.
    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::INFO })
        .with_writer(std::io::stderr)
        .init();

    let mut config = match &cli.config {
        Some(path) => load_config(path).with_context(|| format!("loading {}", path))?,
        None => AppConfig::default(),
    };
    if let Some(urls) = &cli.urls {
        config.urls_file = urls.clone();
    }
    if let Some(root) = &cli.root {
        match config.storage_backend {
            StorageBackend::Files => config.storage_root = root.clone(),
            StorageBackend::Sqlite => config.database_path = root.clone(),
        }
    }

    let statistic = cli.statistic()?;
    let store = open_store(&config)?;
    let today = Local::now().date_naive();

    if cli.scrape {
        info!("Scraping ticket listings from {}...", config.urls_file);
        scrape(&config, store.as_ref(), today)?;
    }

    let start = cli.start.unwrap_or(config.start_date);
    let end = cli.end.unwrap_or(today);
    info!("Building {:?} series from {} to {}", statistic, start, end);

    let extractor = PriceExtractor::new(PriceParser::new(config.markers.clone()));
    let builder = SeriesBuilder::new(store.as_ref(), extractor);
    report(&mut io::stdout().lock(), store.as_ref(), &builder, start, end, &statistic)?;

    Ok(())
}

/// Prints one series per stored subject, in subject order. Stops at the first
/// subject whose series cannot be built; earlier subjects stay printed.
fn report<W: Write, S: PageStore + ?Sized>(
    out: &mut W,
    store: &S,
    builder: &SeriesBuilder<'_, S>,
    start: NaiveDate,
    end: NaiveDate,
    statistic: &Statistic,
) -> anyhow::Result<()> {
    for subject in store.subjects()? {
        let series = match builder.build(&subject, start, end, statistic) {
            Ok(series) => series,
            Err(e) => {
                if e.is_malformed() {
                    error!("Captures for {} no longer match the configured price markers", subject);
                }
                return Err(e).with_context(|| format!("building series for {}", subject));
            }
        };
        let lowest = series.dates().min_by(|a, b| a.1.total_cmp(&b.1));
        if let (Some(last), Some((low_day, low))) = (series.end(), lowest) {
            debug!("{}: {} days through {}, lowest {} on {}", subject, series.len(), last, low, low_day);
        }
        writeln!(out, "*** {} ***", subject)?;
        writeln!(out, "{:?}", series.values)?;
        writeln!(out)?;
    }

    Ok(())
}

fn open_store(config: &AppConfig) -> anyhow::Result<Box<dyn PageStore>> {
    let store: Box<dyn PageStore> = match config.storage_backend {
        StorageBackend::Files => {
            let store = FsPageStore::new(&config.storage_root);
            info!("Using capture directory {}", store.root().display());
            Box::new(store)
        }
        StorageBackend::Sqlite => {
            info!("Using capture database {}", config.database_path);
            Box::new(SqlitePageStore::new(&config.database_path)?)
        }
    };
    Ok(store)
}

fn scrape(config: &AppConfig, store: &dyn PageStore, today: NaiveDate) -> anyhow::Result<()> {
    let urls = read_url_list(&config.urls_file)?;
    let fetcher = HttpFetcher::new(
        &config.user_agent,
        Duration::from_secs(config.request_timeout_seconds),
        Duration::from_secs(config.settle_delay_seconds),
    )?;

    let captured = CaptureRunner::new(&fetcher, store, config.performer.as_str()).run(&urls, today)?;
    info!("Captured {} pages", captured);
    Ok(())
}
