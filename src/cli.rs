//! CLI definition and dispatch.

use chrono::Local;
use clap::{Parser, Subcommand};
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::history_cache::{HistoryCache, DEFAULT_LOOKBACK_YEARS};
use crate::adapters::yahoo_adapter::YahooAdapter;
use crate::domain::error::ScreenerError;
use crate::domain::screener::{screen, ScreenConfig, ScreenResult};
use crate::domain::signal;
use crate::domain::tickers::parse_tickers;
use crate::ports::config_port::ConfigPort;
use crate::ports::history_port::HistoryPort;
use crate::ports::market_data_port::MarketDataPort;

pub const DEFAULT_CACHE_DIR: &str = "data";

#[derive(Parser, Debug)]
#[command(name = "peakscreen", about = "Screens large caps holding near their all-time high")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Screen a ticker list and rank survivors by market capitalization
    Screen {
        /// Ticker list file: symbols separated by commas and/or whitespace
        #[arg(short, long, default_value = "tickers.txt")]
        tickers: PathBuf,
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[command(flatten)]
        overrides: SettingsOverrides,
    },
    /// Evaluate a single ticker and explain the decision
    Check {
        ticker: String,
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[command(flatten)]
        overrides: SettingsOverrides,
    },
    /// Show cached date range for ticker(s)
    Info {
        tickers: Vec<String>,
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long)]
        cache_dir: Option<PathBuf>,
    },
    /// List tickers present in the cache directory
    ListCached {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long)]
        cache_dir: Option<PathBuf>,
    },
}

/// Command-line overrides; a set flag beats the config file, which beats the
/// built-in default.
#[derive(clap::Args, Debug, Default)]
pub struct SettingsOverrides {
    #[arg(long)]
    pub cache_dir: Option<PathBuf>,
    /// Minimum market capitalization in dollars
    #[arg(long)]
    pub min_cap: Option<f64>,
    /// Maximum number of results to print
    #[arg(long)]
    pub limit: Option<usize>,
    /// Trailing window length in months
    #[arg(long)]
    pub months: Option<u32>,
    /// Fraction of the all-time high every windowed close must hold
    #[arg(long)]
    pub threshold: Option<f64>,
    #[arg(long)]
    pub lookback_years: Option<u32>,
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Screen {
            tickers,
            config,
            overrides,
        } => run_screen(&tickers, config.as_ref(), overrides),
        Command::Check {
            ticker,
            config,
            overrides,
        } => run_check(&ticker, config.as_ref(), overrides),
        Command::Info {
            tickers,
            config,
            cache_dir,
        } => run_info(&tickers, config.as_ref(), cache_dir),
        Command::ListCached { config, cache_dir } => run_list_cached(config.as_ref(), cache_dir),
    }
}

/// Effective settings after flag > config file > default resolution.
#[derive(Debug, Clone)]
pub struct Settings {
    pub screen: ScreenConfig,
    pub cache_dir: PathBuf,
    pub lookback_years: u32,
}

pub fn resolve_settings(config: Option<&dyn ConfigPort>, overrides: SettingsOverrides) -> Settings {
    let defaults = ScreenConfig::default();
    let mut settings = Settings {
        screen: defaults.clone(),
        cache_dir: PathBuf::from(DEFAULT_CACHE_DIR),
        lookback_years: DEFAULT_LOOKBACK_YEARS,
    };

    if let Some(config) = config {
        settings.screen.min_market_cap =
            config.get_float("screener", "min_market_cap", defaults.min_market_cap);
        settings.screen.max_results =
            config.get_int("screener", "max_results", defaults.max_results as i64) as usize;
        settings.screen.window_months =
            config.get_int("screener", "window_months", i64::from(defaults.window_months)) as u32;
        settings.screen.threshold = config.get_float("screener", "threshold", defaults.threshold);
        if let Some(dir) = config.get_string("cache", "directory") {
            settings.cache_dir = PathBuf::from(dir);
        }
        settings.lookback_years =
            config.get_int("cache", "lookback_years", i64::from(DEFAULT_LOOKBACK_YEARS)) as u32;
    }

    if let Some(v) = overrides.min_cap {
        settings.screen.min_market_cap = v;
    }
    if let Some(v) = overrides.limit {
        settings.screen.max_results = v;
    }
    if let Some(v) = overrides.months {
        settings.screen.window_months = v;
    }
    if let Some(v) = overrides.threshold {
        settings.screen.threshold = v;
    }
    if let Some(dir) = overrides.cache_dir {
        settings.cache_dir = dir;
    }
    if let Some(v) = overrides.lookback_years {
        settings.lookback_years = v;
    }

    settings
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = ScreenerError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

/// One stdout line per surviving ticker, capitalization in billions.
pub fn output_line(result: &ScreenResult) -> String {
    format!("{}: market cap {:.2}B", result.ticker, result.market_cap / 1e9)
}

fn resolve_settings_or_exit(
    config_path: Option<&PathBuf>,
    overrides: SettingsOverrides,
) -> Result<Settings, ExitCode> {
    let adapter = match config_path {
        Some(path) => Some(load_config(path)?),
        None => None,
    };
    let settings = resolve_settings(adapter.as_ref().map(|a| a as &dyn ConfigPort), overrides);
    settings.screen.validate().map_err(|e| {
        eprintln!("error: {e}");
        ExitCode::from(&e)
    })?;
    Ok(settings)
}

fn run_screen(
    tickers_path: &PathBuf,
    config_path: Option<&PathBuf>,
    overrides: SettingsOverrides,
) -> ExitCode {
    let settings = match resolve_settings_or_exit(config_path, overrides) {
        Ok(s) => s,
        Err(code) => return code,
    };

    let content = match fs::read_to_string(tickers_path) {
        Ok(c) => c,
        Err(e) => {
            let err = ScreenerError::Io(e);
            eprintln!(
                "error: cannot read ticker list {}: {err}",
                tickers_path.display()
            );
            return ExitCode::from(&err);
        }
    };

    let tickers = parse_tickers(&content);
    if tickers.is_empty() {
        eprintln!("No tickers in {}; nothing to screen", tickers_path.display());
        return ExitCode::SUCCESS;
    }

    eprintln!(
        "Screening {} tickers (min cap {:.2}B, {}-month window, threshold {:.0}%)",
        tickers.len(),
        settings.screen.min_market_cap / 1e9,
        settings.screen.window_months,
        settings.screen.threshold * 100.0,
    );

    let today = Local::now().date_naive();
    let provider = YahooAdapter::new();
    let cache = HistoryCache::new(
        settings.cache_dir.clone(),
        settings.lookback_years,
        &provider,
    );

    let report = screen(&provider, &cache, &tickers, &settings.screen, today);

    for result in &report.results {
        println!("{}", output_line(result));
    }

    let passed = tickers.len() - report.skipped.len();
    eprintln!(
        "{} of {} tickers passed, {} shown",
        passed,
        tickers.len(),
        report.results.len()
    );
    ExitCode::SUCCESS
}

fn run_check(
    ticker: &str,
    config_path: Option<&PathBuf>,
    overrides: SettingsOverrides,
) -> ExitCode {
    let settings = match resolve_settings_or_exit(config_path, overrides) {
        Ok(s) => s,
        Err(code) => return code,
    };

    let ticker = ticker.to_uppercase();
    let today = Local::now().date_naive();
    let provider = YahooAdapter::new();
    let cache = HistoryCache::new(
        settings.cache_dir.clone(),
        settings.lookback_years,
        &provider,
    );

    match provider.fetch_snapshot(&ticker) {
        Ok(snapshot) => {
            eprintln!(
                "{}: market cap {:.2}B",
                ticker,
                snapshot.market_cap_or_zero() / 1e9
            );
        }
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(&e);
        }
    }

    let series = match cache.load(&ticker, today) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(&e);
        }
    };

    if let (Some(first), Some(last)) = (series.first_date(), series.last_date()) {
        eprintln!("  history: {} rows, {} to {}", series.len(), first, last);
    }

    match signal::evaluate(
        &series,
        settings.screen.window_months,
        settings.screen.threshold,
    ) {
        Some(detail) => {
            eprintln!(
                "  all-time high: {:.2} on {}",
                detail.all_time_high, detail.all_time_high_date
            );
            eprintln!("  window start:  {}", detail.window_start);
            eprintln!(
                "  window low:    {:.2} (floor {:.2})",
                detail.recent_min,
                settings.screen.threshold * detail.all_time_high
            );
            if detail.holds {
                println!("{}: holding near all-time high", ticker);
            } else {
                println!("{}: not holding", ticker);
            }
        }
        None => println!("{}: not holding (no data in window)", ticker),
    }

    ExitCode::SUCCESS
}

fn run_info(
    tickers: &[String],
    config_path: Option<&PathBuf>,
    cache_dir: Option<PathBuf>,
) -> ExitCode {
    let overrides = SettingsOverrides {
        cache_dir,
        ..SettingsOverrides::default()
    };
    let settings = match resolve_settings_or_exit(config_path, overrides) {
        Ok(s) => s,
        Err(code) => return code,
    };

    let provider = YahooAdapter::new();
    let cache = HistoryCache::new(
        settings.cache_dir.clone(),
        settings.lookback_years,
        &provider,
    );

    let tickers: Vec<String> = if tickers.is_empty() {
        match cache.list_cached() {
            Ok(t) => t,
            Err(e) => {
                eprintln!("error: {e}");
                return ExitCode::from(&e);
            }
        }
    } else {
        tickers.iter().map(|t| t.to_uppercase()).collect()
    };

    if tickers.is_empty() {
        eprintln!("Cache {} is empty", settings.cache_dir.display());
        return ExitCode::SUCCESS;
    }

    for ticker in &tickers {
        match cache.cached_range(ticker) {
            Ok(Some((first, last, rows))) => {
                println!("{}: {} rows, {} to {}", ticker, rows, first, last);
            }
            Ok(None) => eprintln!("{}: no cache entry", ticker),
            Err(e) => eprintln!("error querying {}: {}", ticker, e),
        }
    }
    ExitCode::SUCCESS
}

fn run_list_cached(config_path: Option<&PathBuf>, cache_dir: Option<PathBuf>) -> ExitCode {
    let overrides = SettingsOverrides {
        cache_dir,
        ..SettingsOverrides::default()
    };
    let settings = match resolve_settings_or_exit(config_path, overrides) {
        Ok(s) => s,
        Err(code) => return code,
    };

    let provider = YahooAdapter::new();
    let cache = HistoryCache::new(
        settings.cache_dir.clone(),
        settings.lookback_years,
        &provider,
    );

    match cache.list_cached() {
        Ok(tickers) if tickers.is_empty() => {
            eprintln!("Cache {} is empty", settings.cache_dir.display());
        }
        Ok(tickers) => {
            for ticker in &tickers {
                println!("{}", ticker);
            }
            eprintln!("{} cached tickers", tickers.len());
        }
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(&e);
        }
    }
    ExitCode::SUCCESS
}
