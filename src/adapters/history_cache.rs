//! CSV-backed incremental price-history cache.
//!
//! One `<TICKER>.csv` per ticker under the cache directory, header
//! `date,open,high,low,close,volume`. On load, only the tail missing since
//! the last stored date is fetched; a series already current for `today`
//! never touches the provider. Entries are append-only and never pruned.

use crate::domain::bar::DailyBar;
use crate::domain::error::ScreenerError;
use crate::domain::series::PriceSeries;
use crate::ports::history_port::HistoryPort;
use crate::ports::market_data_port::MarketDataPort;
use chrono::{Duration, NaiveDate};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_LOOKBACK_YEARS: u32 = 10;

const CSV_HEADER: [&str; 6] = ["date", "open", "high", "low", "close", "volume"];

pub struct HistoryCache<'a> {
    cache_dir: PathBuf,
    lookback_years: u32,
    market_data: &'a dyn MarketDataPort,
}

impl<'a> HistoryCache<'a> {
    pub fn new(cache_dir: PathBuf, lookback_years: u32, market_data: &'a dyn MarketDataPort) -> Self {
        Self {
            cache_dir,
            lookback_years,
            market_data,
        }
    }

    pub fn cache_path(&self, ticker: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.csv", ticker))
    }

    /// Cached date range and row count for `ticker`, `None` when no entry
    /// exists yet.
    pub fn cached_range(
        &self,
        ticker: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, ScreenerError> {
        let path = self.cache_path(ticker);
        if !path.exists() {
            return Ok(None);
        }
        let series = read_series(&path).map_err(|reason| ScreenerError::DataUnavailable {
            ticker: ticker.to_string(),
            reason,
        })?;
        match (series.first_date(), series.last_date()) {
            (Some(first), Some(last)) => Ok(Some((first, last, series.len()))),
            _ => Ok(None),
        }
    }

    /// Tickers with an entry in the cache directory, sorted.
    pub fn list_cached(&self) -> Result<Vec<String>, ScreenerError> {
        if !self.cache_dir.exists() {
            return Ok(Vec::new());
        }
        let mut tickers = Vec::new();
        for entry in fs::read_dir(&self.cache_dir)? {
            let entry = entry?;
            let name = entry.file_name();
            let name_str = name.to_string_lossy();
            if let Some(ticker) = name_str.strip_suffix(".csv") {
                tickers.push(ticker.to_string());
            }
        }
        tickers.sort();
        Ok(tickers)
    }

    fn full_fetch(&self, ticker: &str, today: NaiveDate) -> Result<PriceSeries, ScreenerError> {
        let start = today - Duration::days(i64::from(self.lookback_years) * 365);
        let fetched = self
            .market_data
            .fetch_daily(ticker, start, today)
            .map_err(|e| data_unavailable(ticker, &e))?;
        if fetched.is_empty() {
            return Err(ScreenerError::DataUnavailable {
                ticker: ticker.to_string(),
                reason: "remote source returned no rows".to_string(),
            });
        }
        let series = PriceSeries::from_bars(fetched);
        self.write_series(ticker, &series)?;
        Ok(series)
    }

    fn update(
        &self,
        ticker: &str,
        cached: PriceSeries,
        last: NaiveDate,
        today: NaiveDate,
    ) -> Result<PriceSeries, ScreenerError> {
        let fetched = self
            .market_data
            .fetch_daily(ticker, last + Duration::days(1), today)
            .map_err(|e| data_unavailable(ticker, &e))?;
        // An empty delta just means no trading days since `last`.
        let merged = cached.merged_with(fetched);
        self.write_series(ticker, &merged)?;
        Ok(merged)
    }

    fn write_series(&self, ticker: &str, series: &PriceSeries) -> Result<(), ScreenerError> {
        fs::create_dir_all(&self.cache_dir)?;
        let path = self.cache_path(ticker);
        let mut writer = csv::Writer::from_path(&path).map_err(std::io::Error::other)?;
        writer
            .write_record(CSV_HEADER)
            .map_err(std::io::Error::other)?;
        for bar in series.bars() {
            writer
                .write_record(&[
                    bar.date.format("%Y-%m-%d").to_string(),
                    bar.open.to_string(),
                    bar.high.to_string(),
                    bar.low.to_string(),
                    bar.close.to_string(),
                    bar.volume.to_string(),
                ])
                .map_err(std::io::Error::other)?;
        }
        writer.flush()?;
        Ok(())
    }
}

impl HistoryPort for HistoryCache<'_> {
    fn load(&self, ticker: &str, today: NaiveDate) -> Result<PriceSeries, ScreenerError> {
        let path = self.cache_path(ticker);
        if !path.exists() {
            return self.full_fetch(ticker, today);
        }

        match read_series(&path) {
            Ok(cached) => match cached.last_date() {
                // Already current: no provider access at all.
                Some(last) if last >= today => Ok(cached),
                Some(last) => self.update(ticker, cached, last, today),
                None => self.full_fetch(ticker, today),
            },
            Err(reason) => {
                // An unreadable entry counts as absent; a full refetch
                // rewrites it.
                eprintln!("Warning: cache for {} unreadable ({}), refetching", ticker, reason);
                self.full_fetch(ticker, today)
            }
        }
    }
}

fn data_unavailable(ticker: &str, source: &ScreenerError) -> ScreenerError {
    ScreenerError::DataUnavailable {
        ticker: ticker.to_string(),
        reason: source.to_string(),
    }
}

fn read_series(path: &Path) -> Result<PriceSeries, String> {
    let content =
        fs::read_to_string(path).map_err(|e| format!("failed to read {}: {}", path.display(), e))?;

    let mut reader = csv::Reader::from_reader(content.as_bytes());
    let mut bars = Vec::new();

    for result in reader.records() {
        let record = result.map_err(|e| format!("CSV parse error: {}", e))?;
        let date_str = parse_field::<String>(&record, 0, "date")?;
        let date = NaiveDate::parse_from_str(&date_str, "%Y-%m-%d")
            .map_err(|e| format!("invalid date format: {}", e))?;

        bars.push(DailyBar {
            date,
            open: parse_field(&record, 1, "open")?,
            high: parse_field(&record, 2, "high")?,
            low: parse_field(&record, 3, "low")?,
            close: parse_field(&record, 4, "close")?,
            volume: parse_field(&record, 5, "volume")?,
        });
    }

    Ok(PriceSeries::from_bars(bars))
}

fn parse_field<T>(record: &csv::StringRecord, index: usize, name: &str) -> Result<T, String>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    record
        .get(index)
        .ok_or_else(|| format!("missing {} column", name))?
        .trim()
        .parse()
        .map_err(|e| format!("invalid {} value: {}", name, e))
}
