#![allow(dead_code)]

use chrono::{Duration, NaiveDate};
use peakscreen::domain::bar::DailyBar;
use peakscreen::domain::error::ScreenerError;
use peakscreen::domain::snapshot::TickerSnapshot;
use peakscreen::ports::market_data_port::MarketDataPort;
use std::cell::RefCell;
use std::collections::HashMap;

/// Builder-style market-data stub. Records every daily-history request so
/// tests can assert which ranges were fetched, and for which tickers.
pub struct MockMarketData {
    pub bars: HashMap<String, Vec<DailyBar>>,
    pub snapshots: HashMap<String, TickerSnapshot>,
    pub snapshot_errors: HashMap<String, String>,
    pub fetch_errors: HashMap<String, String>,
    pub daily_requests: RefCell<Vec<(String, NaiveDate, NaiveDate)>>,
}

impl MockMarketData {
    pub fn new() -> Self {
        Self {
            bars: HashMap::new(),
            snapshots: HashMap::new(),
            snapshot_errors: HashMap::new(),
            fetch_errors: HashMap::new(),
            daily_requests: RefCell::new(Vec::new()),
        }
    }

    pub fn with_bars(mut self, ticker: &str, bars: Vec<DailyBar>) -> Self {
        self.bars.insert(ticker.to_string(), bars);
        self
    }

    pub fn with_market_cap(mut self, ticker: &str, market_cap: f64) -> Self {
        self.snapshots.insert(
            ticker.to_string(),
            TickerSnapshot {
                market_cap: Some(market_cap),
            },
        );
        self
    }

    pub fn with_snapshot_error(mut self, ticker: &str, reason: &str) -> Self {
        self.snapshot_errors
            .insert(ticker.to_string(), reason.to_string());
        self
    }

    pub fn with_fetch_error(mut self, ticker: &str, reason: &str) -> Self {
        self.fetch_errors
            .insert(ticker.to_string(), reason.to_string());
        self
    }

    pub fn daily_request_count(&self) -> usize {
        self.daily_requests.borrow().len()
    }
}

impl MarketDataPort for MockMarketData {
    fn fetch_daily(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyBar>, ScreenerError> {
        self.daily_requests
            .borrow_mut()
            .push((ticker.to_string(), start, end));
        if let Some(reason) = self.fetch_errors.get(ticker) {
            return Err(ScreenerError::Provider {
                ticker: ticker.to_string(),
                reason: reason.clone(),
            });
        }
        Ok(self
            .bars
            .get(ticker)
            .map(|bars| {
                bars.iter()
                    .filter(|b| b.date >= start && b.date <= end)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn fetch_snapshot(&self, ticker: &str) -> Result<TickerSnapshot, ScreenerError> {
        if let Some(reason) = self.snapshot_errors.get(ticker) {
            return Err(ScreenerError::Provider {
                ticker: ticker.to_string(),
                reason: reason.clone(),
            });
        }
        Ok(self.snapshots.get(ticker).cloned().unwrap_or_default())
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn bar(date: NaiveDate, close: f64) -> DailyBar {
    DailyBar {
        date,
        open: close - 1.0,
        high: close + 1.0,
        low: close - 2.0,
        close,
        volume: 1000,
    }
}

/// `count` consecutive daily bars ending at `end`, closes rising by 0.01 per
/// day from 100.0. A gently rising series sets its high on the last day and
/// passes the high-holding test.
pub fn rising_bars(end: NaiveDate, count: usize) -> Vec<DailyBar> {
    (0..count)
        .map(|i| {
            bar(
                end - Duration::days((count - 1 - i) as i64),
                100.0 + i as f64 * 0.01,
            )
        })
        .collect()
}

/// Dead-flat bars; a flat series longer than the window fails the signal
/// because the earliest-dated tie for the high falls outside the window.
pub fn flat_bars(end: NaiveDate, count: usize, close: f64) -> Vec<DailyBar> {
    (0..count)
        .map(|i| bar(end - Duration::days((count - 1 - i) as i64), close))
        .collect()
}
