//! Screening orchestration.
//!
//! Walks the ticker list sequentially: capitalization snapshot, cap floor,
//! price history, high-holding signal. Failures and exclusions are recorded
//! per ticker; one ticker can never abort the batch.

use crate::domain::error::ScreenerError;
use crate::domain::signal;
use crate::ports::history_port::HistoryPort;
use crate::ports::market_data_port::MarketDataPort;
use chrono::NaiveDate;

pub const DEFAULT_MIN_MARKET_CAP: f64 = 10_000_000_000.0;
pub const DEFAULT_MAX_RESULTS: usize = 20;

/// Screening parameters after flag/config/default resolution.
#[derive(Debug, Clone)]
pub struct ScreenConfig {
    pub min_market_cap: f64,
    pub max_results: usize,
    pub window_months: u32,
    pub threshold: f64,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            min_market_cap: DEFAULT_MIN_MARKET_CAP,
            max_results: DEFAULT_MAX_RESULTS,
            window_months: signal::DEFAULT_WINDOW_MONTHS,
            threshold: signal::DEFAULT_THRESHOLD,
        }
    }
}

impl ScreenConfig {
    pub fn validate(&self) -> Result<(), ScreenerError> {
        if !self.min_market_cap.is_finite() || self.min_market_cap < 0.0 {
            return Err(ScreenerError::ConfigInvalid {
                key: "min_market_cap".into(),
                reason: "must be a non-negative number".into(),
            });
        }
        if self.max_results == 0 {
            return Err(ScreenerError::ConfigInvalid {
                key: "max_results".into(),
                reason: "must be at least 1".into(),
            });
        }
        if self.window_months == 0 {
            return Err(ScreenerError::ConfigInvalid {
                key: "window_months".into(),
                reason: "must be at least 1".into(),
            });
        }
        if !(self.threshold > 0.0 && self.threshold <= 1.0) {
            return Err(ScreenerError::ConfigInvalid {
                key: "threshold".into(),
                reason: "must be in (0, 1]".into(),
            });
        }
        Ok(())
    }
}

/// A ticker that passed both the cap floor and the high-holding test.
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenResult {
    pub ticker: String,
    pub market_cap: f64,
}

#[derive(Debug, Clone)]
pub struct SkippedTicker {
    pub ticker: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone)]
pub enum SkipReason {
    Provider { reason: String },
    DataUnavailable { reason: String },
    BelowCapFloor { market_cap: f64 },
    SignalNotHeld,
}

/// Outcome of one screening run: survivors ranked by capitalization, plus
/// every ticker that fell out and why.
#[derive(Debug)]
pub struct ScreenReport {
    pub results: Vec<ScreenResult>,
    pub skipped: Vec<SkippedTicker>,
}

pub fn screen(
    market_data: &dyn MarketDataPort,
    history: &dyn HistoryPort,
    tickers: &[String],
    config: &ScreenConfig,
    today: NaiveDate,
) -> ScreenReport {
    let mut results = Vec::new();
    let mut skipped = Vec::new();

    for ticker in tickers {
        let snapshot = match market_data.fetch_snapshot(ticker) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("Warning: skipping {} ({})", ticker, e);
                skipped.push(SkippedTicker {
                    ticker: ticker.clone(),
                    reason: SkipReason::Provider {
                        reason: e.to_string(),
                    },
                });
                continue;
            }
        };

        // The cap floor runs first so an undersized ticker never costs a
        // price fetch.
        let market_cap = snapshot.market_cap_or_zero();
        if market_cap < config.min_market_cap {
            skipped.push(SkippedTicker {
                ticker: ticker.clone(),
                reason: SkipReason::BelowCapFloor { market_cap },
            });
            continue;
        }

        let series = match history.load(ticker, today) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("Warning: skipping {} ({})", ticker, e);
                skipped.push(SkippedTicker {
                    ticker: ticker.clone(),
                    reason: SkipReason::DataUnavailable {
                        reason: e.to_string(),
                    },
                });
                continue;
            }
        };

        if !signal::holds_near_all_time_high(&series, config.window_months, config.threshold) {
            skipped.push(SkippedTicker {
                ticker: ticker.clone(),
                reason: SkipReason::SignalNotHeld,
            });
            continue;
        }

        results.push(ScreenResult {
            ticker: ticker.clone(),
            market_cap,
        });
    }

    results.sort_by(|a, b| b.market_cap.total_cmp(&a.market_cap));
    results.truncate(config.max_results);

    ScreenReport { results, skipped }
}
