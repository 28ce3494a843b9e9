//! Near-all-time-high persistence signal.
//!
//! A ticker passes when every close in the trailing window stays at or above
//! `threshold` of the all-time high, and that high was itself set inside the
//! window. Proximity to a peak reached years ago does not count.

use crate::domain::series::PriceSeries;
use chrono::{Duration, NaiveDate};

pub const DEFAULT_WINDOW_MONTHS: u32 = 3;
pub const DEFAULT_THRESHOLD: f64 = 0.95;

/// Everything behind a single signal decision.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalDetail {
    pub window_start: NaiveDate,
    pub all_time_high: f64,
    pub all_time_high_date: NaiveDate,
    pub recent_min: f64,
    pub holds: bool,
}

/// Evaluate the signal over `series`, returning the numbers behind the
/// decision. `None` when the series is empty or no bar falls inside the
/// window.
///
/// The window reaches `30 * months` calendar days back from the last bar, an
/// intentional fixed-day approximation of months. When several dates share
/// the maximum close, the earliest one is the all-time-high date.
pub fn evaluate(series: &PriceSeries, months: u32, threshold: f64) -> Option<SignalDetail> {
    let bars = series.bars();
    let last = bars.last()?;
    let window_start = last.date - Duration::days(30 * i64::from(months));

    let mut all_time_high = f64::NEG_INFINITY;
    let mut all_time_high_date = last.date;
    for bar in bars {
        if bar.close > all_time_high {
            all_time_high = bar.close;
            all_time_high_date = bar.date;
        }
    }

    let mut recent_min = f64::INFINITY;
    let mut in_window = false;
    for bar in bars.iter().filter(|b| b.date >= window_start) {
        in_window = true;
        if bar.close < recent_min {
            recent_min = bar.close;
        }
    }
    if !in_window {
        return None;
    }

    let holds = all_time_high_date >= window_start && recent_min >= threshold * all_time_high;
    Some(SignalDetail {
        window_start,
        all_time_high,
        all_time_high_date,
        recent_min,
        holds,
    })
}

/// Whether `series` has held within `threshold` of its all-time high for the
/// trailing `months`-month window.
pub fn holds_near_all_time_high(series: &PriceSeries, months: u32, threshold: f64) -> bool {
    evaluate(series, months, threshold).is_some_and(|d| d.holds)
}
