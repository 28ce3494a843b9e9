//! Market-data provider port trait.

use crate::domain::bar::DailyBar;
use crate::domain::error::ScreenerError;
use crate::domain::snapshot::TickerSnapshot;
use chrono::NaiveDate;

pub trait MarketDataPort {
    /// Daily bars for `ticker` within `[start, end]`, ascending by date.
    ///
    /// A range covering only non-trading days yields `Ok` with an empty
    /// vector, not an error.
    fn fetch_daily(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyBar>, ScreenerError>;

    /// Current snapshot for `ticker`, including the market capitalization
    /// when the provider supplies one.
    fn fetch_snapshot(&self, ticker: &str) -> Result<TickerSnapshot, ScreenerError>;
}
