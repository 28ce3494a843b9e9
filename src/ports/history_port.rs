//! Price-history port trait.

use crate::domain::error::ScreenerError;
use crate::domain::series::PriceSeries;
use chrono::NaiveDate;

pub trait HistoryPort {
    /// Complete daily series for `ticker`, current through `today` as far as
    /// the data source allows.
    fn load(&self, ticker: &str, today: NaiveDate) -> Result<PriceSeries, ScreenerError>;
}
