//! Provider snapshot for a ticker.

/// Point-in-time information from the market-data provider.
///
/// Providers omit the capitalization for some instruments; the cap filter
/// treats an absent value as zero rather than an error.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickerSnapshot {
    pub market_cap: Option<f64>,
}

impl TickerSnapshot {
    pub fn market_cap_or_zero(&self) -> f64 {
        self.market_cap.unwrap_or(0.0)
    }
}
