//! Yahoo Finance market-data adapter.
//!
//! Daily history comes from the v8 chart API, capitalization snapshots from
//! the v10 quoteSummary API. Yahoo has no official API and both endpoints
//! are subject to unannounced format changes.

use crate::domain::bar::DailyBar;
use crate::domain::error::ScreenerError;
use crate::domain::snapshot::TickerSnapshot;
use crate::ports::market_data_port::MarketDataPort;
use chrono::NaiveDate;
use serde::Deserialize;
use std::time::Duration;

const BASE_URL: &str = "https://query2.finance.yahoo.com";

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
}

#[derive(Debug, Deserialize, Default)]
struct QuoteData {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<i64>>,
}

#[derive(Debug, Deserialize)]
struct QuoteSummaryResponse {
    #[serde(rename = "quoteSummary")]
    quote_summary: QuoteSummaryResult,
}

#[derive(Debug, Deserialize)]
struct QuoteSummaryResult {
    result: Option<Vec<SummaryModules>>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct SummaryModules {
    price: Option<PriceModule>,
}

#[derive(Debug, Deserialize)]
struct PriceModule {
    #[serde(rename = "marketCap")]
    market_cap: Option<RawValue>,
}

#[derive(Debug, Deserialize)]
struct RawValue {
    raw: Option<f64>,
}

pub struct YahooAdapter {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl YahooAdapter {
    pub fn new() -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()
            .expect("failed to build HTTP client");

        Self {
            client,
            base_url: BASE_URL.to_string(),
        }
    }

    fn chart_url(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> String {
        let start_ts = start.and_hms_opt(0, 0, 0).unwrap().and_utc().timestamp();
        let end_ts = end.and_hms_opt(23, 59, 59).unwrap().and_utc().timestamp();
        format!(
            "{base}/v8/finance/chart/{ticker}?period1={start_ts}&period2={end_ts}&interval=1d",
            base = self.base_url,
        )
    }

    fn summary_url(&self, ticker: &str) -> String {
        format!(
            "{base}/v10/finance/quoteSummary/{ticker}?modules=price",
            base = self.base_url,
        )
    }

    fn get_json<T>(&self, ticker: &str, url: &str) -> Result<T, ScreenerError>
    where
        T: serde::de::DeserializeOwned,
    {
        let resp = self
            .client
            .get(url)
            .send()
            .map_err(|e| provider_error(ticker, e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(provider_error(ticker, format!("HTTP {status}")));
        }

        resp.json()
            .map_err(|e| provider_error(ticker, format!("malformed response: {e}")))
    }

    fn parse_chart(ticker: &str, resp: ChartResponse) -> Result<Vec<DailyBar>, ScreenerError> {
        let result = match resp.chart.result {
            Some(r) => r,
            None => return Err(provider_error(ticker, api_error_reason(resp.chart.error))),
        };
        let data = result
            .into_iter()
            .next()
            .ok_or_else(|| provider_error(ticker, "chart result array is empty".to_string()))?;

        // A range with no trading days comes back without timestamps.
        let timestamps = data.timestamp.unwrap_or_default();
        let quote = data.indicators.quote.into_iter().next().unwrap_or_default();

        let mut bars = Vec::with_capacity(timestamps.len());
        for (i, &ts) in timestamps.iter().enumerate() {
            let date = chrono::DateTime::from_timestamp(ts, 0)
                .map(|dt| dt.naive_utc().date())
                .ok_or_else(|| provider_error(ticker, format!("invalid timestamp: {ts}")))?;

            // Null closes mark non-trading placeholders; a bar without a
            // close is useless downstream either way.
            let Some(close) = quote.close.get(i).copied().flatten() else {
                continue;
            };

            bars.push(DailyBar {
                date,
                open: quote.open.get(i).copied().flatten().unwrap_or(close),
                high: quote.high.get(i).copied().flatten().unwrap_or(close),
                low: quote.low.get(i).copied().flatten().unwrap_or(close),
                close,
                volume: quote.volume.get(i).copied().flatten().unwrap_or(0),
            });
        }

        Ok(bars)
    }

    fn parse_summary(
        ticker: &str,
        resp: QuoteSummaryResponse,
    ) -> Result<TickerSnapshot, ScreenerError> {
        let result = match resp.quote_summary.result {
            Some(r) => r,
            None => {
                return Err(provider_error(
                    ticker,
                    api_error_reason(resp.quote_summary.error),
                ));
            }
        };
        let modules = result
            .into_iter()
            .next()
            .ok_or_else(|| provider_error(ticker, "quoteSummary result array is empty".to_string()))?;

        let market_cap = modules
            .price
            .and_then(|p| p.market_cap)
            .and_then(|v| v.raw);

        Ok(TickerSnapshot { market_cap })
    }
}

impl Default for YahooAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl MarketDataPort for YahooAdapter {
    fn fetch_daily(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyBar>, ScreenerError> {
        let url = self.chart_url(ticker, start, end);
        let chart: ChartResponse = self.get_json(ticker, &url)?;
        Self::parse_chart(ticker, chart)
    }

    fn fetch_snapshot(&self, ticker: &str) -> Result<TickerSnapshot, ScreenerError> {
        let url = self.summary_url(ticker);
        let summary: QuoteSummaryResponse = self.get_json(ticker, &url)?;
        Self::parse_summary(ticker, summary)
    }
}

fn provider_error(ticker: &str, reason: String) -> ScreenerError {
    ScreenerError::Provider {
        ticker: ticker.to_string(),
        reason,
    }
}

fn api_error_reason(error: Option<ApiError>) -> String {
    match error {
        Some(err) => format!("{}: {}", err.code, err.description),
        None => "empty result with no error".to_string(),
    }
}
