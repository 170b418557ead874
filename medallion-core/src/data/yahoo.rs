//! Yahoo Finance daily bars via the v8 chart endpoint.
//!
//! One request per symbol covers the whole history window. Connection
//! failures, 429 and 5xx responses are retried with a doubling delay, and
//! every outcome is reported to the shared circuit breaker. A payload that no
//! longer has the expected shape is `DataError::ResponseFormatChanged`.

use super::circuit_breaker::CircuitBreaker;
use super::provider::{DataError, DataProvider, DataSource, FetchResult, RawBar};
use chrono::{DateTime, NaiveDate, NaiveTime};
use reqwest::StatusCode;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

const CHART_ENDPOINT: &str = "https://query2.finance.yahoo.com/v8/finance/chart";
const SECONDS_PER_DAY: i64 = 86_400;

// Only the parts of the chart payload the bronze layer keeps.

#[derive(Deserialize)]
struct Envelope {
    chart: Chart,
}

#[derive(Deserialize)]
struct Chart {
    result: Option<Vec<Series>>,
    error: Option<ApiError>,
}

#[derive(Deserialize)]
struct ApiError {
    code: String,
    description: String,
}

#[derive(Deserialize)]
struct Series {
    timestamp: Option<Vec<i64>>,
    indicators: SeriesIndicators,
}

#[derive(Deserialize)]
struct SeriesIndicators {
    #[serde(default)]
    quote: Vec<Quote>,
    #[serde(default)]
    adjclose: Vec<AdjClose>,
}

#[derive(Deserialize)]
struct Quote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<u64>>,
}

#[derive(Deserialize)]
struct AdjClose {
    #[serde(default)]
    adjclose: Vec<Option<f64>>,
}

/// What to do with a response, judged by its status alone.
enum Next {
    Parse,
    /// IP ban: open the breaker and stop.
    Ban,
    Retry(DataError),
    Stop(DataError),
}

fn classify(status: StatusCode, symbol: &str) -> Next {
    match status {
        s if s.is_success() => Next::Parse,
        StatusCode::FORBIDDEN => Next::Ban,
        StatusCode::TOO_MANY_REQUESTS => Next::Retry(DataError::RateLimited),
        StatusCode::UNAUTHORIZED => Next::Stop(DataError::AuthenticationRequired(
            "chart endpoint rejected the request".into(),
        )),
        StatusCode::NOT_FOUND => Next::Stop(DataError::SymbolNotFound {
            symbol: symbol.to_string(),
        }),
        s if s.is_server_error() => Next::Retry(DataError::Other(format!("HTTP {s} for {symbol}"))),
        s => Next::Stop(DataError::Other(format!("HTTP {s} for {symbol}"))),
    }
}

/// Chart URL covering `start` 00:00:00 UTC through `end` 23:59:59 UTC.
fn chart_url(symbol: &str, start: NaiveDate, end: NaiveDate) -> String {
    let period1 = start.and_time(NaiveTime::MIN).and_utc().timestamp();
    let period2 = end.and_time(NaiveTime::MIN).and_utc().timestamp() + SECONDS_PER_DAY - 1;
    format!(
        "{CHART_ENDPOINT}/{symbol}?period1={period1}&period2={period2}\
         &interval=1d&includeAdjustedClose=true"
    )
}

fn at(series: &[Option<f64>], i: usize) -> Option<f64> {
    series.get(i).copied().flatten()
}

/// Turn a decoded payload into bars. A valid symbol with no trading days in
/// range comes back without timestamps and yields no bars.
fn bars_from(symbol: &str, envelope: Envelope) -> Result<Vec<RawBar>, DataError> {
    let Chart { result, error } = envelope.chart;
    let series = match (result.and_then(|r| r.into_iter().next()), error) {
        (Some(series), _) => series,
        (None, Some(err)) if err.code == "Not Found" => {
            return Err(DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            })
        }
        (None, Some(err)) => {
            return Err(DataError::ResponseFormatChanged(format!(
                "{}: {}",
                err.code, err.description
            )))
        }
        (None, None) => {
            return Err(DataError::ResponseFormatChanged(
                "chart has neither result nor error".into(),
            ))
        }
    };

    let Some(timestamps) = series.timestamp else {
        return Ok(Vec::new());
    };
    let quote = series
        .indicators
        .quote
        .into_iter()
        .next()
        .ok_or_else(|| DataError::ResponseFormatChanged(format!("{symbol}: no quote block")))?;
    let adj = series
        .indicators
        .adjclose
        .into_iter()
        .next()
        .map(|a| a.adjclose)
        .unwrap_or_default();

    let mut bars = Vec::with_capacity(timestamps.len());
    for (i, ts) in timestamps.into_iter().enumerate() {
        let prices = [
            at(&quote.open, i),
            at(&quote.high, i),
            at(&quote.low, i),
            at(&quote.close, i),
        ];
        // Market holidays are all-null rows.
        if prices.iter().all(Option::is_none) {
            continue;
        }

        let date = DateTime::from_timestamp(ts, 0)
            .map(|dt| dt.date_naive())
            .ok_or_else(|| DataError::ResponseFormatChanged(format!("bad timestamp {ts}")))?;
        let [open, high, low, close] = prices.map(|p| p.unwrap_or(f64::NAN));

        bars.push(RawBar {
            date,
            open,
            high,
            low,
            close,
            adj_close: at(&adj, i).unwrap_or(f64::NAN),
            volume: quote.volume.get(i).copied().flatten().unwrap_or(0),
        });
    }
    Ok(bars)
}

pub struct YahooProvider {
    client: reqwest::blocking::Client,
    breaker: Arc<CircuitBreaker>,
    max_retries: u32,
    first_delay: Duration,
}

impl YahooProvider {
    pub fn new(breaker: Arc<CircuitBreaker>) -> Result<Self, DataError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("Mozilla/5.0 (X11; Linux x86_64) medallion/0.1")
            .build()
            .map_err(|e| DataError::Other(format!("HTTP client: {e}")))?;

        Ok(Self {
            client,
            breaker,
            max_retries: 3,
            first_delay: Duration::from_millis(500),
        })
    }

    fn request(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<Vec<RawBar>, DataError> {
        let url = chart_url(symbol, start, end);
        let mut delay = self.first_delay;
        let mut last = DataError::Other(format!("no attempt made for {symbol}"));

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                tracing::debug!(%symbol, attempt, delay_ms = delay.as_millis() as u64, "retrying");
                std::thread::sleep(delay);
                delay *= 2;
            }
            if !self.breaker.is_allowed() {
                return Err(DataError::CircuitBreakerTripped);
            }

            let resp = match self.client.get(&url).send() {
                Ok(resp) => resp,
                Err(e) => {
                    let transient = e.is_connect() || e.is_timeout();
                    last = DataError::NetworkUnreachable(e.to_string());
                    if transient {
                        continue;
                    }
                    return Err(last);
                }
            };

            match classify(resp.status(), symbol) {
                Next::Parse => {}
                Next::Ban => {
                    self.breaker.trip();
                    return Err(DataError::CircuitBreakerTripped);
                }
                Next::Retry(e) => {
                    self.breaker.record_failure();
                    last = e;
                    continue;
                }
                Next::Stop(e) => return Err(e),
            }

            let envelope: Envelope = resp
                .json()
                .map_err(|e| DataError::ResponseFormatChanged(format!("{symbol}: {e}")))?;
            let bars = bars_from(symbol, envelope)?;
            self.breaker.record_success();
            return Ok(bars);
        }

        Err(last)
    }
}

impl DataProvider for YahooProvider {
    fn name(&self) -> &str {
        "yahoo_finance"
    }

    fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<FetchResult, DataError> {
        Ok(FetchResult {
            symbol: symbol.to_string(),
            bars: self.request(symbol, start, end)?,
            source: DataSource::YahooFinance,
        })
    }

    fn is_available(&self) -> bool {
        self.breaker.is_allowed()
    }
}
