//! Remote data source: the trait seam and the HTTP implementation.

pub mod models;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header;
use tracing::debug;

use crate::auth::AuthSession;
use crate::errors::MarketDataError;
use crate::models::Granularity;

use models::{
    ChartError, ChartResponse, ChartResult, OptionChainResponse, OptionChainResult,
    QuoteSummaryResponse, TimeseriesResponse, TimeseriesResult,
};

const QUERY1_BASE: &str = "https://query1.finance.yahoo.com";
const QUERY2_BASE: &str = "https://query2.finance.yahoo.com";
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Boundary to the remote market-data API.
///
/// The service depends on this trait only; tests substitute a scripted
/// implementation, production uses [`YahooSource`].
#[async_trait]
pub trait RemoteSource: Send + Sync {
    /// Fetch OHLCV history plus dividend/split events for `[start, end)`.
    async fn fetch_chart(
        &self,
        ticker: &str,
        granularity: Granularity,
        start: i64,
        end: i64,
    ) -> Result<ChartResult, MarketDataError>;

    /// Fetch the given fundamentals metrics over `[start, end)`.
    async fn fetch_fundamentals(
        &self,
        ticker: &str,
        metrics: &[&str],
        start: i64,
        end: i64,
    ) -> Result<Vec<TimeseriesResult>, MarketDataError>;

    /// Fetch the given quoteSummary modules as raw JSON sections.
    async fn fetch_quote_summary(
        &self,
        ticker: &str,
        modules: &[&str],
    ) -> Result<Vec<std::collections::BTreeMap<String, serde_json::Value>>, MarketDataError>;

    /// Fetch the option chain for one expiration, or the nearest one when
    /// `expiration` is `None`. The result carries all known expiration dates.
    async fn fetch_option_chain(
        &self,
        ticker: &str,
        expiration: Option<i64>,
    ) -> Result<OptionChainResult, MarketDataError>;
}

/// HTTP implementation of [`RemoteSource`] over the Yahoo Finance API.
pub struct YahooSource {
    client: reqwest::Client,
    session: AuthSession,
}

impl YahooSource {
    pub fn new(session: AuthSession) -> Result<Self, MarketDataError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::USER_AGENT,
            header::HeaderValue::from_str(&session.user_agent)
                .map_err(|e| MarketDataError::Parse(format!("Invalid user agent: {}", e)))?,
        );
        headers.insert(
            header::COOKIE,
            header::HeaderValue::from_str(&session.cookie)
                .map_err(|e| MarketDataError::Parse(format!("Invalid cookie: {}", e)))?,
        );
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .default_headers(headers)
            .build()
            .map_err(|e| MarketDataError::Parse(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, session })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
    ) -> Result<T, MarketDataError> {
        debug!("GET {}", url);
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(MarketDataError::Remote {
                status: status.as_u16(),
                message,
            });
        }
        let body = response.text().await?;
        serde_json::from_str(&body)
            .map_err(|e| MarketDataError::Parse(format!("Malformed response: {}", e)))
    }
}

fn envelope_error(error: Option<ChartError>, ticker: &str) -> MarketDataError {
    match error {
        Some(e) => {
            let code = e.code.unwrap_or_default();
            if code == "Not Found" {
                MarketDataError::NotFound {
                    entity: ticker.to_string(),
                }
            } else {
                MarketDataError::Remote {
                    status: 200,
                    message: format!("{}: {}", code, e.description.unwrap_or_default()),
                }
            }
        }
        None => MarketDataError::NotFound {
            entity: ticker.to_string(),
        },
    }
}

#[async_trait]
impl RemoteSource for YahooSource {
    async fn fetch_chart(
        &self,
        ticker: &str,
        granularity: Granularity,
        start: i64,
        end: i64,
    ) -> Result<ChartResult, MarketDataError> {
        let url = format!(
            "{}/v8/finance/chart/{}?period1={}&period2={}&interval={}&events=history%2Cdiv%2Csplits&includeAdjustedClose=true&crumb={}",
            QUERY2_BASE,
            urlencoding::encode(ticker),
            start,
            end,
            granularity.interval_code(),
            urlencoding::encode(&self.session.crumb),
        );
        let parsed: ChartResponse = self.get_json(&url).await?;
        parsed
            .chart
            .result
            .and_then(|mut r| if r.is_empty() { None } else { Some(r.remove(0)) })
            .ok_or_else(|| envelope_error(parsed.chart.error, ticker))
    }

    async fn fetch_fundamentals(
        &self,
        ticker: &str,
        metrics: &[&str],
        start: i64,
        end: i64,
    ) -> Result<Vec<TimeseriesResult>, MarketDataError> {
        let url = format!(
            "{}/ws/fundamentals-timeseries/v1/finance/timeseries/{}?symbol={}&type={}&period1={}&period2={}&crumb={}",
            QUERY1_BASE,
            urlencoding::encode(ticker),
            urlencoding::encode(ticker),
            urlencoding::encode(&metrics.join(",")),
            start,
            end,
            urlencoding::encode(&self.session.crumb),
        );
        let parsed: TimeseriesResponse = self.get_json(&url).await?;
        parsed
            .timeseries
            .result
            .ok_or_else(|| envelope_error(parsed.timeseries.error, ticker))
    }

    async fn fetch_quote_summary(
        &self,
        ticker: &str,
        modules: &[&str],
    ) -> Result<Vec<std::collections::BTreeMap<String, serde_json::Value>>, MarketDataError> {
        let url = format!(
            "{}/v10/finance/quoteSummary/{}?modules={}&crumb={}",
            QUERY2_BASE,
            urlencoding::encode(ticker),
            urlencoding::encode(&modules.join(",")),
            urlencoding::encode(&self.session.crumb),
        );
        let parsed: QuoteSummaryResponse = self.get_json(&url).await?;
        parsed
            .quote_summary
            .result
            .ok_or_else(|| envelope_error(parsed.quote_summary.error, ticker))
    }

    async fn fetch_option_chain(
        &self,
        ticker: &str,
        expiration: Option<i64>,
    ) -> Result<OptionChainResult, MarketDataError> {
        let mut url = format!(
            "{}/v7/finance/options/{}?crumb={}",
            QUERY2_BASE,
            urlencoding::encode(ticker),
            urlencoding::encode(&self.session.crumb),
        );
        if let Some(date) = expiration {
            url.push_str(&format!("&date={}", date));
        }
        let parsed: OptionChainResponse = self.get_json(&url).await?;
        parsed
            .option_chain
            .result
            .and_then(|mut r| if r.is_empty() { None } else { Some(r.remove(0)) })
            .ok_or_else(|| envelope_error(parsed.option_chain.error, ticker))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_error_maps_not_found() {
        let error = envelope_error(
            Some(ChartError {
                code: Some("Not Found".to_string()),
                description: Some("No data found, symbol may be delisted".to_string()),
            }),
            "NOPE",
        );
        assert!(matches!(error, MarketDataError::NotFound { .. }));
    }

    #[test]
    fn test_envelope_error_maps_other_codes_to_remote() {
        let error = envelope_error(
            Some(ChartError {
                code: Some("Unauthorized".to_string()),
                description: Some("Invalid crumb".to_string()),
            }),
            "AAPL",
        );
        match error {
            MarketDataError::Remote { status, message } => {
                assert_eq!(status, 200);
                assert!(message.contains("Invalid crumb"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
