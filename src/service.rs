//! Public facade: orchestrates gap detection, fetching, merging, caching
//! and staleness-based refresh across all data domains.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use futures::future::join_all;
use serde_json::Value;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use crate::errors::MarketDataError;
use crate::models::{
    display_name, FundamentalsPoint, FundamentalsRecord, GapRequest, Granularity, OptionContract,
    OptionSide, ProfileRecord, TimeSeriesRecord, LAST_UPDATE_FORMAT, METRIC_TYPES, PROFILE_MODULES,
};
use crate::remote::models::{
    ChartResult, OptionChainResult, OptionContractRaw, RawFundamentalsPoint, UnderlyingQuote,
};
use crate::remote::RemoteSource;
use crate::series::{detect_gaps, merge, normalize};
use crate::store::{DocumentStore, FundamentalsStore, OptionsStore, ProfileStore, SeriesStore};
use crate::table::SeriesTable;

/// Tuning knobs for the facade.
#[derive(Debug, Clone)]
pub struct ServiceOptions {
    /// Concurrent ticker syncs in a multi-ticker request.
    pub max_concurrency: usize,
    /// Extra attempts per gap fetch on retryable failures.
    pub fetch_retries: u32,
    pub fundamentals_max_age: Duration,
    pub profile_max_age: Duration,
    pub options_max_age: Duration,
}

impl Default for ServiceOptions {
    fn default() -> Self {
        Self {
            max_concurrency: 4,
            fetch_retries: 2,
            fundamentals_max_age: Duration::from_secs(7 * 24 * 60 * 60),
            profile_max_age: Duration::from_secs(24 * 60 * 60),
            options_max_age: Duration::from_secs(60 * 60),
        }
    }
}

/// Entry point for all queries.
///
/// Historical series go through incremental gap-fill sync; fundamentals,
/// profile and option-chain paths are fetch-if-stale over their caches.
pub struct MarketDataService {
    remote: Arc<dyn RemoteSource>,
    series: SeriesStore,
    fundamentals: FundamentalsStore,
    profiles: ProfileStore,
    option_chains: OptionsStore,
    options: ServiceOptions,
}

impl MarketDataService {
    pub fn new(
        remote: Arc<dyn RemoteSource>,
        store: Arc<dyn DocumentStore>,
        options: ServiceOptions,
    ) -> Self {
        Self {
            remote,
            series: SeriesStore::new(store.clone()),
            fundamentals: FundamentalsStore::new(store.clone()),
            profiles: ProfileStore::new(store.clone()),
            option_chains: OptionsStore::new(store),
            options,
        }
    }

    /// Historical OHLCV for one or more tickers over `[start, end]`, both
    /// dates inclusive, outer-joined on the session axis.
    ///
    /// A single-ticker request propagates any failure. With several tickers
    /// a failing one is logged and omitted; partial results win over total
    /// failure.
    pub async fn get_series(
        &self,
        tickers: &[&str],
        granularity: Granularity,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<SeriesTable, MarketDataError> {
        if tickers.is_empty() {
            return Err(MarketDataError::InvalidRange(
                "No tickers requested".to_string(),
            ));
        }
        if start > end {
            return Err(MarketDataError::InvalidRange(format!(
                "Start date {} is after end date {}",
                start, end
            )));
        }
        let start_ts = day_start(start);
        let end_ts = day_end(end);

        let semaphore = Arc::new(Semaphore::new(self.options.max_concurrency.max(1)));
        let outcomes = join_all(tickers.iter().map(|&ticker| {
            let semaphore = semaphore.clone();
            async move {
                let _permit = semaphore.acquire().await.expect("semaphore closed");
                (ticker, self.sync_series(ticker, granularity, start_ts, end_ts).await)
            }
        }))
        .await;

        let single = tickers.len() == 1;
        let mut records = Vec::new();
        for (ticker, outcome) in outcomes {
            match outcome {
                Ok(record) => records.push(record),
                Err(error) if single => return Err(error),
                Err(error) => warn!("Skipping {} in batch request: {}", ticker, error),
            }
        }

        Ok(SeriesTable::from_records(records.iter().map(|record| {
            let rows = record.rows_in_range(start_ts, end_ts);
            (record, rows)
        })))
    }

    /// Bring the cached record for (ticker, granularity) up to date with the
    /// requested range and return it.
    async fn sync_series(
        &self,
        ticker: &str,
        granularity: Granularity,
        start_ts: i64,
        end_ts: i64,
    ) -> Result<TimeSeriesRecord, MarketDataError> {
        let mut record = self.series.get(ticker, granularity).await?;
        let gaps = detect_gaps(ticker, granularity, record.as_ref(), start_ts, end_ts);
        if gaps.is_empty() {
            debug!("{} {} fully cached", ticker, granularity);
            return record.ok_or_else(|| MarketDataError::NotFound {
                entity: format!("{} {} history", ticker, granularity),
            });
        }

        let requested_at = Utc::now().timestamp();
        for gap in gaps {
            debug!(
                "Filling {:?} gap for {} {} [{}, {}]",
                gap.kind, gap.ticker, gap.granularity, gap.start, gap.end
            );
            let chart = self.fetch_gap(&gap).await?;
            let normalized = normalize(&gap.ticker, gap.granularity, chart, gap.start, gap.end);
            record = Some(merge(record, normalized, gap.kind, requested_at));
        }
        if let Some(record) = record.as_ref() {
            self.series.put(record).await?;
        }
        // Read back what was stored rather than trusting the in-memory copy.
        self.series
            .get(ticker, granularity)
            .await?
            .ok_or_else(|| MarketDataError::Store(format!("Record for {} missing after write", ticker)))
    }

    async fn fetch_gap(&self, gap: &GapRequest) -> Result<ChartResult, MarketDataError> {
        let mut attempt = 0;
        loop {
            match self
                .remote
                .fetch_chart(&gap.ticker, gap.granularity, gap.start, gap.end)
                .await
            {
                Ok(result) => return Ok(result),
                Err(error) if attempt < self.options.fetch_retries && error.is_retryable() => {
                    attempt += 1;
                    warn!(
                        "Retrying fetch for {} (attempt {}/{}): {}",
                        gap.ticker, attempt, self.options.fetch_retries, error
                    );
                    tokio::time::sleep(Duration::from_millis(250 * u64::from(attempt))).await;
                }
                Err(error) => return Err(error),
            }
        }
    }

    /// Fundamentals for one ticker, refreshed when the cached document is
    /// older than the configured maximum age.
    pub async fn get_fundamentals(
        &self,
        ticker: &str,
    ) -> Result<FundamentalsRecord, MarketDataError> {
        let now = Utc::now();
        if let Some(cached) = self.fundamentals.get(ticker).await? {
            if is_fresh(&cached.last_update, now, self.options.fundamentals_max_age) {
                debug!("Fundamentals for {} fresh in cache", ticker);
                return Ok(cached);
            }
        }
        self.refresh_fundamentals(ticker, now).await
    }

    /// One fundamentals metric, addressed by camelCase or display name.
    /// A metric absent for this instrument is an expected condition: it is
    /// logged and returned as `None`, never as an error.
    pub async fn get_fundamental(
        &self,
        ticker: &str,
        metric: &str,
    ) -> Result<Option<Vec<FundamentalsPoint>>, MarketDataError> {
        let record = self.get_fundamentals(ticker).await?;
        let points = record
            .metrics
            .get(metric)
            .or_else(|| record.metrics.get(&display_name(metric)));
        match points {
            Some(points) => Ok(Some(points.clone())),
            None => {
                warn!("Metric {} absent for {}", metric, ticker);
                Ok(None)
            }
        }
    }

    async fn refresh_fundamentals(
        &self,
        ticker: &str,
        now: DateTime<Utc>,
    ) -> Result<FundamentalsRecord, MarketDataError> {
        let results = self
            .remote
            .fetch_fundamentals(ticker, METRIC_TYPES, 0, now.timestamp())
            .await?;

        let mut metrics = BTreeMap::new();
        for result in results {
            let name = match result.meta.metric_types.first() {
                Some(name) => name.clone(),
                None => continue,
            };
            let raw = match result.data.get(name.as_str()) {
                Some(raw) => raw.clone(),
                None => continue,
            };
            // Point arrays carry nulls for periods without a report.
            let points: Vec<Option<RawFundamentalsPoint>> = serde_json::from_value(raw)
                .map_err(|e| {
                    MarketDataError::Parse(format!("Malformed points for {}: {}", name, e))
                })?;
            let points: Vec<FundamentalsPoint> = points
                .into_iter()
                .flatten()
                .map(|point| FundamentalsPoint {
                    data_id: point.data_id,
                    as_of_date: point.as_of_date,
                    period_type: point.period_type,
                    currency: point.currency_code,
                    value: point.reported_value.as_ref().and_then(|v| v.raw),
                    formatted_value: point.reported_value.and_then(|v| v.fmt),
                })
                .collect();
            metrics.insert(display_name(&name), points);
        }

        let record = FundamentalsRecord {
            ticker: ticker.to_string(),
            last_update: now.format(LAST_UPDATE_FORMAT).to_string(),
            metrics,
        };
        self.fundamentals.put(&record).await?;
        Ok(record)
    }

    /// Profile sections for one ticker, refreshed when stale.
    pub async fn get_profile(&self, ticker: &str) -> Result<ProfileRecord, MarketDataError> {
        let now = Utc::now();
        if let Some(cached) = self.profiles.get(ticker).await? {
            if is_fresh(&cached.last_update, now, self.options.profile_max_age) {
                debug!("Profile for {} fresh in cache", ticker);
                return Ok(cached);
            }
        }
        self.refresh_profile(ticker, now).await
    }

    /// One profile section, addressed by camelCase or display name.
    pub async fn get_profile_section(
        &self,
        ticker: &str,
        section: &str,
    ) -> Result<Option<Value>, MarketDataError> {
        let record = self.get_profile(ticker).await?;
        let value = record
            .sections
            .get(section)
            .or_else(|| record.sections.get(&display_name(section)));
        match value {
            Some(value) => Ok(Some(value.clone())),
            None => {
                warn!("Profile section {} absent for {}", section, ticker);
                Ok(None)
            }
        }
    }

    async fn refresh_profile(
        &self,
        ticker: &str,
        now: DateTime<Utc>,
    ) -> Result<ProfileRecord, MarketDataError> {
        let results = self
            .remote
            .fetch_quote_summary(ticker, PROFILE_MODULES)
            .await?;
        let mut sections = BTreeMap::new();
        if let Some(modules) = results.into_iter().next() {
            for (module, value) in modules {
                if !value.is_null() {
                    sections.insert(display_name(&module), value);
                }
            }
        }
        let record = ProfileRecord {
            ticker: ticker.to_string(),
            last_update: now.format(LAST_UPDATE_FORMAT).to_string(),
            sections,
        };
        self.profiles.put(&record).await?;
        Ok(record)
    }

    /// Option chain for one expiration (the nearest when `None`).
    ///
    /// The cached chain is served while fresh; otherwise the whole
    /// per-ticker collection is rebuilt from a new fetch. An explicit
    /// expiration always refetches.
    pub async fn get_option_chain(
        &self,
        ticker: &str,
        expiration: Option<i64>,
    ) -> Result<Vec<OptionContract>, MarketDataError> {
        let now = Utc::now();
        if expiration.is_none() {
            let cached = self.option_chains.get(ticker).await?;
            let fresh = cached.first().is_some_and(|contract| {
                contract
                    .last_update
                    .as_deref()
                    .is_some_and(|stamp| is_fresh(stamp, now, self.options.options_max_age))
            });
            if fresh {
                debug!("Option chain for {} fresh in cache", ticker);
                return Ok(cached);
            }
        }

        let chain = self.remote.fetch_option_chain(ticker, expiration).await?;
        let stamp = now.format(LAST_UPDATE_FORMAT).to_string();
        let contracts = flatten_chain(ticker, chain, &stamp);
        self.option_chains.replace_all(ticker, &contracts).await?;
        Ok(contracts)
    }

    /// All known expiration dates for a ticker's option chain.
    pub async fn get_option_expirations(
        &self,
        ticker: &str,
    ) -> Result<Vec<i64>, MarketDataError> {
        let chain = self.remote.fetch_option_chain(ticker, None).await?;
        Ok(chain.expiration_dates)
    }
}

/// Midnight UTC of `date`, in epoch seconds.
fn day_start(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp()
}

/// Last second of `date`, making date ranges inclusive of the whole end day.
fn day_end(date: NaiveDate) -> i64 {
    day_start(date) + 86_399
}

fn is_fresh(last_update: &str, now: DateTime<Utc>, max_age: Duration) -> bool {
    match NaiveDateTime::parse_from_str(last_update, LAST_UPDATE_FORMAT) {
        Ok(stamp) => now
            .signed_duration_since(stamp.and_utc())
            .to_std()
            .is_ok_and(|age| age <= max_age),
        Err(_) => false,
    }
}

fn flatten_chain(ticker: &str, chain: OptionChainResult, stamp: &str) -> Vec<OptionContract> {
    let quote = chain.quote.unwrap_or_default();
    let mut contracts = Vec::new();
    for block in chain.options {
        for raw in block.calls {
            contracts.push(contract_from_raw(ticker, raw, OptionSide::Call, &quote, stamp));
        }
        for raw in block.puts {
            contracts.push(contract_from_raw(ticker, raw, OptionSide::Put, &quote, stamp));
        }
    }
    contracts
}

fn contract_from_raw(
    ticker: &str,
    raw: OptionContractRaw,
    side: OptionSide,
    quote: &UnderlyingQuote,
    stamp: &str,
) -> OptionContract {
    let moneyness = match (quote.regular_market_price, raw.strike) {
        (Some(price), Some(strike)) if strike != 0.0 => Some(price / strike),
        _ => None,
    };
    OptionContract {
        contract_symbol: raw.contract_symbol,
        side: Some(side),
        strike: raw.strike,
        currency: raw.currency,
        last_price: raw.last_price,
        change: raw.change,
        percent_change: raw.percent_change,
        volume: raw.volume,
        open_interest: raw.open_interest,
        bid: raw.bid,
        ask: raw.ask,
        contract_size: raw.contract_size,
        expiration: raw.expiration,
        last_trade_date: raw.last_trade_date,
        implied_volatility: raw.implied_volatility,
        in_the_money: raw.in_the_money,
        moneyness,
        underlying_name: quote.long_name.clone().or_else(|| quote.short_name.clone()),
        underlying_ticker: quote.symbol.clone().or_else(|| Some(ticker.to_string())),
        underlying_region: quote.region.clone(),
        underlying_price: quote.regular_market_price,
        underlying_currency: quote.currency.clone(),
        underlying_exchange: quote.full_exchange_name.clone(),
        underlying_volume: quote.regular_market_volume,
        underlying_open: quote.regular_market_open,
        underlying_high: quote.regular_market_day_high,
        underlying_low: quote.regular_market_day_low,
        underlying_type: quote.quote_type.clone(),
        underlying_quote_source: quote.quote_source_name.clone(),
        underlying_dividend_yield: quote.dividend_yield,
        last_update: Some(stamp.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_bounds_inclusive() {
        let date = "2020-01-01".parse::<NaiveDate>().unwrap();
        assert_eq!(day_start(date), 1_577_836_800);
        assert_eq!(day_end(date), 1_577_836_800 + 86_399);
    }

    #[test]
    fn test_is_fresh() {
        let now = DateTime::parse_from_rfc3339("2024-01-15T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let max_age = Duration::from_secs(60 * 60);
        assert!(is_fresh("2024-01-15 11:30:00", now, max_age));
        assert!(!is_fresh("2024-01-15 10:30:00", now, max_age));
        assert!(!is_fresh("not a timestamp", now, max_age));
    }

    #[test]
    fn test_flatten_chain_computes_moneyness() {
        let chain = OptionChainResult {
            quote: Some(UnderlyingQuote {
                symbol: Some("AAPL".to_string()),
                regular_market_price: Some(190.0),
                ..UnderlyingQuote::default()
            }),
            options: vec![crate::remote::models::OptionsBlock {
                expiration_date: Some(1_705_622_400),
                calls: vec![OptionContractRaw {
                    contract_symbol: Some("AAPL240119C00190000".to_string()),
                    strike: Some(190.0),
                    ..OptionContractRaw::default()
                }],
                puts: vec![OptionContractRaw {
                    contract_symbol: Some("AAPL240119P00200000".to_string()),
                    strike: Some(200.0),
                    ..OptionContractRaw::default()
                }],
            }],
            ..OptionChainResult::default()
        };
        let contracts = flatten_chain("AAPL", chain, "2024-01-15 12:00:00");
        assert_eq!(contracts.len(), 2);
        assert_eq!(contracts[0].side, Some(OptionSide::Call));
        assert_eq!(contracts[0].moneyness, Some(1.0));
        assert_eq!(contracts[1].side, Some(OptionSide::Put));
        assert_eq!(contracts[1].moneyness, Some(190.0 / 200.0));
        assert_eq!(contracts[1].underlying_ticker.as_deref(), Some("AAPL"));
    }
}
