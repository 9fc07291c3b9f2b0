/**
* filename : yahoo
* author : HAMA
* date: 2025. 5. 11.
* description: Yahoo Finance chart API 시세 제공자
**/

use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use reqwest::Client;
use serde::Deserialize;

use crate::config::PriceApiConfig;
use crate::error::AnalysisError;
use crate::market_data::provider::PriceDataProvider;
use crate::market_data::timeframe::{Interval, Period};
use crate::models::market_data::{Bar, OhlcvSeries};

const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

pub struct YahooProvider {
    client: Client,
    base_url: String,
}

impl YahooProvider {
    /// Create a provider from the `price_api` config section
    pub fn new(config: &PriceApiConfig) -> Result<Self, AnalysisError> {
        let mut builder = Client::builder().user_agent(USER_AGENT);
        if let Some(ms) = config.timeout_ms {
            builder = builder.timeout(Duration::from_millis(ms));
        }
        let client = builder
            .build()
            .map_err(|e| AnalysisError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl PriceDataProvider for YahooProvider {
    async fn fetch_history(
        &self,
        ticker: &str,
        period: Period,
        interval: Interval,
    ) -> Result<OhlcvSeries, AnalysisError> {
        let url = format!("{}/v8/finance/chart/{}", self.base_url, ticker);
        log::debug!("Yahoo 요청: {} range={} interval={}", url, period, interval);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("range", period.as_str()),
                ("interval", interval.as_str()),
                ("includePrePost", "false"),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        // 존재하지 않는 티커는 404와 함께 오류 본문을 준다
        let parsed: ChartResponse = serde_json::from_str(&body).map_err(|e| {
            AnalysisError::ProviderError(format!("HTTP {}: unreadable chart response: {}", status, e))
        })?;

        parse_chart(ticker, parsed)
    }
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    symbol: Option<String>,
    #[serde(default)]
    gmtoffset: i32,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<Quote>,
}

#[derive(Debug, Default, Deserialize)]
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
    volume: Vec<Option<f64>>,
}

fn parse_chart(ticker: &str, response: ChartResponse) -> Result<OhlcvSeries, AnalysisError> {
    if let Some(err) = response.chart.error {
        if err.code.eq_ignore_ascii_case("Not Found") {
            log::warn!("Yahoo: {} 데이터 없음 ({})", ticker, err.description);
            return OhlcvSeries::utc(ticker, Vec::new());
        }
        return Err(AnalysisError::ProviderError(format!("{}: {}", err.code, err.description)));
    }

    let result = match response.chart.result.and_then(|mut r| r.pop()) {
        Some(result) => result,
        None => return OhlcvSeries::utc(ticker, Vec::new()),
    };

    let symbol = result.meta.symbol.unwrap_or_else(|| ticker.to_string());
    let empty = Quote::default();
    let quote = result.indicators.quote.first().unwrap_or(&empty);

    let mut bars: Vec<Bar> = Vec::with_capacity(result.timestamp.len());
    let mut skipped = 0usize;
    for (i, &ts) in result.timestamp.iter().enumerate() {
        let row = (
            quote.open.get(i).copied().flatten(),
            quote.high.get(i).copied().flatten(),
            quote.low.get(i).copied().flatten(),
            quote.close.get(i).copied().flatten(),
            quote.volume.get(i).copied().flatten(),
        );
        let timestamp = Utc.timestamp_opt(ts, 0).single();

        match (timestamp, row) {
            (Some(timestamp), (Some(open), Some(high), Some(low), Some(close), Some(volume))) => {
                // 장중 마지막 봉이 앞 봉과 같은 시각으로 중복될 수 있다
                if bars.last().map_or(false, |last| timestamp <= last.timestamp) {
                    skipped += 1;
                    continue;
                }
                bars.push(Bar::new(timestamp, open, high, low, close, volume));
            }
            _ => skipped += 1,
        }
    }

    if skipped > 0 {
        log::debug!("Yahoo: {} 불완전/중복 행 {}개 제외", symbol, skipped);
    }

    OhlcvSeries::new(symbol, result.meta.gmtoffset, bars)
}
