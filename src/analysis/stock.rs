use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AnalysisError;
use crate::indicators::{compute_indicator_set, IndicatorParams, IndicatorSet};
use crate::market_data::{Interval, PriceDataProvider, Period};
use crate::models::market_data::OhlcvSeries;
use crate::utils::{default_anchor_date, logging};

/// 시세 분석 요청
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockRequest {
    pub ticker: String,
    pub period: Period,
    pub interval: Interval,
    /// 앵커 VWAP 시작 날짜 (시계열 시간대 자정 기준)
    pub anchor_date: Option<NaiveDate>,
    /// `anchor_date`가 없을 때 마지막 봉 날짜에서 거슬러 올라갈 일수
    pub anchor_lookback_days: Option<i64>,
    pub sma_windows: Vec<usize>,
    pub ema_spans: Vec<usize>,
}

impl StockRequest {
    pub fn new(ticker: impl Into<String>, period: Period, interval: Interval) -> Self {
        let defaults = IndicatorParams::default();
        StockRequest {
            ticker: ticker.into(),
            period,
            interval,
            anchor_date: None,
            anchor_lookback_days: None,
            sma_windows: defaults.sma_windows,
            ema_spans: defaults.ema_spans,
        }
    }

    pub fn with_anchor_date(mut self, date: NaiveDate) -> Self {
        self.anchor_date = Some(date);
        self
    }

    pub fn with_anchor_lookback(mut self, days: i64) -> Self {
        self.anchor_lookback_days = Some(days);
        self
    }

    pub fn with_averages(mut self, sma_windows: Vec<usize>, ema_spans: Vec<usize>) -> Self {
        self.sma_windows = sma_windows;
        self.ema_spans = ema_spans;
        self
    }

    /// 티커를 대문자로 정규화
    pub fn normalized_ticker(&self) -> Result<String, AnalysisError> {
        let ticker = self.ticker.trim().to_uppercase();
        if ticker.is_empty() {
            return Err(AnalysisError::InvalidParameter("ticker must not be empty".into()));
        }
        if !ticker.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^' | '=')) {
            return Err(AnalysisError::InvalidParameter(format!("invalid ticker: {}", ticker)));
        }
        Ok(ticker)
    }
}

/// 시계열과 파생 지표를 묶은 분석 결과
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockAnalysis {
    pub id: Uuid,
    pub ticker: String,
    pub period: Period,
    pub interval: Interval,
    pub anchor: Option<DateTime<Utc>>,
    pub series: OhlcvSeries,
    pub indicators: IndicatorSet,
}

impl StockAnalysis {
    /// 차트에 그려진 데이터의 날짜 범위
    pub fn date_range(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        self.series.date_range()
    }
}

/// 시세 조회 → 빈 결과 확인 → 지표 계산
pub async fn analyze_stock(
    provider: &dyn PriceDataProvider,
    request: &StockRequest,
) -> Result<StockAnalysis, AnalysisError> {
    let ticker = request.normalized_ticker()?;
    let id = Uuid::new_v4();
    let request_id = id.to_string();
    logging::log_analysis_start(&request_id, &ticker, request.period.as_str(), request.interval.as_str());

    let series = provider
        .fetch_history(&ticker, request.period, request.interval)
        .await?;

    if series.is_empty() {
        return Err(AnalysisError::EmptyInput {
            ticker,
            period: request.period.to_string(),
            interval: request.interval.to_string(),
        });
    }

    let anchor_date = match (request.anchor_date, request.anchor_lookback_days) {
        (Some(date), _) => Some(date),
        (None, Some(days)) => Some(default_anchor_date(series.last_local_date(), days)?),
        (None, None) => None,
    };
    let anchor = anchor_date.map(|date| series.localize_anchor(date));
    let params = IndicatorParams {
        sma_windows: request.sma_windows.clone(),
        ema_spans: request.ema_spans.clone(),
        anchor,
    };
    let indicators = compute_indicator_set(&series, &params)?;

    logging::log_analysis_end(&request_id, &ticker, series.len());

    Ok(StockAnalysis {
        id,
        ticker,
        period: request.period,
        interval: request.interval,
        anchor,
        series,
        indicators,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_ticker() {
        let req = StockRequest::new(" tsla ", Period::OneYear, Interval::OneDay);
        assert_eq!(req.normalized_ticker().unwrap(), "TSLA");

        let req = StockRequest::new("brk-b", Period::OneYear, Interval::OneDay);
        assert_eq!(req.normalized_ticker().unwrap(), "BRK-B");

        let req = StockRequest::new("  ", Period::OneYear, Interval::OneDay);
        assert!(matches!(req.normalized_ticker(), Err(AnalysisError::InvalidParameter(_))));

        let req = StockRequest::new("TS LA/../", Period::OneYear, Interval::OneDay);
        assert!(req.normalized_ticker().is_err());
    }

    #[test]
    fn test_request_defaults() {
        let req = StockRequest::new("TSLA", Period::default(), Interval::default());
        assert_eq!(req.sma_windows, vec![20, 150]);
        assert_eq!(req.ema_spans, vec![20, 150]);
        assert!(req.anchor_date.is_none());
        assert!(req.anchor_lookback_days.is_none());
    }
}
