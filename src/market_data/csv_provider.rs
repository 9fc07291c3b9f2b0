use std::path::PathBuf;

use async_trait::async_trait;

use crate::error::AnalysisError;
use crate::market_data::provider::PriceDataProvider;
use crate::market_data::timeframe::{Interval, Period};
use crate::models::market_data::{Bar, OhlcvSeries};
use crate::utils::timestamp_to_datetime;

/// 로컬 CSV 파일 기반 시세 제공자 (오프라인 분석용).
///
/// 컬럼: `symbol`(선택), `timestamp`(밀리초), `open`, `high`, `low`, `close`, `volume`.
/// 기간은 파일의 마지막 행을 기준으로 거슬러 올라가 적용하며, 간격은 재샘플링하지 않는다.
pub struct CsvDataProvider {
    path: PathBuf,
    delimiter: u8,
}

impl CsvDataProvider {
    pub fn new(path: PathBuf, delimiter: char) -> Result<Self, AnalysisError> {
        if !delimiter.is_ascii() {
            return Err(AnalysisError::InvalidParameter(format!(
                "CSV delimiter must be ASCII: {:?}",
                delimiter
            )));
        }
        Ok(Self { path, delimiter: delimiter as u8 })
    }

    fn load_rows(&self, ticker: &str) -> Result<Vec<Bar>, AnalysisError> {
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .from_path(&self.path)
            .map_err(|e| AnalysisError::ProviderError(format!("{}: {}", self.path.display(), e)))?;

        let mut result = Vec::new();
        for rec in rdr.deserialize() {
            let row: CsvRow = rec.map_err(|e| AnalysisError::ParseError(e.to_string()))?;
            if let Some(symbol) = &row.symbol {
                if !symbol.eq_ignore_ascii_case(ticker) {
                    continue;
                }
            }
            let timestamp = timestamp_to_datetime(row.timestamp).ok_or_else(|| {
                AnalysisError::ParseError(format!("timestamp out of range: {}", row.timestamp))
            })?;
            result.push(Bar::new(timestamp, row.open, row.high, row.low, row.close, row.volume));
        }
        Ok(result)
    }
}

#[async_trait]
impl PriceDataProvider for CsvDataProvider {
    async fn fetch_history(
        &self,
        ticker: &str,
        period: Period,
        interval: Interval,
    ) -> Result<OhlcvSeries, AnalysisError> {
        let mut bars = self.load_rows(ticker)?;
        bars.sort_by_key(|b| b.timestamp);

        if let Some(start) = bars.last().and_then(|last| period.start_before(last.timestamp)) {
            bars.retain(|b| b.timestamp >= start);
        }

        log::debug!(
            "CSV {}: {} 행 로드 (period={}, interval={} 재샘플링 없음)",
            self.path.display(),
            bars.len(),
            period,
            interval
        );

        OhlcvSeries::utc(ticker.to_uppercase(), bars)
    }
}

#[derive(serde::Deserialize)]
struct CsvRow {
    #[serde(default)]
    symbol: Option<String>,
    timestamp: i64,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}
