use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, Offset, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;

/// 단일 OHLCV 봉
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    pub fn new(
        timestamp: DateTime<Utc>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Self {
        Bar {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// 종가가 시가보다 낮은 봉
    pub fn is_bearish(&self) -> bool {
        self.close < self.open
    }
}

/// 시간순으로 정렬된 OHLCV 시계열.
///
/// 생성 시 타임스탬프가 엄격히 증가하고 가격/거래량이 유한하며 거래량이 0 이상인지
/// 검증하며, 이후에는 변경되지 않는다. 역직렬화도 같은 검증을 거친다.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawSeries")]
pub struct OhlcvSeries {
    symbol: String,
    utc_offset_secs: i32,
    bars: Vec<Bar>,
}

impl OhlcvSeries {
    pub fn new(
        symbol: impl Into<String>,
        utc_offset_secs: i32,
        bars: Vec<Bar>,
    ) -> Result<Self, AnalysisError> {
        if FixedOffset::east_opt(utc_offset_secs).is_none() {
            return Err(AnalysisError::InvalidSeries(format!(
                "UTC offset out of range: {}s",
                utc_offset_secs
            )));
        }

        for (i, bar) in bars.iter().enumerate() {
            let fields = [
                ("open", bar.open),
                ("high", bar.high),
                ("low", bar.low),
                ("close", bar.close),
                ("volume", bar.volume),
            ];
            if let Some((name, value)) = fields.iter().find(|(_, v)| !v.is_finite()) {
                return Err(AnalysisError::InvalidSeries(format!(
                    "non-finite {} at row {}: {}",
                    name, i, value
                )));
            }
            if bar.volume < 0.0 {
                return Err(AnalysisError::InvalidSeries(format!(
                    "negative volume at row {}: {}",
                    i, bar.volume
                )));
            }
            if i > 0 && bar.timestamp <= bars[i - 1].timestamp {
                return Err(AnalysisError::InvalidSeries(format!(
                    "timestamps not strictly increasing at row {} ({} <= {})",
                    i,
                    bar.timestamp,
                    bars[i - 1].timestamp
                )));
            }
        }

        Ok(OhlcvSeries {
            symbol: symbol.into(),
            utc_offset_secs,
            bars,
        })
    }

    /// UTC 기준 시계열
    pub fn utc(symbol: impl Into<String>, bars: Vec<Bar>) -> Result<Self, AnalysisError> {
        Self::new(symbol, 0, bars)
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn volumes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.volume).collect()
    }

    pub fn timestamps(&self) -> Vec<DateTime<Utc>> {
        self.bars.iter().map(|b| b.timestamp).collect()
    }

    /// 거래소 현지 시간대
    pub fn offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_secs).unwrap_or_else(|| Utc.fix())
    }

    pub fn utc_offset_secs(&self) -> i32 {
        self.utc_offset_secs
    }

    /// 첫 봉과 마지막 봉의 타임스탬프
    pub fn date_range(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        match (self.bars.first(), self.bars.last()) {
            (Some(first), Some(last)) => Some((first.timestamp, last.timestamp)),
            _ => None,
        }
    }

    /// 마지막 봉의 거래소 현지 날짜. 빈 시계열이면 오늘(UTC).
    pub fn last_local_date(&self) -> NaiveDate {
        match self.bars.last() {
            Some(bar) => bar.timestamp.with_timezone(&self.offset()).date_naive(),
            None => Utc::now().date_naive(),
        }
    }

    /// 날짜를 시계열의 시간대 기준 자정으로 맞춘다
    pub fn localize_anchor(&self, date: NaiveDate) -> DateTime<Utc> {
        let naive = date.and_time(NaiveTime::MIN);
        self.offset()
            .from_local_datetime(&naive)
            .single()
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|| Utc.from_utc_datetime(&naive))
    }

    /// `anchor` 이상인 첫 봉의 인덱스
    pub fn position_at_or_after(&self, anchor: DateTime<Utc>) -> Option<usize> {
        let idx = self.bars.partition_point(|b| b.timestamp < anchor);
        if idx < self.bars.len() {
            Some(idx)
        } else {
            None
        }
    }
}

#[derive(Deserialize)]
struct RawSeries {
    symbol: String,
    utc_offset_secs: i32,
    bars: Vec<Bar>,
}

impl TryFrom<RawSeries> for OhlcvSeries {
    type Error = AnalysisError;

    fn try_from(raw: RawSeries) -> Result<Self, Self::Error> {
        OhlcvSeries::new(raw.symbol, raw.utc_offset_secs, raw.bars)
    }
}
