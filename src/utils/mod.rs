//! 시간 관련 유틸리티
//!
//! 시간 변환, 포맷팅, 기본 날짜 계산 함수 제공

pub mod logging;

use chrono::{DateTime, Days, Duration, NaiveDate, TimeZone, Utc};

use crate::config::MAX_ANCHOR_LOOKBACK_DAYS;
use crate::error::AnalysisError;

/// 타임스탬프(밀리초)를 DateTime<Utc>로 변환
pub fn timestamp_to_datetime(timestamp_ms: i64) -> Option<DateTime<Utc>> {
  Utc.timestamp_millis_opt(timestamp_ms).single()
}

/// DateTime<Utc>를 타임스탬프(밀리초)로 변환
pub fn datetime_to_timestamp(dt: DateTime<Utc>) -> i64 {
  dt.timestamp_millis()
}

/// 오늘 날짜 (UTC)
pub fn today_utc() -> NaiveDate {
  Utc::now().date_naive()
}

/// "YYYY-MM-DD" 파싱
pub fn parse_date(value: &str) -> Result<NaiveDate, AnalysisError> {
  NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
    .map_err(|e| AnalysisError::ParseError(format!("invalid date '{}': {}", value, e)))
}

pub fn format_date(date: NaiveDate) -> String {
  date.format("%Y-%m-%d").to_string()
}

/// 앵커 VWAP 기본 날짜: 기준일에서 `lookback_days`일 전
pub fn default_anchor_date(reference: NaiveDate, lookback_days: i64) -> Result<NaiveDate, AnalysisError> {
  u64::try_from(lookback_days)
    .ok()
    .filter(|days| *days <= MAX_ANCHOR_LOOKBACK_DAYS as u64)
    .and_then(|days| reference.checked_sub_days(Days::new(days)))
    .ok_or_else(|| AnalysisError::InvalidParameter(format!(
      "anchor lookback of {} days from {} is out of range",
      lookback_days, reference
    )))
}

/// 뉴스 기본 조회 구간: 최근 7일
pub fn default_news_range(today: NaiveDate) -> (NaiveDate, NaiveDate) {
  (today - Duration::days(7), today)
}
