/**
* filename : mod
* author : HAMA
* date: 2025. 5. 11.
* description:
**/
pub mod moving_averages;
pub mod volume;
pub mod utils;

pub use moving_averages::*;
pub use volume::*;
pub use utils::*;

use std::fmt::Debug;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;
use crate::models::market_data::OhlcvSeries;

pub const DEFAULT_SMA_WINDOWS: [usize; 2] = [20, 150];
pub const DEFAULT_EMA_SPANS: [usize; 2] = [20, 150];

pub trait Indicator: Debug + Send + Sync {
  fn name(&self) -> &str;

  // 새로운 데이터로 지표 업데이트
  fn update(&mut self, price: f64, volume: Option<f64>) -> Result<(), AnalysisError>;

  // 현재 지표 값 (이력이 부족하면 None)
  fn value(&self) -> Option<f64>;

  // 지표가 계산 가능한지 (충분한 데이터가 있는지) 확인
  fn is_ready(&self) -> bool;

  // 지표 상태 리셋
  fn reset(&mut self);
}

/// 원본 시계열과 1:1로 정렬된 파생 시계열. 값이 없는 구간은 None.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSeries {
  pub name: String,
  pub values: Vec<Option<f64>>,
}

impl IndicatorSeries {
  pub fn new(name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
    IndicatorSeries {
      name: name.into(),
      values,
    }
  }

  pub fn len(&self) -> usize {
    self.values.len()
  }

  pub fn is_empty(&self) -> bool {
    self.values.is_empty()
  }

  pub fn get(&self, index: usize) -> Option<f64> {
    self.values.get(index).copied().flatten()
  }

  pub fn last_value(&self) -> Option<f64> {
    self.values.last().copied().flatten()
  }

  /// 값이 정의된 첫 인덱스
  pub fn first_defined(&self) -> Option<usize> {
    self.values.iter().position(|v| v.is_some())
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorParams {
  pub sma_windows: Vec<usize>,
  pub ema_spans: Vec<usize>,
  /// 시계열 시간대로 정규화된 앵커 시각
  pub anchor: Option<DateTime<Utc>>,
}

impl Default for IndicatorParams {
  fn default() -> Self {
    IndicatorParams {
      sma_windows: DEFAULT_SMA_WINDOWS.to_vec(),
      ema_spans: DEFAULT_EMA_SPANS.to_vec(),
      anchor: None,
    }
  }
}

impl IndicatorParams {
  pub fn with_anchor(mut self, anchor: DateTime<Utc>) -> Self {
    self.anchor = Some(anchor);
    self
  }
}

/// 시계열에 붙는 파생 지표 묶음
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorSet {
  pub sma: Vec<IndicatorSeries>,
  pub ema: Vec<IndicatorSeries>,
  pub vwap: IndicatorSeries,
  pub anchored_vwap: Option<IndicatorSeries>,
  pub normalized_volume: Vec<f64>,
}

/// 전체 지표 계산. 시계열 단위의 퇴화 조건(빈 앵커 구간)만 오류로 보고한다.
pub fn compute_indicator_set(
  series: &OhlcvSeries,
  params: &IndicatorParams,
) -> Result<IndicatorSet, AnalysisError> {
  let averages = compute_moving_averages(series, &params.sma_windows, &params.ema_spans)?;
  let vwap = compute_cumulative_vwap(series);
  let anchored_vwap = match params.anchor {
    Some(anchor) => Some(compute_anchored_vwap(series, anchor)?),
    None => None,
  };
  let normalized_volume = compute_normalized_volume(series);

  Ok(IndicatorSet {
    sma: averages.sma,
    ema: averages.ema,
    vwap,
    anchored_vwap,
    normalized_volume,
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::{Duration, TimeZone};
  use crate::models::market_data::Bar;

  fn series(closes: &[f64], volumes: &[f64]) -> OhlcvSeries {
    let t0 = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
    let bars = closes.iter().zip(volumes).enumerate()
      .map(|(i, (c, v))| Bar::new(t0 + Duration::days(i as i64), *c, *c, *c, *c, *v))
      .collect();
    OhlcvSeries::utc("TEST", bars).unwrap()
  }

  #[test]
  fn test_indicator_set_is_aligned() {
    let s = series(&[10.0, 11.0, 12.0, 13.0], &[100.0, 200.0, 300.0, 400.0]);
    let params = IndicatorParams {
      sma_windows: vec![2, 3],
      ema_spans: vec![3],
      anchor: s.date_range().map(|(first, _)| first + Duration::days(2)),
    };
    let set = compute_indicator_set(&s, &params).unwrap();

    assert_eq!(set.sma.len(), 2);
    assert_eq!(set.ema.len(), 1);
    assert!(set.sma.iter().chain(set.ema.iter()).all(|ind| ind.len() == s.len()));
    assert_eq!(set.vwap.len(), s.len());
    assert_eq!(set.normalized_volume.len(), s.len());

    let anchored = set.anchored_vwap.unwrap();
    assert_eq!(anchored.first_defined(), Some(2));
    assert_eq!(anchored.get(2), Some(12.0));
  }

  #[test]
  fn test_indicator_set_without_anchor() {
    let s = series(&[1.0, 2.0], &[1.0, 1.0]);
    let set = compute_indicator_set(&s, &IndicatorParams::default()).unwrap();
    assert!(set.anchored_vwap.is_none());
    // 기본 윈도우(20, 150)는 이력이 부족하다
    assert!(set.sma.iter().all(|ind| ind.first_defined().is_none()));
    assert!(set.ema.iter().all(|ind| ind.get(0) == Some(1.0)));
  }

  #[test]
  fn test_indicator_set_reports_empty_range() {
    let s = series(&[1.0, 2.0], &[1.0, 1.0]);
    let params = IndicatorParams::default().with_anchor(Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap());
    let result = compute_indicator_set(&s, &params);
    assert!(matches!(result, Err(AnalysisError::EmptyRange(_))));
  }
}
