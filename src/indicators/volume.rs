/**
* filename : volume
* author : HAMA
* date: 2025. 5. 11.
* description:
**/

use chrono::{DateTime, Utc};

use crate::error::AnalysisError;
use crate::models::market_data::OhlcvSeries;
use super::{Indicator, IndicatorSeries};

/// 첫 봉부터 누적하는 VWAP
#[derive(Debug)]
pub struct VolumeWeightedAveragePrice {
  name: String,
  cumulative_price_volume: f64,
  cumulative_volume: f64,
  count: usize,
}

impl VolumeWeightedAveragePrice {
  pub fn new() -> Self {
    Self::named("VWAP")
  }

  pub fn named(name: impl Into<String>) -> Self {
    VolumeWeightedAveragePrice {
      name: name.into(),
      cumulative_price_volume: 0.0,
      cumulative_volume: 0.0,
      count: 0,
    }
  }

  pub fn push(&mut self, price: f64, volume: f64) {
    self.cumulative_price_volume += price * volume;
    self.cumulative_volume += volume;
    self.count += 1;
  }

  pub fn cumulative_volume(&self) -> f64 {
    self.cumulative_volume
  }
}

impl Default for VolumeWeightedAveragePrice {
  fn default() -> Self {
    Self::new()
  }
}

impl Indicator for VolumeWeightedAveragePrice {
  fn name(&self) -> &str {
    &self.name
  }

  fn update(&mut self, price: f64, volume: Option<f64>) -> Result<(), AnalysisError> {
    let volume = volume.ok_or_else(|| AnalysisError::InvalidParameter("Volume data required for VWAP".to_string()))?;
    self.push(price, volume);
    Ok(())
  }

  fn value(&self) -> Option<f64> {
    // 누적 거래량이 0이면 정의되지 않음
    if !self.is_ready() || self.cumulative_volume == 0.0 {
      return None;
    }
    Some(self.cumulative_price_volume / self.cumulative_volume)
  }

  fn is_ready(&self) -> bool {
    self.count > 0
  }

  fn reset(&mut self) {
    self.cumulative_price_volume = 0.0;
    self.cumulative_volume = 0.0;
    self.count = 0;
  }
}

fn vwap_values(series: &OhlcvSeries, start: usize) -> Vec<Option<f64>> {
  let mut vwap = VolumeWeightedAveragePrice::new();
  let mut values = vec![None; start];
  values.reserve(series.len().saturating_sub(start));

  for bar in &series.bars()[start..] {
    vwap.push(bar.close, bar.volume);
    values.push(vwap.value());
  }

  values
}

/// VWAP[i] = Σ close·volume / Σ volume (0..=i)
pub fn compute_cumulative_vwap(series: &OhlcvSeries) -> IndicatorSeries {
  IndicatorSeries::new("VWAP", vwap_values(series, 0))
}

/// 앵커 시각 이후로 다시 시작하는 VWAP. 앵커 이전 구간은 None.
///
/// `anchor`는 시계열과 같은 시간대로 정규화되어 있어야 한다
/// ([`OhlcvSeries::localize_anchor`] 참고).
pub fn compute_anchored_vwap(
  series: &OhlcvSeries,
  anchor: DateTime<Utc>,
) -> Result<IndicatorSeries, AnalysisError> {
  let start = series.position_at_or_after(anchor)
    .ok_or(AnalysisError::EmptyRange(anchor))?;

  Ok(IndicatorSeries::new("Anchored VWAP", vwap_values(series, start)))
}

/// 거래량을 시계열 자신의 최소/최대값으로 [0, 1] 스케일링.
/// 거래량이 전 구간에서 같으면 모두 0으로 둔다.
pub fn compute_normalized_volume(series: &OhlcvSeries) -> Vec<f64> {
  let bars = series.bars();
  if bars.is_empty() {
    return Vec::new();
  }

  let (min_v, max_v) = bars.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), b| {
    (lo.min(b.volume), hi.max(b.volume))
  });

  if max_v == min_v {
    return vec![0.0; bars.len()];
  }

  let range = max_v - min_v;
  bars.iter().map(|b| (b.volume - min_v) / range).collect()
}
