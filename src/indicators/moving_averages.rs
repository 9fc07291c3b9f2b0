/**
* filename : moving_averages
* author : HAMA
* date: 2025. 5. 11.
* description:
**/

use std::collections::VecDeque;
use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;
use crate::models::market_data::OhlcvSeries;
use super::{update_indicators, Indicator, IndicatorSeries};

#[derive(Debug)]
pub struct SimpleMovingAverage {
  name: String,
  period: usize,
  values: VecDeque<f64>,
}

impl SimpleMovingAverage {
  pub fn new(period: usize) -> Self {
    SimpleMovingAverage {
      name: format!("SMA{}", period),
      period,
      values: VecDeque::with_capacity(period),
    }
  }

  pub fn period(&self) -> usize {
    self.period
  }

  pub fn push(&mut self, price: f64) {
    self.values.push_back(price);

    // 오래된 가격 제거
    if self.values.len() > self.period {
      self.values.pop_front();
    }
  }
}

impl Indicator for SimpleMovingAverage {
  fn name(&self) -> &str {
    &self.name
  }

  fn update(&mut self, price: f64, _volume: Option<f64>) -> Result<(), AnalysisError> {
    self.push(price);
    Ok(())
  }

  fn value(&self) -> Option<f64> {
    if !self.is_ready() {
      return None;
    }

    // 누적 합의 빼기 오차를 피하려고 매번 윈도우 전체를 다시 더한다
    let sum: f64 = self.values.iter().sum();
    Some(sum / self.period as f64)
  }

  fn is_ready(&self) -> bool {
    self.period > 0 && self.values.len() >= self.period
  }

  fn reset(&mut self) {
    self.values.clear();
  }
}

/// 첫 종가로 시작하는 EMA (alpha = 2 / (span + 1))
#[derive(Debug)]
pub struct ExponentialMovingAverage {
  name: String,
  span: usize,
  current_ema: Option<f64>,
  alpha: f64,
}

impl ExponentialMovingAverage {
  pub fn new(span: usize) -> Self {
    let alpha = 2.0 / (span as f64 + 1.0);

    ExponentialMovingAverage {
      name: format!("EMA{}", span),
      span,
      current_ema: None,
      alpha,
    }
  }

  pub fn span(&self) -> usize {
    self.span
  }

  pub fn alpha(&self) -> f64 {
    self.alpha
  }

  pub fn push(&mut self, price: f64) {
    self.current_ema = Some(match self.current_ema {
      None => price,
      Some(prev_ema) => self.alpha * price + (1.0 - self.alpha) * prev_ema,
    });
  }
}

impl Indicator for ExponentialMovingAverage {
  fn name(&self) -> &str {
    &self.name
  }

  fn update(&mut self, price: f64, _volume: Option<f64>) -> Result<(), AnalysisError> {
    self.push(price);
    Ok(())
  }

  fn value(&self) -> Option<f64> {
    self.current_ema
  }

  fn is_ready(&self) -> bool {
    self.current_ema.is_some()
  }

  fn reset(&mut self) {
    self.current_ema = None;
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovingAverages {
  pub sma: Vec<IndicatorSeries>,
  pub ema: Vec<IndicatorSeries>,
}

/// 종가 기준 SMA/EMA 일괄 계산. 빈 시계열이면 빈 결과를 돌려준다.
pub fn compute_moving_averages(
  series: &OhlcvSeries,
  window_sizes: &[usize],
  span_sizes: &[usize],
) -> Result<MovingAverages, AnalysisError> {
  if let Some(w) = window_sizes.iter().find(|w| **w == 0) {
    return Err(AnalysisError::InvalidParameter(format!("SMA window must be positive, got {}", w)));
  }
  if let Some(s) = span_sizes.iter().find(|s| **s == 0) {
    return Err(AnalysisError::InvalidParameter(format!("EMA span must be positive, got {}", s)));
  }

  let mut indicators: Vec<Box<dyn Indicator>> = Vec::with_capacity(window_sizes.len() + span_sizes.len());
  for &w in window_sizes {
    indicators.push(Box::new(SimpleMovingAverage::new(w)));
  }
  for &s in span_sizes {
    indicators.push(Box::new(ExponentialMovingAverage::new(s)));
  }

  let mut columns: Vec<Vec<Option<f64>>> = vec![Vec::with_capacity(series.len()); indicators.len()];
  for bar in series.bars() {
    update_indicators(&mut indicators, bar.close, Some(bar.volume))?;
    for (column, indicator) in columns.iter_mut().zip(indicators.iter()) {
      column.push(indicator.value());
    }
  }

  let mut named = indicators.iter()
    .zip(columns)
    .map(|(indicator, values)| IndicatorSeries::new(indicator.name(), values));
  let sma = named.by_ref().take(window_sizes.len()).collect();
  let ema = named.collect();

  Ok(MovingAverages { sma, ema })
}
