/**
* filename : utils
* author : HAMA
* date: 2025. 5. 11.
* description:
**/

use crate::error::AnalysisError;
use crate::models::market_data::OhlcvSeries;
use super::{Indicator, IndicatorSeries};

// 단일 가격 데이터를 사용하여 여러 지표 업데이트
pub fn update_indicators(
  indicators: &mut [Box<dyn Indicator>],
  price: f64,
  volume: Option<f64>
) -> Result<(), AnalysisError> {
  for indicator in indicators.iter_mut() {
    indicator.update(price, volume)?;
  }

  Ok(())
}

// 지표 초기화
pub fn reset_indicators(indicators: &mut [Box<dyn Indicator>]) {
  for indicator in indicators.iter_mut() {
    indicator.reset();
  }
}

// 임의의 지표를 시계열 전체에 돌려 정렬된 결과를 얻는다
pub fn run_indicator(
  indicator: &mut dyn Indicator,
  series: &OhlcvSeries,
) -> Result<IndicatorSeries, AnalysisError> {
  indicator.reset();

  let mut values = Vec::with_capacity(series.len());
  for bar in series.bars() {
    indicator.update(bar.close, Some(bar.volume))?;
    values.push(indicator.value());
  }

  Ok(IndicatorSeries::new(indicator.name(), values))
}
