//! 2단 차트 레이아웃 (가격 + 지표 / 정규화 거래량)
//!
//! 브라우저 쪽 Plotly가 그대로 그릴 수 있는 형태로 직렬화한다.
//! 값이 없는 지점은 `null`로 나간다.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::analysis::StockAnalysis;
use crate::indicators::IndicatorSeries;

pub const PRICE_ROW: u8 = 1;
pub const VOLUME_ROW: u8 = 2;

const SMA_COLORS: [&str; 4] = ["blue", "orange", "purple", "brown"];
const EMA_COLORS: [&str; 4] = ["green", "red", "olive", "teal"];
const BEARISH_COLOR: &str = "red";
const BULLISH_COLOR: &str = "blue";

#[derive(Debug, Clone, Serialize)]
pub struct Figure {
  pub layout: Layout,
  pub traces: Vec<Trace>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Layout {
  pub title: String,
  pub height: u32,
  pub show_legend: bool,
  pub range_slider_visible: bool,
  pub row_heights: [f64; 2],
  pub vertical_spacing: f64,
  pub price_axis_title: String,
  pub volume_axis_title: String,
  pub volume_axis_range: [f64; 2],
}

#[derive(Debug, Clone, Serialize)]
pub struct Line {
  pub color: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub dash: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Trace {
  Candlestick {
    name: String,
    row: u8,
    x: Vec<DateTime<Utc>>,
    open: Vec<f64>,
    high: Vec<f64>,
    low: Vec<f64>,
    close: Vec<f64>,
  },
  Scatter {
    name: String,
    row: u8,
    x: Vec<DateTime<Utc>>,
    y: Vec<Option<f64>>,
    line: Line,
  },
  Bar {
    name: String,
    row: u8,
    x: Vec<DateTime<Utc>>,
    y: Vec<f64>,
    marker_colors: Vec<String>,
  },
}

impl Trace {
  pub fn name(&self) -> &str {
    match self {
      Trace::Candlestick { name, .. } | Trace::Scatter { name, .. } | Trace::Bar { name, .. } => name,
    }
  }

  pub fn row(&self) -> u8 {
    match self {
      Trace::Candlestick { row, .. } | Trace::Scatter { row, .. } | Trace::Bar { row, .. } => *row,
    }
  }
}

fn line_trace(x: &[DateTime<Utc>], series: &IndicatorSeries, color: &str, dash: Option<&str>) -> Trace {
  Trace::Scatter {
    name: series.name.clone(),
    row: PRICE_ROW,
    x: x.to_vec(),
    y: series.values.clone(),
    line: Line {
      color: color.to_string(),
      dash: dash.map(str::to_string),
    },
  }
}

/// 분석 결과로 2단 차트 구성
pub fn build_figure(analysis: &StockAnalysis) -> Figure {
  let bars = analysis.series.bars();
  let x = analysis.series.timestamps();
  let ind = &analysis.indicators;

  let mut traces = Vec::with_capacity(4 + ind.sma.len() + ind.ema.len());
  traces.push(Trace::Candlestick {
    name: "Price".to_string(),
    row: PRICE_ROW,
    x: x.clone(),
    open: bars.iter().map(|b| b.open).collect(),
    high: bars.iter().map(|b| b.high).collect(),
    low: bars.iter().map(|b| b.low).collect(),
    close: bars.iter().map(|b| b.close).collect(),
  });

  for (i, sma) in ind.sma.iter().enumerate() {
    traces.push(line_trace(&x, sma, SMA_COLORS[i % SMA_COLORS.len()], None));
  }
  for (i, ema) in ind.ema.iter().enumerate() {
    traces.push(line_trace(&x, ema, EMA_COLORS[i % EMA_COLORS.len()], None));
  }
  traces.push(line_trace(&x, &ind.vwap, "magenta", Some("dot")));
  if let Some(anchored) = &ind.anchored_vwap {
    traces.push(line_trace(&x, anchored, "cyan", Some("dot")));
  }

  // 음봉은 빨강, 나머지는 파랑
  let marker_colors = bars.iter()
    .map(|b| (if b.is_bearish() { BEARISH_COLOR } else { BULLISH_COLOR }).to_string())
    .collect();
  traces.push(Trace::Bar {
    name: "Volume".to_string(),
    row: VOLUME_ROW,
    x,
    y: ind.normalized_volume.clone(),
    marker_colors,
  });

  Figure {
    layout: Layout {
      title: format!("{} Analysis", analysis.ticker),
      height: 800,
      show_legend: true,
      range_slider_visible: false,
      row_heights: [0.7, 0.3],
      vertical_spacing: 0.03,
      price_axis_title: "Price".to_string(),
      volume_axis_title: "Normalized Volume".to_string(),
      volume_axis_range: [0.0, 1.0],
    },
    traces,
  }
}
