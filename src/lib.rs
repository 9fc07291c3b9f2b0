//! 주식 차트 지표 분석 라이브러리
//!
//! 시세(OHLCV) 조회, 이동평균/VWAP/거래량 지표 계산, 뉴스 헤드라인 감성 점수,
//! 대시보드 HTTP 서버를 제공합니다.

pub mod analysis;
pub mod chart;
pub mod config;
pub mod error;
pub mod http;
pub mod indicators;
pub mod market_data;
pub mod models;
pub mod news;
pub mod utils;

// 핵심 타입 재노출
pub use crate::error::AnalysisError;
pub use crate::models::market_data::{Bar, OhlcvSeries};
pub use crate::market_data::{Interval, Period, PriceDataProvider};
pub use crate::indicators::{IndicatorSeries, IndicatorSet};

/// 버전 정보
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// 결과 타입 별칭
pub type Result<T> = std::result::Result<T, AnalysisError>;
