use async_trait::async_trait;
use mockall::automock;

use crate::error::AnalysisError;
use crate::market_data::timeframe::{Interval, Period};
use crate::models::market_data::OhlcvSeries;

/// 과거 시세 제공자 인터페이스
#[automock]
#[async_trait]
pub trait PriceDataProvider: Send + Sync {
    /// 티커/기간/간격에 해당하는 OHLCV 시계열 조회.
    /// 데이터가 없으면 빈 시계열을 돌려준다.
    async fn fetch_history(
        &self,
        ticker: &str,
        period: Period,
        interval: Interval,
    ) -> Result<OhlcvSeries, AnalysisError>;
}
