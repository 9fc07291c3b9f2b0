/**
* filename : error
* author : HAMA
* date: 2025. 5. 8.
* description:
**/

use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("No data available for {ticker} (period: {period}, interval: {interval})")]
    EmptyInput {
        ticker: String,
        period: String,
        interval: String,
    },

    #[error("No rows at or after anchor {0}")]
    EmptyRange(DateTime<Utc>),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Invalid series: {0}")]
    InvalidSeries(String),

    #[error("Price provider error: {0}")]
    ProviderError(String),

    #[error("News provider error: {0}")]
    NewsError(String),

    #[error("Sentiment classifier error: {0}")]
    ClassifierError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl AnalysisError {
    /// 요청 파라미터를 바꿔 다시 시도하면 해결될 수 있는 오류인지
    pub fn is_user_recoverable(&self) -> bool {
        matches!(
            self,
            AnalysisError::EmptyInput { .. }
                | AnalysisError::EmptyRange(_)
                | AnalysisError::InvalidParameter(_)
                | AnalysisError::ParseError(_)
        )
    }
}
