//! 뉴스 헤드라인 수집과 감성 분류 클라이언트

pub mod classifier;
pub mod newsapi;

use async_trait::async_trait;
use chrono::NaiveDate;
use mockall::automock;

use crate::error::AnalysisError;
use crate::models::news::{Article, Classification};

pub use classifier::HttpSentimentClassifier;
pub use newsapi::NewsApiClient;

/// 기간 내 헤드라인 제공자
#[automock]
#[async_trait]
pub trait NewsProvider: Send + Sync {
    async fn fetch_headlines(
        &self,
        query: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Article>, AnalysisError>;
}

/// 텍스트 한 건을 POSITIVE / NEGATIVE / NEUTRAL로 분류
#[automock]
#[async_trait]
pub trait SentimentClassifier: Send + Sync {
    async fn classify(&self, text: &str) -> Result<Classification, AnalysisError>;

    /// 분류 서비스 가용 여부
    async fn health_check(&self) -> Result<bool, AnalysisError>;
}
