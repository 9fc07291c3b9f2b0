use chrono::NaiveDate;
use futures::stream::{self, StreamExt, TryStreamExt};
use serde::{Deserialize, Serialize};

use crate::config::SentimentApiConfig;
use crate::error::AnalysisError;
use crate::models::news::{Classification, ScoredArticle, SentimentLabel, SentimentReport};
use crate::news::{NewsProvider, SentimentClassifier};
use crate::utils::logging;

/// 라벨별 가중치. 기본값은 긍정 1.0, 부정 0.5 (비대칭).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentWeights {
    pub positive: f64,
    pub negative: f64,
}

impl Default for SentimentWeights {
    fn default() -> Self {
        SentimentWeights {
            positive: 1.0,
            negative: 0.5,
        }
    }
}

impl SentimentWeights {
    /// 헤드라인 한 건이 누적 점수에 더하는 값
    pub fn contribution(&self, classification: &Classification) -> f64 {
        match classification.label {
            SentimentLabel::Positive => self.positive * classification.confidence,
            SentimentLabel::Negative => -(self.negative * classification.confidence),
            SentimentLabel::Neutral => 0.0,
        }
    }

    pub fn score(&self, articles: &[ScoredArticle]) -> f64 {
        articles
            .iter()
            .fold(0.0, |acc, a| acc + self.contribution(&a.classification()))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SentimentSettings {
    pub weights: SentimentWeights,
    pub concurrency: usize,
}

impl Default for SentimentSettings {
    fn default() -> Self {
        SentimentSettings {
            weights: SentimentWeights::default(),
            concurrency: 4,
        }
    }
}

impl From<&SentimentApiConfig> for SentimentSettings {
    fn from(config: &SentimentApiConfig) -> Self {
        SentimentSettings {
            weights: SentimentWeights {
                positive: config.positive_weight,
                negative: config.negative_weight,
            },
            concurrency: config.concurrency,
        }
    }
}

/// 헤드라인 조회 → 건별 분류 → 점수 합산.
/// 분류는 `concurrency`개까지 동시에 돌리되 결과는 헤드라인 순서를 유지한다.
pub async fn analyze_news_sentiment(
    news: &dyn NewsProvider,
    classifier: &dyn SentimentClassifier,
    settings: &SentimentSettings,
    query: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<SentimentReport, AnalysisError> {
    if start > end {
        return Err(AnalysisError::InvalidParameter(format!(
            "news start date {} is after end date {}",
            start, end
        )));
    }

    let articles = news.fetch_headlines(query, start, end).await?;
    log::debug!("{}: 헤드라인 {}건 분류 시작", query, articles.len());

    let scored: Vec<ScoredArticle> = stream::iter(articles)
        .map(|article| async move {
            let classification = classifier.classify(&article.title).await?;
            Ok::<_, AnalysisError>(ScoredArticle::new(article, classification))
        })
        .buffered(settings.concurrency.max(1))
        .try_collect()
        .await?;

    let score = settings.weights.score(&scored);
    logging::log_sentiment(query, scored.len(), score);

    Ok(SentimentReport {
        query: query.to_string(),
        start,
        end,
        score,
        articles: scored,
    })
}
