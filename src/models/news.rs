use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;

/// 뉴스 헤드라인
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub url: String,
    pub published_at: Option<DateTime<Utc>>,
    pub source: Option<String>,
}

impl Article {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Article {
            title: title.into(),
            url: url.into(),
            published_at: None,
            source: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl SentimentLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "POSITIVE",
            SentimentLabel::Negative => "NEGATIVE",
            SentimentLabel::Neutral => "NEUTRAL",
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SentimentLabel {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "POSITIVE" | "POS" => Ok(SentimentLabel::Positive),
            "NEGATIVE" | "NEG" => Ok(SentimentLabel::Negative),
            "NEUTRAL" | "NEU" => Ok(SentimentLabel::Neutral),
            other => Err(AnalysisError::ParseError(format!(
                "unknown sentiment label: {}",
                other
            ))),
        }
    }
}

/// 분류기 출력: 라벨과 [0, 1] 범위의 신뢰도
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub label: SentimentLabel,
    pub confidence: f64,
}

impl Classification {
    pub fn new(label: SentimentLabel, confidence: f64) -> Self {
        let confidence = if confidence.is_nan() {
            0.0
        } else {
            confidence.clamp(0.0, 1.0)
        };
        Classification { label, confidence }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredArticle {
    pub title: String,
    pub url: String,
    pub sentiment: SentimentLabel,
    pub confidence: f64,
}

impl ScoredArticle {
    pub fn new(article: Article, classification: Classification) -> Self {
        ScoredArticle {
            title: article.title,
            url: article.url,
            sentiment: classification.label,
            confidence: classification.confidence,
        }
    }

    pub fn classification(&self) -> Classification {
        Classification {
            label: self.sentiment,
            confidence: self.confidence,
        }
    }
}

/// 기간별 뉴스 감성 분석 결과
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentReport {
    pub query: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub score: f64,
    pub articles: Vec<ScoredArticle>,
}
