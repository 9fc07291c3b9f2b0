/**
* filename : newsapi
* author : HAMA
* date: 2025. 5. 11.
* description: NewsAPI(everything) 헤드라인 클라이언트
**/

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use reqwest::Client;
use serde::Deserialize;

use crate::config::NewsApiConfig;
use crate::error::AnalysisError;
use crate::models::news::Article;
use crate::news::NewsProvider;
use crate::utils::format_date;

// NewsAPI가 삭제된 기사에 채워 넣는 제목
const REMOVED_TITLE: &str = "[Removed]";

pub struct NewsApiClient {
    client: Client,
    base_url: String,
    api_key: String,
    language: String,
}

impl NewsApiClient {
    /// Create a client; the API key must come from configuration
    pub fn new(config: &NewsApiConfig) -> Result<Self, AnalysisError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| AnalysisError::ConfigError("news_api.api_key is not set (NEWS_API_KEY)".into()))?;

        let mut builder = Client::builder();
        if let Some(ms) = config.timeout_ms {
            builder = builder.timeout(Duration::from_millis(ms));
        }
        let client = builder
            .build()
            .map_err(|e| AnalysisError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            language: config.language.clone(),
        })
    }
}

#[async_trait]
impl NewsProvider for NewsApiClient {
    async fn fetch_headlines(
        &self,
        query: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Article>, AnalysisError> {
        let url = format!("{}/v2/everything", self.base_url);
        let from = format_date(start);
        let to = format_date(end);

        let response = self
            .client
            .get(&url)
            .header("X-Api-Key", &self.api_key)
            .query(&[
                ("q", query),
                ("from", from.as_str()),
                ("to", to.as_str()),
                ("language", self.language.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        let body: EverythingResponse = response.json().await.map_err(|e| {
            AnalysisError::NewsError(format!("HTTP {}: unreadable response: {}", status, e))
        })?;

        parse_everything(body)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EverythingResponse {
    status: String,
    code: Option<String>,
    message: Option<String>,
    #[serde(default)]
    articles: Vec<RawArticle>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawArticle {
    title: Option<String>,
    url: Option<String>,
    published_at: Option<DateTime<Utc>>,
    source: Option<RawSource>,
}

#[derive(Debug, Deserialize)]
struct RawSource {
    name: Option<String>,
}

fn parse_everything(body: EverythingResponse) -> Result<Vec<Article>, AnalysisError> {
    if body.status != "ok" {
        return Err(AnalysisError::NewsError(format!(
            "{}: {}",
            body.code.unwrap_or_else(|| body.status.clone()),
            body.message.unwrap_or_default()
        )));
    }

    let articles = body
        .articles
        .into_iter()
        .filter_map(|raw| {
            let title = raw.title.filter(|t| !t.trim().is_empty() && t != REMOVED_TITLE)?;
            Some(Article {
                title,
                url: raw.url.unwrap_or_default(),
                published_at: raw.published_at,
                source: raw.source.and_then(|s| s.name),
            })
        })
        .collect();

    Ok(articles)
}
