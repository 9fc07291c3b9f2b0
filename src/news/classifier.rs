/**
* filename : classifier
* author : HAMA
* date: 2025. 5. 11.
* description: 외부 감성 분류 모델 서비스와 통신하는 클라이언트
**/

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::SentimentApiConfig;
use crate::error::AnalysisError;
use crate::models::news::{Classification, SentimentLabel};
use crate::news::SentimentClassifier;

#[derive(Debug, Clone, Serialize)]
pub struct ClassifyRequest<'a> {
    pub text: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClassifyResponse {
    pub label: String,
    #[serde(alias = "score")]
    pub confidence: f64,
}

impl ClassifyResponse {
    pub fn into_classification(self) -> Result<Classification, AnalysisError> {
        let label: SentimentLabel = self
            .label
            .parse()
            .map_err(|e: AnalysisError| AnalysisError::ClassifierError(e.to_string()))?;
        Ok(Classification::new(label, self.confidence))
    }
}

pub struct HttpSentimentClassifier {
    client: Client,
    base_url: String,
}

impl HttpSentimentClassifier {
    /// Create new classifier client
    pub fn new(config: &SentimentApiConfig) -> Result<Self, AnalysisError> {
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
        })
    }
}

#[async_trait]
impl SentimentClassifier for HttpSentimentClassifier {
    async fn classify(&self, text: &str) -> Result<Classification, AnalysisError> {
        let url = format!("{}/classify", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&ClassifyRequest { text })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AnalysisError::ClassifierError(format!(
                "Failed to classify text: {}",
                response.status()
            )));
        }

        let body = response.json::<ClassifyResponse>().await?;
        body.into_classification()
    }

    /// Check if classifier service is healthy
    async fn health_check(&self) -> Result<bool, AnalysisError> {
        let url = format!("{}/health", self.base_url);
        let response = self.client.get(&url).send().await?;
        Ok(response.status().is_success())
    }
}
