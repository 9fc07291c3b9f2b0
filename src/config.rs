/**
* filename : config
* author : HAMA
* date: 2025. 5. 8.
* description:
**/

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::AnalysisError;
use crate::indicators::{DEFAULT_EMA_SPANS, DEFAULT_SMA_WINDOWS};

const DEFAULT_CONFIG_PATH: &str = "config.json";
// 앵커 기본 날짜 계산 허용 범위 (약 100년)
pub const MAX_ANCHOR_LOOKBACK_DAYS: i64 = 36_500;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub price_api: PriceApiConfig,
    pub news_api: NewsApiConfig,
    pub sentiment_api: SentimentApiConfig,
    pub indicators: IndicatorConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PriceApiConfig {
    pub base_url: String,
    pub timeout_ms: Option<u64>,
    /// Set to read prices from a local CSV file instead of Yahoo
    pub csv_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NewsApiConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub language: String,
    pub timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SentimentApiConfig {
    pub base_url: String,
    pub timeout_ms: Option<u64>,
    /// Score added per POSITIVE headline, multiplied by confidence
    pub positive_weight: f64,
    /// Score subtracted per NEGATIVE headline, multiplied by confidence
    pub negative_weight: f64,
    /// Max headlines classified at once
    pub concurrency: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorConfig {
    pub sma_windows: Vec<usize>,
    pub ema_spans: Vec<usize>,
    /// Default anchored VWAP lookback when the request gives no date
    pub anchor_lookback_days: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Config {
    /// Load configuration from `CONFIG_PATH` or `config.json`, falling back to defaults
    pub fn load() -> Result<Self, AnalysisError> {
        let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let config_path = Path::new(&path);

        let mut cfg = if config_path.exists() {
            Self::load_from(config_path)?
        } else {
            Config::default()
        };
        cfg.apply_env_overrides();
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load configuration from a file without environment overrides
    pub fn load_from(path: &Path) -> Result<Self, AnalysisError> {
        let mut file = File::open(path)
            .map_err(|e| AnalysisError::ConfigError(format!("Failed to open config file: {}", e)))?;

        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .map_err(|e| AnalysisError::ConfigError(format!("Failed to read config file: {}", e)))?;

        Self::from_json(&contents)
    }

    pub fn from_json(contents: &str) -> Result<Self, AnalysisError> {
        serde_json::from_str(contents)
            .map_err(|e| AnalysisError::ConfigError(format!("Failed to parse config file: {}", e)))
    }

    /// Apply environment variable overrides for sensitive/runtime fields
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("NEWS_API_KEY") { self.news_api.api_key = Some(v); }
        if let Some(v) = get("NEWS_API_BASE_URL") { self.news_api.base_url = v; }
        if let Some(v) = get("PRICE_API_BASE_URL") { self.price_api.base_url = v; }
        if let Some(v) = get("PRICE_CSV_PATH") { self.price_api.csv_path = Some(v); }
        if let Some(v) = get("SENTIMENT_API_BASE_URL") { self.sentiment_api.base_url = v; }
        if let Some(v) = get("SERVER_HOST") { self.server.host = v; }
        if let Some(v) = get("SERVER_PORT") {
            match v.parse() {
                Ok(port) => self.server.port = port,
                Err(_) => log::warn!("SERVER_PORT 무시: {}", v),
            }
        }
        if let Some(v) = get("SENTIMENT_POSITIVE_WEIGHT") {
            match v.parse() {
                Ok(w) => self.sentiment_api.positive_weight = w,
                Err(_) => log::warn!("SENTIMENT_POSITIVE_WEIGHT 무시: {}", v),
            }
        }
        if let Some(v) = get("SENTIMENT_NEGATIVE_WEIGHT") {
            match v.parse() {
                Ok(w) => self.sentiment_api.negative_weight = w,
                Err(_) => log::warn!("SENTIMENT_NEGATIVE_WEIGHT 무시: {}", v),
            }
        }
    }

    pub fn validate(&self) -> Result<(), AnalysisError> {
        let weights = [self.sentiment_api.positive_weight, self.sentiment_api.negative_weight];
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(AnalysisError::ConfigError(format!(
                "sentiment weights must be finite and non-negative: {:?}",
                weights
            )));
        }
        if self.sentiment_api.concurrency == 0 {
            return Err(AnalysisError::ConfigError("sentiment_api.concurrency must be at least 1".into()));
        }
        if self.indicators.sma_windows.contains(&0) || self.indicators.ema_spans.contains(&0) {
            return Err(AnalysisError::ConfigError("indicator windows and spans must be positive".into()));
        }
        if !(0..=MAX_ANCHOR_LOOKBACK_DAYS).contains(&self.indicators.anchor_lookback_days) {
            return Err(AnalysisError::ConfigError(format!(
                "indicators.anchor_lookback_days must be between 0 and {}, got {}",
                MAX_ANCHOR_LOOKBACK_DAYS, self.indicators.anchor_lookback_days
            )));
        }
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 3030,
            },
            price_api: PriceApiConfig {
                base_url: "https://query1.finance.yahoo.com".to_string(),
                timeout_ms: Some(10_000),
                csv_path: None,
            },
            news_api: NewsApiConfig {
                base_url: "https://newsapi.org".to_string(),
                api_key: None,
                language: "en".to_string(),
                timeout_ms: Some(10_000),
            },
            sentiment_api: SentimentApiConfig {
                base_url: "http://127.0.0.1:8000".to_string(),
                timeout_ms: Some(5_000),
                positive_weight: 1.0,
                negative_weight: 0.5,
                concurrency: 4,
            },
            indicators: IndicatorConfig {
                sma_windows: DEFAULT_SMA_WINDOWS.to_vec(),
                ema_spans: DEFAULT_EMA_SPANS.to_vec(),
                anchor_lookback_days: 180,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
            },
        }
    }
}

// 섹션 단위 기본값 (부분 설정 파일 허용)
impl Default for ServerConfig {
    fn default() -> Self { Config::default().server }
}

impl Default for PriceApiConfig {
    fn default() -> Self { Config::default().price_api }
}

impl Default for NewsApiConfig {
    fn default() -> Self { Config::default().news_api }
}

impl Default for SentimentApiConfig {
    fn default() -> Self { Config::default().sentiment_api }
}

impl Default for IndicatorConfig {
    fn default() -> Self { Config::default().indicators }
}

impl Default for LoggingConfig {
    fn default() -> Self { Config::default().logging }
}
