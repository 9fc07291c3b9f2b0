//! 시세 분석과 뉴스 감성 분석 흐름

pub mod sentiment;
pub mod stock;

pub use sentiment::{analyze_news_sentiment, SentimentSettings, SentimentWeights};
pub use stock::{analyze_stock, StockAnalysis, StockRequest};
