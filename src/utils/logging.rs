//! 로깅 유틸리티
//!
//! 로그 초기화 및 유틸리티 함수 제공

use env_logger::Builder;
use log::LevelFilter;
use std::env;

use crate::error::AnalysisError;

fn parse_level(level: &str) -> LevelFilter {
    match level.to_lowercase().as_str() {
        "trace" => LevelFilter::Trace,
        "debug" => LevelFilter::Debug,
        "info" => LevelFilter::Info,
        "warn" => LevelFilter::Warn,
        "error" => LevelFilter::Error,
        "off" => LevelFilter::Off,
        _ => LevelFilter::Info,
    }
}

/// 로깅 시스템 초기화. RUST_LOG가 설정 파일의 레벨보다 우선한다.
pub fn init(default_level: &str) -> Result<(), AnalysisError> {
    let mut builder = Builder::from_default_env();

    let log_level = env::var("RUST_LOG").unwrap_or_else(|_| default_level.to_string());
    let level_filter = parse_level(&log_level);

    builder
        .filter_level(level_filter)
        .format_timestamp_millis()
        .try_init()
        .map_err(|e| AnalysisError::ConfigError(format!("logger already initialized: {}", e)))?;

    log::info!("로깅 시스템 초기화 완료: 레벨 = {}", log_level);

    Ok(())
}

/// 시세 분석 시작 로그
pub fn log_analysis_start(request_id: &str, ticker: &str, period: &str, interval: &str) {
    log::info!("분석 시작 [{}]: {} - 기간: {} - 간격: {}", request_id, ticker, period, interval);
}

/// 시세 분석 종료 로그
pub fn log_analysis_end(request_id: &str, ticker: &str, rows: usize) {
    log::info!("분석 완료 [{}]: {} - 행 수: {}", request_id, ticker, rows);
}

/// 뉴스 감성 분석 로그
pub fn log_sentiment(query: &str, articles: usize, score: f64) {
    log::info!("감성 분석: {} - 기사 수: {} - 점수: {:.2}", query, articles, score);
}

/// 오류 로그
pub fn log_error(context: &str, error: &AnalysisError) {
    if error.is_user_recoverable() {
        log::warn!("요청 오류 - {}: {}", context, error);
    } else {
        log::error!("오류 발생 - {}: {}", context, error);
    }
}
