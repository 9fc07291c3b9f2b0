use axum::{
  extract::{Path, Query, State},
  http::StatusCode,
  response::{Html, IntoResponse, Response},
  routing::get,
  Json, Router,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use uuid::Uuid;

use crate::analysis::{analyze_news_sentiment, analyze_stock, SentimentSettings, StockRequest};
use crate::chart::{build_figure, Figure};
use crate::config::Config;
use crate::error::AnalysisError;
use crate::indicators::IndicatorSet;
use crate::market_data::{CsvDataProvider, Interval, Period, PriceDataProvider, YahooProvider};
use crate::models::news::SentimentReport;
use crate::news::{HttpSentimentClassifier, NewsApiClient, NewsProvider, SentimentClassifier};
use crate::utils::{self, logging};

const DASHBOARD_HTML: &str = include_str!("dashboard.html");

#[derive(Clone)]
pub struct AppState {
  pub config: Arc<Config>,
  pub price_provider: Arc<dyn PriceDataProvider>,
  // API 키가 없으면 None (감성 분석 요청 시 설정 오류로 응답)
  pub news_provider: Option<Arc<dyn NewsProvider>>,
  pub classifier: Arc<dyn SentimentClassifier>,
}

impl AppState {
  /// 설정으로부터 외부 제공자 구성
  pub fn from_config(config: Config) -> Result<Self, AnalysisError> {
    let price_provider: Arc<dyn PriceDataProvider> = match &config.price_api.csv_path {
      Some(path) => {
        log::info!("CSV 시세 제공자 사용: {}", path);
        Arc::new(CsvDataProvider::new(PathBuf::from(path), ',')?)
      }
      None => Arc::new(YahooProvider::new(&config.price_api)?),
    };

    let news_provider: Option<Arc<dyn NewsProvider>> = match NewsApiClient::new(&config.news_api) {
      Ok(client) => Some(Arc::new(client)),
      Err(AnalysisError::ConfigError(msg)) => {
        log::warn!("뉴스 감성 분석 비활성화: {}", msg);
        None
      }
      Err(e) => return Err(e),
    };

    let classifier: Arc<dyn SentimentClassifier> = Arc::new(HttpSentimentClassifier::new(&config.sentiment_api)?);

    Ok(AppState {
      config: Arc::new(config),
      price_provider,
      news_provider,
      classifier,
    })
  }
}

/// JSON 오류 응답
#[derive(Debug)]
pub struct ApiError(pub AnalysisError);

impl From<AnalysisError> for ApiError {
  fn from(err: AnalysisError) -> Self {
    ApiError(err)
  }
}

pub fn status_for(err: &AnalysisError) -> StatusCode {
  match err {
    AnalysisError::EmptyInput { .. } | AnalysisError::EmptyRange(_) => StatusCode::NOT_FOUND,
    AnalysisError::InvalidParameter(_) | AnalysisError::ParseError(_) => StatusCode::BAD_REQUEST,
    AnalysisError::ProviderError(_)
    | AnalysisError::NewsError(_)
    | AnalysisError::ClassifierError(_)
    | AnalysisError::InvalidSeries(_)
    | AnalysisError::Http(_) => StatusCode::BAD_GATEWAY,
    AnalysisError::ConfigError(_)
    | AnalysisError::IoError(_)
    | AnalysisError::SerializationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    logging::log_error("http", &self.0);
    let body = Json(serde_json::json!({ "error": self.0.to_string() }));
    (status_for(&self.0), body).into_response()
  }
}

#[derive(Debug, Serialize)]
pub struct Health {
  pub status: &'static str,
  pub classifier: &'static str,
  pub news_configured: bool,
}

pub fn build_router(state: AppState) -> Router {
  let cors = CorsLayer::new().allow_origin(Any).allow_headers(Any).allow_methods(Any);

  Router::new()
    .route("/", get(dashboard))
    .route("/health", get(health))
    .route("/api/options", get(get_options))
    .route("/api/analysis/:ticker", get(get_analysis))
    .route("/api/sentiment/:ticker", get(get_sentiment))
    .with_state(state)
    .layer(cors)
}

/// 서버 시작 (종료될 때까지 대기)
pub async fn serve(state: AppState) -> Result<(), AnalysisError> {
  let addr = state.config.bind_address();
  let listener = tokio::net::TcpListener::bind(&addr).await?;
  log::info!("서버 시작: http://{}/", addr);
  axum::serve(listener, build_router(state)).await?;
  Ok(())
}

async fn dashboard() -> Html<&'static str> {
  Html(DASHBOARD_HTML)
}

/// 서버는 항상 ok, 분류 서비스 상태는 별도 필드로 보고
async fn health(State(state): State<AppState>) -> Json<Health> {
  let classifier = match state.classifier.health_check().await {
    Ok(true) => "up",
    Ok(false) => "down",
    Err(e) => {
      log::warn!("분류 서비스 상태 확인 실패: {}", e);
      "unreachable"
    }
  };
  Json(Health {
    status: "ok",
    classifier,
    news_configured: state.news_provider.is_some(),
  })
}

#[derive(Debug, Serialize)]
pub struct OptionsResponse {
  pub periods: Vec<&'static str>,
  pub intervals: Vec<&'static str>,
  pub default_period: Period,
  pub default_interval: Interval,
  /// 앵커 날짜를 비워두면 마지막 봉 날짜에서 이만큼 거슬러 올라간다
  pub anchor_lookback_days: i64,
  pub default_news_start: NaiveDate,
  pub default_news_end: NaiveDate,
}

async fn get_options(State(state): State<AppState>) -> Json<OptionsResponse> {
  let today = utils::today_utc();
  let (news_start, news_end) = utils::default_news_range(today);
  Json(OptionsResponse {
    periods: Period::ALL.iter().map(|p| p.as_str()).collect(),
    intervals: Interval::ALL.iter().map(|i| i.as_str()).collect(),
    default_period: Period::default(),
    default_interval: Interval::default(),
    anchor_lookback_days: state.config.indicators.anchor_lookback_days,
    default_news_start: news_start,
    default_news_end: news_end,
  })
}

#[derive(Debug, Default, Deserialize)]
pub struct AnalysisQuery {
  pub period: Option<String>,
  pub interval: Option<String>,
  pub anchor_date: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DateRange {
  pub start: DateTime<Utc>,
  pub end: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct AnalysisResponse {
  pub id: Uuid,
  pub ticker: String,
  pub period: Period,
  pub interval: Interval,
  pub rows: usize,
  pub date_range: Option<DateRange>,
  pub anchor: Option<DateTime<Utc>>,
  pub indicators: IndicatorSet,
  pub figure: Figure,
}

async fn get_analysis(
  Path(ticker): Path<String>,
  Query(query): Query<AnalysisQuery>,
  State(state): State<AppState>,
) -> Result<Json<AnalysisResponse>, ApiError> {
  let period = match query.period.as_deref() {
    Some(p) => p.parse()?,
    None => Period::default(),
  };
  let interval = match query.interval.as_deref() {
    Some(i) => i.parse()?,
    None => Interval::default(),
  };
  let mut request = StockRequest::new(ticker, period, interval)
    .with_anchor_lookback(state.config.indicators.anchor_lookback_days)
    .with_averages(
      state.config.indicators.sma_windows.clone(),
      state.config.indicators.ema_spans.clone(),
    );
  if let Some(d) = query.anchor_date.as_deref().filter(|d| !d.trim().is_empty()) {
    request = request.with_anchor_date(utils::parse_date(d)?);
  }

  let analysis = analyze_stock(state.price_provider.as_ref(), &request).await?;
  let figure = build_figure(&analysis);

  Ok(Json(AnalysisResponse {
    id: analysis.id,
    rows: analysis.series.len(),
    date_range: analysis.date_range().map(|(start, end)| DateRange { start, end }),
    ticker: analysis.ticker,
    period: analysis.period,
    interval: analysis.interval,
    anchor: analysis.anchor,
    indicators: analysis.indicators,
    figure,
  }))
}

#[derive(Debug, Default, Deserialize)]
pub struct SentimentQuery {
  pub start: Option<String>,
  pub end: Option<String>,
}

async fn get_sentiment(
  Path(ticker): Path<String>,
  Query(query): Query<SentimentQuery>,
  State(state): State<AppState>,
) -> Result<Json<SentimentReport>, ApiError> {
  let news = state.news_provider.as_ref().ok_or_else(|| {
    AnalysisError::ConfigError("news provider not configured (set NEWS_API_KEY)".into())
  })?;

  let (default_start, default_end) = utils::default_news_range(utils::today_utc());
  let start = match query.start.as_deref() {
    Some(d) => utils::parse_date(d)?,
    None => default_start,
  };
  let end = match query.end.as_deref() {
    Some(d) => utils::parse_date(d)?,
    None => default_end,
  };

  let ticker = StockRequest::new(ticker, Period::default(), Interval::default()).normalized_ticker()?;
  let settings = SentimentSettings::from(&state.config.sentiment_api);
  let report = analyze_news_sentiment(
    news.as_ref(),
    state.classifier.as_ref(),
    &settings,
    &ticker,
    start,
    end,
  )
  .await?;

  Ok(Json(report))
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::{Duration, TimeZone};
  use crate::market_data::MockPriceDataProvider;
  use crate::models::market_data::{Bar, OhlcvSeries};
  use crate::models::news::{Article, Classification, SentimentLabel};
  use crate::news::{MockNewsProvider, MockSentimentClassifier};

  fn series() -> OhlcvSeries {
    let t0 = Utc.with_ymd_and_hms(2024, 1, 2, 5, 0, 0).unwrap();
    let bars = (0..5)
      .map(|i| {
        let c = 100.0 + i as f64;
        Bar::new(t0 + Duration::days(i), c, c + 1.0, c - 1.0, c, 1000.0 * (i + 1) as f64)
      })
      .collect();
    OhlcvSeries::new("TSLA", -5 * 3600, bars).unwrap()
  }

  fn state(price: MockPriceDataProvider, news: Option<MockNewsProvider>, classifier: MockSentimentClassifier) -> AppState {
    AppState {
      config: Arc::new(Config::default()),
      price_provider: Arc::new(price),
      news_provider: news.map(|n| Arc::new(n) as Arc<dyn NewsProvider>),
      classifier: Arc::new(classifier),
    }
  }

  #[test]
  fn test_status_mapping() {
    assert_eq!(status_for(&AnalysisError::EmptyRange(Utc::now())), StatusCode::NOT_FOUND);
    assert_eq!(status_for(&AnalysisError::ParseError("x".into())), StatusCode::BAD_REQUEST);
    assert_eq!(status_for(&AnalysisError::ProviderError("x".into())), StatusCode::BAD_GATEWAY);
    assert_eq!(status_for(&AnalysisError::ConfigError("x".into())), StatusCode::INTERNAL_SERVER_ERROR);
  }

  #[tokio::test]
  async fn test_get_analysis_builds_figure() {
    let mut price = MockPriceDataProvider::new();
    price
      .expect_fetch_history()
      .withf(|ticker, period, interval| ticker == "TSLA" && *period == Period::FiveDays && *interval == Interval::OneDay)
      .times(1)
      .returning(|_, _, _| Ok(series()));

    let query = AnalysisQuery {
      period: Some("5d".into()),
      interval: Some("1d".into()),
      anchor_date: Some("2024-01-04".into()),
    };
    let state = state(price, None, MockSentimentClassifier::new());

    let Json(response) = get_analysis(Path("tsla".into()), Query(query), State(state)).await.unwrap();
    assert_eq!(response.ticker, "TSLA");
    assert_eq!(response.rows, 5);
    // 2024-01-04 00:00 (UTC-5) = 05:00 UTC, 세 번째 봉
    assert_eq!(response.indicators.anchored_vwap.as_ref().and_then(|a| a.first_defined()), Some(2));
    assert_eq!(response.figure.layout.title, "TSLA Analysis");
  }

  #[tokio::test]
  async fn test_get_analysis_bad_period_is_400() {
    let state = state(MockPriceDataProvider::new(), None, MockSentimentClassifier::new());
    let query = AnalysisQuery { period: Some("7y".into()), ..Default::default() };

    let err = get_analysis(Path("TSLA".into()), Query(query), State(state)).await.unwrap_err();
    assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn test_get_analysis_empty_is_404() {
    let mut price = MockPriceDataProvider::new();
    price
      .expect_fetch_history()
      .returning(|ticker, _, _| OhlcvSeries::utc(ticker, vec![]));
    let state = state(price, None, MockSentimentClassifier::new());

    let err = get_analysis(Path("ZZZZ".into()), Query(AnalysisQuery::default()), State(state)).await.unwrap_err();
    assert!(matches!(err.0, AnalysisError::EmptyInput { .. }));
    assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn test_get_sentiment_without_news_provider() {
    let state = state(MockPriceDataProvider::new(), None, MockSentimentClassifier::new());
    let err = get_sentiment(Path("TSLA".into()), Query(SentimentQuery::default()), State(state)).await.unwrap_err();
    assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
  }

  #[tokio::test]
  async fn test_get_sentiment_scores_headlines() {
    let mut news = MockNewsProvider::new();
    news
      .expect_fetch_headlines()
      .withf(|q, start, end| q == "TSLA" && start < end)
      .returning(|_, _, _| Ok(vec![Article::new("Tesla soars", "https://a"), Article::new("Tesla slumps", "https://b")]));

    let mut classifier = MockSentimentClassifier::new();
    classifier.expect_classify().returning(|text| {
      let label = if text.contains("soars") { SentimentLabel::Positive } else { SentimentLabel::Negative };
      Ok(Classification::new(label, 0.8))
    });

    let state = state(MockPriceDataProvider::new(), Some(news), classifier);
    let query = SentimentQuery { start: Some("2024-05-01".into()), end: Some("2024-05-08".into()) };

    let Json(report) = get_sentiment(Path("tsla".into()), Query(query), State(state)).await.unwrap();
    assert_eq!(report.articles.len(), 2);
    assert!((report.score - 0.4).abs() < 1e-12);
  }

  #[tokio::test]
  async fn test_default_anchor_follows_last_bar() {
    // 2024년 데이터: 오늘 기준 lookback이면 마지막 봉 이후가 되어 404가 난다
    let mut price = MockPriceDataProvider::new();
    price.expect_fetch_history().returning(|_, _, _| Ok(series()));

    let mut config = Config::default();
    config.indicators.anchor_lookback_days = 2;
    let mut state = state(price, None, MockSentimentClassifier::new());
    state.config = Arc::new(config);

    let query = AnalysisQuery { anchor_date: Some("".into()), ..Default::default() };
    let Json(response) = get_analysis(Path("TSLA".into()), Query(query), State(state)).await.unwrap();

    // 마지막 봉 2024-01-06 (UTC-5) - 2일 = 2024-01-04 00:00 (UTC-5)
    assert_eq!(response.anchor, Some(Utc.with_ymd_and_hms(2024, 1, 4, 5, 0, 0).unwrap()));
    assert_eq!(response.indicators.anchored_vwap.as_ref().and_then(|a| a.first_defined()), Some(2));
  }

  #[tokio::test]
  async fn test_health_reports_classifier_status() {
    let mut classifier = MockSentimentClassifier::new();
    classifier.expect_health_check().times(1).returning(|| Ok(true));
    let state_up = state(MockPriceDataProvider::new(), None, classifier);
    let Json(h) = health(State(state_up)).await;
    assert_eq!(h.status, "ok");
    assert_eq!(h.classifier, "up");
    assert!(!h.news_configured);

    let mut classifier = MockSentimentClassifier::new();
    classifier
      .expect_health_check()
      .returning(|| Err(AnalysisError::ClassifierError("connection refused".into())));
    let state_down = state(MockPriceDataProvider::new(), Some(MockNewsProvider::new()), classifier);
    let Json(h) = health(State(state_down)).await;
    assert_eq!(h.status, "ok");
    assert_eq!(h.classifier, "unreachable");
    assert!(h.news_configured);
  }

  #[test]
  fn test_dashboard_builds_dom_without_markup_injection() {
    assert!(!DASHBOARD_HTML.contains("innerHTML"));
    assert!(DASHBOARD_HTML.contains("textContent"));
    assert!(DASHBOARD_HTML.contains(r#"parsed.protocol === "http:" || parsed.protocol === "https:""#));
  }
}
