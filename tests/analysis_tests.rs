//! 분석 흐름 테스트
//!
//! 시세/뉴스/분류기를 모의 객체로 대체해 분석 파이프라인을 검증

use chrono::{Duration, NaiveDate, TimeZone, Utc};

use stock_insight::analysis::{analyze_news_sentiment, analyze_stock, SentimentSettings, SentimentWeights, StockRequest};
use stock_insight::market_data::MockPriceDataProvider;
use stock_insight::models::news::{Article, Classification, SentimentLabel};
use stock_insight::news::{MockNewsProvider, MockSentimentClassifier};
use stock_insight::{AnalysisError, Bar, Interval, OhlcvSeries, Period};

// 뉴욕 장 마감 시각(21:00 UTC, UTC-5)으로 찍힌 일봉
fn new_york_daily(days: i64) -> OhlcvSeries {
  let t0 = Utc.with_ymd_and_hms(2024, 1, 2, 21, 0, 0).unwrap();
  let bars = (0..days)
    .map(|i| {
      let c = 200.0 + i as f64;
      Bar::new(t0 + Duration::days(i), c - 0.5, c + 1.0, c - 1.0, c, 1_000.0 + 10.0 * i as f64)
    })
    .collect();
  OhlcvSeries::new("TSLA", -5 * 3600, bars).unwrap()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
  NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[tokio::test]
async fn test_analyze_stock_computes_all_indicators() {
  let mut provider = MockPriceDataProvider::new();
  provider
    .expect_fetch_history()
    .withf(|ticker, period, interval| ticker == "TSLA" && *period == Period::SixMonths && *interval == Interval::OneDay)
    .times(1)
    .returning(|_, _, _| Ok(new_york_daily(30)));

  let request = StockRequest::new("tsla", Period::SixMonths, Interval::OneDay)
    .with_anchor_date(date(2024, 1, 10))
    .with_averages(vec![5, 20], vec![5]);

  let analysis = analyze_stock(&provider, &request).await.unwrap();

  assert_eq!(analysis.ticker, "TSLA");
  assert_eq!(analysis.series.len(), 30);
  assert_eq!(analysis.indicators.sma.len(), 2);
  assert_eq!(analysis.indicators.ema.len(), 1);
  assert_eq!(analysis.indicators.sma[0].first_defined(), Some(4));
  assert_eq!(analysis.indicators.normalized_volume[0], 0.0);
  assert_eq!(analysis.indicators.normalized_volume[29], 1.0);

  // 2024-01-10 자정(UTC-5) = 05:00 UTC, 첫 해당 봉은 1월 10일 21:00 UTC
  let anchor = analysis.anchor.unwrap();
  assert_eq!(anchor, Utc.with_ymd_and_hms(2024, 1, 10, 5, 0, 0).unwrap());
  let anchored = analysis.indicators.anchored_vwap.as_ref().unwrap();
  assert_eq!(anchored.first_defined(), Some(8));
  assert_eq!(anchored.get(8), Some(208.0));
}

#[tokio::test]
async fn test_default_anchor_counts_back_from_last_bar() {
  let mut provider = MockPriceDataProvider::new();
  provider.expect_fetch_history().returning(|_, _, _| Ok(new_york_daily(30)));

  // 마지막 봉은 2024-01-31 (UTC-5), 21일 전 = 2024-01-10
  let request = StockRequest::new("TSLA", Period::SixMonths, Interval::OneDay).with_anchor_lookback(21);
  let analysis = analyze_stock(&provider, &request).await.unwrap();

  assert_eq!(analysis.anchor, Some(Utc.with_ymd_and_hms(2024, 1, 10, 5, 0, 0).unwrap()));
  assert_eq!(analysis.indicators.anchored_vwap.unwrap().first_defined(), Some(8));
}

#[tokio::test]
async fn test_analyze_stock_empty_result() {
  let mut provider = MockPriceDataProvider::new();
  provider
    .expect_fetch_history()
    .returning(|ticker, _, _| OhlcvSeries::utc(ticker, vec![]));

  let request = StockRequest::new("NOPE", Period::OneMonth, Interval::OneHour);
  match analyze_stock(&provider, &request).await {
    Err(AnalysisError::EmptyInput { ticker, period, interval }) => {
      assert_eq!(ticker, "NOPE");
      assert_eq!(period, "1mo");
      assert_eq!(interval, "1h");
    }
    other => panic!("expected EmptyInput, got {:?}", other.map(|a| a.ticker)),
  }
}

#[tokio::test]
async fn test_analyze_stock_anchor_after_data() {
  let mut provider = MockPriceDataProvider::new();
  provider.expect_fetch_history().returning(|_, _, _| Ok(new_york_daily(5)));

  let request = StockRequest::new("TSLA", Period::FiveDays, Interval::OneDay)
    .with_anchor_date(date(2024, 6, 1));
  let result = analyze_stock(&provider, &request).await;
  assert!(matches!(result, Err(AnalysisError::EmptyRange(_))));
}

#[tokio::test]
async fn test_analyze_stock_provider_error_propagates() {
  let mut provider = MockPriceDataProvider::new();
  provider
    .expect_fetch_history()
    .returning(|_, _, _| Err(AnalysisError::ProviderError("chart API returned 500".into())));

  let request = StockRequest::new("TSLA", Period::OneYear, Interval::OneDay);
  let err = analyze_stock(&provider, &request).await.unwrap_err();
  assert!(matches!(err, AnalysisError::ProviderError(_)));
  assert!(!err.is_user_recoverable());
}

#[tokio::test]
async fn test_invalid_ticker_never_reaches_provider() {
  let mut provider = MockPriceDataProvider::new();
  provider.expect_fetch_history().times(0);

  let request = StockRequest::new("", Period::OneYear, Interval::OneDay);
  let err = analyze_stock(&provider, &request).await.unwrap_err();
  assert!(matches!(err, AnalysisError::InvalidParameter(_)));
}

fn headlines() -> Vec<Article> {
  vec![
    Article::new("Tesla beats delivery estimates", "https://news/1"),
    Article::new("Recall hits Tesla shares", "https://news/2"),
    Article::new("Tesla to hold annual meeting", "https://news/3"),
  ]
}

fn keyword_classifier() -> MockSentimentClassifier {
  let mut classifier = MockSentimentClassifier::new();
  classifier.expect_classify().times(3).returning(|text| {
    let c = if text.contains("beats") {
      Classification::new(SentimentLabel::Positive, 0.8)
    } else if text.contains("Recall") {
      Classification::new(SentimentLabel::Negative, 0.6)
    } else {
      Classification::new(SentimentLabel::Neutral, 0.9)
    };
    Ok(c)
  });
  classifier
}

#[tokio::test]
async fn test_news_sentiment_weighted_score() {
  let mut news = MockNewsProvider::new();
  news
    .expect_fetch_headlines()
    .withf(|q, s, e| q == "TSLA" && *s == date(2024, 5, 1) && *e == date(2024, 5, 8))
    .times(1)
    .returning(|_, _, _| Ok(headlines()));

  let classifier = keyword_classifier();
  let report = analyze_news_sentiment(
    &news,
    &classifier,
    &SentimentSettings::default(),
    "TSLA",
    date(2024, 5, 1),
    date(2024, 5, 8),
  )
  .await
  .unwrap();

  // 0.8 * 1.0 - 0.6 * 0.5
  assert!((report.score - 0.5).abs() < 1e-12);
  let labels: Vec<SentimentLabel> = report.articles.iter().map(|a| a.sentiment).collect();
  assert_eq!(labels, vec![SentimentLabel::Positive, SentimentLabel::Negative, SentimentLabel::Neutral]);
  assert_eq!(report.articles[1].url, "https://news/2");
}

#[tokio::test]
async fn test_news_sentiment_custom_weights() {
  let mut news = MockNewsProvider::new();
  news.expect_fetch_headlines().returning(|_, _, _| Ok(headlines()));

  let classifier = keyword_classifier();
  let settings = SentimentSettings {
    weights: SentimentWeights { positive: 1.0, negative: 1.0 },
    concurrency: 1,
  };
  let report = analyze_news_sentiment(&news, &classifier, &settings, "TSLA", date(2024, 5, 1), date(2024, 5, 8))
    .await
    .unwrap();
  assert!((report.score - 0.2).abs() < 1e-12);
}

#[tokio::test]
async fn test_news_sentiment_no_headlines() {
  let mut news = MockNewsProvider::new();
  news.expect_fetch_headlines().returning(|_, _, _| Ok(vec![]));
  let mut classifier = MockSentimentClassifier::new();
  classifier.expect_classify().times(0);

  let report = analyze_news_sentiment(
    &news,
    &classifier,
    &SentimentSettings::default(),
    "TSLA",
    date(2024, 5, 1),
    date(2024, 5, 8),
  )
  .await
  .unwrap();
  assert_eq!(report.score, 0.0);
  assert!(report.articles.is_empty());
}

#[tokio::test]
async fn test_classifier_failure_fails_report() {
  let mut news = MockNewsProvider::new();
  news.expect_fetch_headlines().returning(|_, _, _| Ok(headlines()));
  let mut classifier = MockSentimentClassifier::new();
  classifier
    .expect_classify()
    .returning(|_| Err(AnalysisError::ClassifierError("model unavailable".into())));

  let result = analyze_news_sentiment(
    &news,
    &classifier,
    &SentimentSettings::default(),
    "TSLA",
    date(2024, 5, 1),
    date(2024, 5, 8),
  )
  .await;
  assert!(matches!(result, Err(AnalysisError::ClassifierError(_))));
}

#[tokio::test]
async fn test_news_range_must_be_ordered() {
  let mut news = MockNewsProvider::new();
  news.expect_fetch_headlines().times(0);
  let classifier = MockSentimentClassifier::new();

  let result = analyze_news_sentiment(
    &news,
    &classifier,
    &SentimentSettings::default(),
    "TSLA",
    date(2024, 5, 8),
    date(2024, 5, 1),
  )
  .await;
  assert!(matches!(result, Err(AnalysisError::InvalidParameter(_))));
}
