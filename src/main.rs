/**
* filename : main
* author : HAMA
* date: 2025. 5. 8.
* description: 대시보드 서버 / 단발성 분석 실행
**/

use anyhow::Context;

use stock_insight::analysis::{analyze_news_sentiment, analyze_stock, SentimentSettings, StockRequest};
use stock_insight::config::Config;
use stock_insight::http::{self, AppState};
use stock_insight::utils::{self, logging};
use stock_insight::{Interval, Period, VERSION};

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // 설정 로드 후 로깅 초기화
    let config = Config::load().context("설정 로드 실패")?;
    logging::init(&config.logging.level)?;
    log::info!("stock_insight {} 시작...", VERSION);

    // 명령줄 인수 확인
    let args: Vec<String> = std::env::args().collect();

    match args.get(1).map(String::as_str) {
        Some("analyze") => run_analyze(config, &args[2..]).await?,
        Some("serve") | None => run_server(config).await?,
        Some(other) => {
            eprintln!("알 수 없는 명령: {}", other);
            eprintln!("사용법: stock_insight [serve | analyze <TICKER> [PERIOD] [INTERVAL] [ANCHOR_DATE]]");
            std::process::exit(2);
        }
    }

    Ok(())
}

async fn run_server(config: Config) -> Result<(), anyhow::Error> {
    let state = AppState::from_config(config)?;
    http::serve(state).await?;
    Ok(())
}

async fn run_analyze(config: Config, args: &[String]) -> Result<(), anyhow::Error> {
    let ticker = args.first().context("티커를 입력하세요 (예: analyze TSLA)")?;
    let period: Period = match args.get(1) {
        Some(p) => p.parse()?,
        None => Period::default(),
    };
    let interval: Interval = match args.get(2) {
        Some(i) => i.parse()?,
        None => Interval::default(),
    };
    let today = utils::today_utc();

    let state = AppState::from_config(config)?;
    let mut request = StockRequest::new(ticker.as_str(), period, interval)
        .with_anchor_lookback(state.config.indicators.anchor_lookback_days)
        .with_averages(
            state.config.indicators.sma_windows.clone(),
            state.config.indicators.ema_spans.clone(),
        );
    // 앵커 날짜가 없으면 마지막 봉 날짜 기준으로 계산
    if let Some(d) = args.get(3) {
        request = request.with_anchor_date(utils::parse_date(d)?);
    }

    let analysis = analyze_stock(state.price_provider.as_ref(), &request).await?;

    println!("\n=== {} ({} / {}) ===", analysis.ticker, analysis.period, analysis.interval);
    if let Some((start, end)) = analysis.date_range() {
        println!("기간: {} ~ {} ({}개 봉)", start, end, analysis.series.len());
    }
    if let Some(last) = analysis.series.bars().last() {
        println!("최근 종가: {:.2}", last.close);
    }

    let ind = &analysis.indicators;
    for series in ind.sma.iter().chain(ind.ema.iter()).chain(std::iter::once(&ind.vwap)) {
        print_last(&series.name, series.last_value());
    }
    if let (Some(anchored), Some(anchor)) = (&ind.anchored_vwap, analysis.anchor) {
        print_last(&format!("{} (since {})", anchored.name, anchor), anchored.last_value());
    }

    // 뉴스 감성 (API 키가 있을 때만)
    if let Some(news) = &state.news_provider {
        let (start, end) = utils::default_news_range(today);
        let settings = SentimentSettings::from(&state.config.sentiment_api);
        let report = analyze_news_sentiment(
            news.as_ref(),
            state.classifier.as_ref(),
            &settings,
            &analysis.ticker,
            start,
            end,
        )
        .await?;

        println!("\n=== 뉴스 감성 ({} ~ {}) ===", report.start, report.end);
        println!("점수: {:.4} ({}건)", report.score, report.articles.len());
        for article in &report.articles {
            println!("[{} {:.2}] {}", article.sentiment, article.confidence, article.title);
        }
    }

    Ok(())
}

fn print_last(name: &str, value: Option<f64>) {
    match value {
        Some(v) => println!("{}: {:.2}", name, v),
        None => println!("{}: -", name),
    }
}
