//! End-to-end runs of the pipeline against in-process collaborators

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use mockall::mock;
use std::sync::Arc;
use strategist_core::{Digest, PipelinePhase, SharedState, StageError, StateUpdate, Trend};
use strategist_llm::{CompletionRequest, CompletionResponse, LLMError, LLMProvider};
use strategist_market::{
    Bar, Lookback, MarketError, NewsItem, NewsResponse, NewsSearch, PriceHistory, WebResult,
    WebSearch,
};
use strategist_workflow::{
    Decision, Execution, NEWS_PLACEHOLDER, Pipeline, PipelineError, StageStatus,
    WEB_PLACEHOLDER,
};

mock! {
    pub Llm {}

    #[async_trait]
    impl LLMProvider for Llm {
        async fn complete(
            &self,
            request: CompletionRequest,
        ) -> strategist_llm::Result<CompletionResponse>;

        fn name(&self) -> &'static str;
    }
}

struct FakeHistory(Option<Vec<Bar>>);

#[async_trait]
impl PriceHistory for FakeHistory {
    async fn get_bars(
        &self,
        _instrument_id: &str,
        _lookback: Lookback,
    ) -> strategist_market::Result<Vec<Bar>> {
        self.0
            .clone()
            .ok_or_else(|| MarketError::YahooFinanceError("no route to host".to_string()))
    }

    fn name(&self) -> &'static str {
        "fake-history"
    }
}

struct FakeNews(Option<Vec<&'static str>>);

#[async_trait]
impl NewsSearch for FakeNews {
    async fn search_news(&self, _symbol: &str) -> strategist_market::Result<NewsResponse> {
        let titles = self
            .0
            .clone()
            .ok_or_else(|| MarketError::ApiError("connection refused".to_string()))?;
        Ok(NewsResponse::ok(
            titles
                .into_iter()
                .map(|title| NewsItem {
                    title: title.to_string(),
                })
                .collect(),
        ))
    }

    fn name(&self) -> &'static str {
        "fake-news"
    }
}

struct FakeWeb(Option<Vec<WebResult>>);

#[async_trait]
impl WebSearch for FakeWeb {
    async fn search_web(
        &self,
        _query: &str,
        _max_results: usize,
    ) -> strategist_market::Result<Vec<WebResult>> {
        self.0
            .clone()
            .ok_or_else(|| MarketError::ApiError("401 unauthorized".to_string()))
    }

    fn name(&self) -> &'static str {
        "fake-web"
    }
}

/// 90 daily closes alternating +0.010 / -0.008 from 1.08
fn rising_eurusd() -> Vec<Bar> {
    let start = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
    let mut close = 1.08;
    (0..90)
        .map(|i| {
            if i > 0 {
                close += if i % 2 == 1 { 0.010 } else { -0.008 };
            }
            Bar::from_close(start + Duration::days(i), close)
        })
        .collect()
}

fn headlines() -> Option<Vec<&'static str>> {
    Some(vec!["ECB holds rates", "Dollar slips after payrolls"])
}

fn web_results() -> Option<Vec<WebResult>> {
    Some(vec![WebResult {
        url: "https://fx.example/eurusd".to_string(),
        content: "Buy dips toward 1.16 support.".to_string(),
    }])
}

fn pipeline(
    bars: Option<Vec<Bar>>,
    news: Option<Vec<&'static str>>,
    web: Option<Vec<WebResult>>,
    llm: MockLlm,
) -> Pipeline {
    Pipeline::builder()
        .price_history(Arc::new(FakeHistory(bars)))
        .news_search(Arc::new(FakeNews(news)))
        .web_search(Arc::new(FakeWeb(web)))
        .llm_provider(Arc::new(llm))
        .build()
        .unwrap()
}

fn answering_llm(report: &'static str, expect_user: impl Fn(&str) -> bool + Send + 'static) -> MockLlm {
    let mut llm = MockLlm::new();
    llm.expect_name().return_const("mock-llm");
    llm.expect_complete()
        .withf(move |request| request.user_text().is_some_and(&expect_user))
        .times(1)
        .returning(move |_| Ok(CompletionResponse::text(report)));
    llm
}

const LINEAR_TRAIL: [PipelinePhase; 6] = [
    PipelinePhase::Init,
    PipelinePhase::Technicals,
    PipelinePhase::News,
    PipelinePhase::WebStrategy,
    PipelinePhase::Synthesis,
    PipelinePhase::Done,
];

#[tokio::test]
async fn rising_series_produces_report() {
    let report = "# DECISION: BUY\n\n## 1. Situation Synthesis\nTrend and news agree.";
    let llm = answering_llm(report, |user| {
        user.starts_with("ASSET: EURUSD (EURUSD=X)")
            && user.contains("trend_sma: BULLISH")
            && user.contains("- ECB holds rates\n- Dollar slips after payrolls")
            && user.contains("Source: https://fx.example/eurusd")
    });
    let pipeline = pipeline(Some(rising_eurusd()), headlines(), web_results(), llm);

    let execution = pipeline
        .execute(SharedState::new("EURUSD=X", "EURUSD"))
        .await;
    assert_eq!(execution.trail(), &LINEAR_TRAIL);

    let state = execution.state();
    let indicators = state
        .technical_snapshot()
        .and_then(|snapshot| snapshot.indicators())
        .unwrap();
    assert_eq!(indicators.trend_sma, Trend::Bullish);
    assert!(indicators.sma20 > indicators.sma50);
    assert!(indicators.rsi > 50.0 && indicators.rsi < 62.0);
    assert_eq!(indicators.price, 1.178);
    assert_eq!(indicators.previous_close, 1.168);

    assert_eq!(state.final_report(), Some(report));
    assert_eq!(Decision::from_report(report), Some(Decision::Buy));
    assert_eq!(execution.summary().degraded_count(), 0);
}

#[tokio::test]
async fn run_returns_report_text() {
    let llm = answering_llm("# DECISION: WAIT", |_| true);
    let pipeline = pipeline(Some(rising_eurusd()), headlines(), web_results(), llm);

    let report = pipeline.run("EURUSD=X", "EURUSD").await.unwrap();
    assert_eq!(report, "# DECISION: WAIT");
}

#[tokio::test]
async fn empty_history_still_reaches_done() {
    let llm = answering_llm("# DECISION: WAIT", |user| {
        user.contains("--- TECHNICAL DATA ---\nerror: no data\n")
    });
    let pipeline = pipeline(Some(Vec::new()), headlines(), web_results(), llm);

    let execution = pipeline
        .execute(SharedState::new("EURUSD=X", "EURUSD"))
        .await;

    assert_eq!(execution.trail(), &LINEAR_TRAIL);
    let snapshot = serde_json::to_value(execution.state().technical_snapshot().unwrap()).unwrap();
    assert_eq!(snapshot, serde_json::json!({ "error": "no data" }));
    assert_eq!(
        execution.summary().stages[0].status,
        StageStatus::Degraded
    );
}

#[tokio::test]
async fn reasoning_fault_aborts_without_report() {
    let mut llm = MockLlm::new();
    llm.expect_name().return_const("mock-llm");
    llm.expect_complete()
        .times(1)
        .returning(|_| Err(LLMError::RateLimitExceeded("quota exhausted".to_string())));
    let pipeline = pipeline(Some(rising_eurusd()), headlines(), web_results(), llm);

    let execution = pipeline
        .execute(SharedState::new("EURUSD=X", "EURUSD"))
        .await;

    assert_eq!(
        execution.trail(),
        &[
            PipelinePhase::Init,
            PipelinePhase::Technicals,
            PipelinePhase::News,
            PipelinePhase::WebStrategy,
            PipelinePhase::Synthesis,
            PipelinePhase::Aborted,
        ]
    );
    assert_eq!(execution.state().final_report(), None);
    assert!(execution.state().news_digest().is_some());

    let Execution::Aborted { error, .. } = execution else {
        panic!("expected an aborted run");
    };
    let PipelineError::Aborted { phase, source } = error else {
        panic!("expected a stage failure");
    };
    assert_eq!(phase, PipelinePhase::Synthesis);
    assert!(matches!(source, StageError::ReasoningFailure(ref reason) if reason.contains("quota exhausted")));
}

#[tokio::test]
async fn run_surfaces_reasoning_fault() {
    let mut llm = MockLlm::new();
    llm.expect_name().return_const("mock-llm");
    llm.expect_complete()
        .times(1)
        .returning(|_| Ok(CompletionResponse::text("")));
    let pipeline = pipeline(Some(rising_eurusd()), headlines(), web_results(), llm);

    let err = pipeline.run("EURUSD=X", "EURUSD").await.unwrap_err();
    assert_eq!(err.phase(), Some(PipelinePhase::Synthesis));
}

#[tokio::test]
async fn data_faults_degrade_to_placeholders() {
    let llm = answering_llm("# DECISION: WAIT", |user| {
        user.contains(&format!("--- BREAKING NEWS ---\n{NEWS_PLACEHOLDER}"))
            && user.ends_with(&format!("--- WEB STRATEGIES ---\n{WEB_PLACEHOLDER}"))
    });
    let pipeline = pipeline(None, None, None, llm);

    let execution = pipeline
        .execute(SharedState::new("EURUSD=X", "EURUSD"))
        .await;
    assert!(execution.is_done());

    let state = execution.state();
    assert_eq!(
        state.news_digest(),
        Some(&Digest::Unavailable(NEWS_PLACEHOLDER.to_string()))
    );
    assert_eq!(
        state.web_strategy_digest(),
        Some(&Digest::Unavailable(WEB_PLACEHOLDER.to_string()))
    );
    assert!(state.technical_snapshot().unwrap().is_degraded());
    assert_eq!(execution.summary().degraded_count(), 3);
}

#[tokio::test]
async fn pipeline_is_reusable_across_runs() {
    let mut llm = MockLlm::new();
    llm.expect_name().return_const("mock-llm");
    llm.expect_complete()
        .times(2)
        .returning(|request| {
            let asset = request.user_text().unwrap_or_default().lines().next().unwrap_or_default().to_string();
            Ok(CompletionResponse::text(format!("# DECISION: WAIT\n{asset}")))
        });
    let pipeline = pipeline(Some(rising_eurusd()), headlines(), web_results(), llm);

    let first = pipeline.run("EURUSD=X", "EURUSD").await.unwrap();
    let second = pipeline.run("GBPUSD=X", "GBPUSD").await.unwrap();
    assert!(first.ends_with("ASSET: EURUSD (EURUSD=X)"));
    assert!(second.ends_with("ASSET: GBPUSD (GBPUSD=X)"));
}

#[test]
fn merge_is_idempotent() {
    let state = SharedState::new("EURUSD=X", "EURUSD");
    let update = StateUpdate::news(Digest::Available("- ECB holds rates".to_string()));

    let once = state.merge(update.clone()).unwrap();
    let twice = once.merge(update).unwrap();
    assert_eq!(once, twice);
}
