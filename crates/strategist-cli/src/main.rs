//! Command-line interface for market-strategist

mod summary;

use anyhow::Context;
use clap::Parser;
use std::sync::Arc;
use strategist_core::SharedState;
use strategist_llm::providers::GeminiProvider;
use strategist_market::{MarketConfig, TavilySearch, TradingViewNews, YahooPriceHistory};
use strategist_utils::AppConfig;
use strategist_workflow::{Decision, Execution, Pipeline, PipelineConfig, ReportLanguage};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "strategist")]
#[command(about = "Technicals, news and web commentary merged into one trading report", long_about = None)]
struct Args {
    /// Instrument identifier used for price history
    #[arg(short, long, default_value = "EURUSD=X")]
    ticker: String,

    /// Display symbol used for news and web search
    #[arg(short, long, default_value = "EURUSD")]
    symbol: String,

    /// Language of the report narrative (en, fr)
    #[arg(short, long)]
    language: Option<ReportLanguage>,

    /// Override the reasoning model
    #[arg(long)]
    model: Option<String>,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let dotenv = strategist_utils::load_dotenv()?;
    let args = Args::parse();

    if args.json_logs {
        strategist_utils::init_tracing_json()?;
    } else {
        strategist_utils::init_tracing()?;
    }

    let app = AppConfig::from_env();
    info!(app = %app.app_name, environment = %app.environment, ?dotenv, "Starting strategist");

    let market = MarketConfig::builder().with_env().build()?;
    let mut builder = PipelineConfig::builder().with_env().market(market);
    if let Some(language) = args.language {
        builder = builder.language(language);
    }
    if let Some(model) = args.model {
        builder = builder.model(model);
    }
    let config = builder.build()?;

    let pipeline = Pipeline::builder()
        .price_history(Arc::new(YahooPriceHistory::new()))
        .news_search(Arc::new(TradingViewNews::new(&config.market)?))
        .web_search(Arc::new(
            TavilySearch::new(&config.market).context("web search is not configured")?,
        ))
        .llm_provider(Arc::new(
            GeminiProvider::from_env().context("reasoning provider is not configured")?,
        ))
        .config(config)
        .build()?;
    info!(stages = ?pipeline.stage_names(), "Pipeline ready");

    let execution = pipeline
        .execute(SharedState::new(&args.ticker, &args.symbol))
        .await;

    if let Some(snapshot) = execution.state().technical_snapshot() {
        println!("{}", summary::technicals_table(snapshot));
    }
    println!("{}", summary::stages_table(&execution));

    match execution {
        Execution::Done { state, .. } => {
            let report = state.into_report().unwrap_or_default();
            println!("\n{}\n", summary::rule());
            println!("{report}");
            println!("\n{}\n", summary::rule());

            match Decision::from_report(&report) {
                Some(decision) => println!("Decision: {decision}"),
                None => warn!("Report has no recognizable decision line"),
            }
            Ok(())
        }
        Execution::Aborted { error, .. } => Err(error).context("analysis did not complete"),
    }
}
