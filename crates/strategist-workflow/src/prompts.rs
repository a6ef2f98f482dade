//! Prompt templates for the synthesis stage
//!
//! Both prompts are MiniJinja templates. The system prompt carries the role,
//! the correlation rule and the report format; the user prompt carries the
//! gathered data in three delimited sections.

use crate::config::ReportLanguage;
use crate::error::PromptError;
use minijinja::Environment;
use serde::Serialize;
use strategist_core::{Digest, SharedState, TechnicalSnapshot};

const SYSTEM_TEMPLATE: &str = r"You are a Senior Hedge Fund Portfolio Manager. Your goal is to make a high-stakes trading decision on {{ symbol_name }} based on multiple data sources.

You have access to 3 types of data:
1. **Technical Analysis (Hard Data):** RSI, moving averages and the resulting trend.
2. **Market News (Sentiment):** Real-time headlines affecting the asset.
3. **Web Strategies (Smart Money):** What other analysts are currently discussing.

Some sections may only say that the data could not be fetched. Treat them as missing evidence, not as a signal.

YOUR TASK:
Analyze the correlation between the Technicals and the News.
- If the Technicals say BUY but the News is very negative (e.g. war, tariffs), you must be CAUTIOUS: prefer WAIT or SELL.
- If both align, the signal is STRONG.

OUTPUT FORMAT:
Return a structured Markdown report written in {{ language }}.
The first line must be the decision, in English and in capitals, exactly one of:
# DECISION: BUY
# DECISION: SELL
# DECISION: WAIT

## 1. {{ headings.synthesis }}
Explain the context. Is the market driven by fear (news) or greed? Is there a clash between technicals and news?

## 2. {{ headings.arguments }}
* **{{ headings.technical }}:** [Analyze the RSI/SMA levels]
* **{{ headings.news }}:** [Analyze the impact of the fetched news]
* **{{ headings.sentiment }}:** [What are the blogs and analysts saying?]

## 3. {{ headings.strategy }}
Propose a concrete strategy (e.g. wait for a pullback to X, enter now with a tight stop).
* **Entry Price:** ...
* **Stop Loss:** ... (a logical level derived from the data)
* **Take Profit:** ...

## 4. {{ headings.rationale }}
Give a solid argument for why this specific plan minimizes risk.";

const USER_TEMPLATE: &str = r"ASSET: {{ symbol_name }} ({{ instrument_id }})

--- TECHNICAL DATA ---
{% for entry in technicals -%}
{{ entry.key }}: {{ entry.value }}
{% endfor %}
--- BREAKING NEWS ---
{{ news }}

--- WEB STRATEGIES ---
{{ web_strategies }}";

/// Section titles of the report, per narrative language
#[derive(Debug, Clone, Copy, Serialize)]
struct Headings {
    synthesis: &'static str,
    arguments: &'static str,
    technical: &'static str,
    news: &'static str,
    sentiment: &'static str,
    strategy: &'static str,
    rationale: &'static str,
}

impl Headings {
    fn for_language(language: ReportLanguage) -> Self {
        match language {
            ReportLanguage::English => Self {
                synthesis: "Situation Synthesis",
                arguments: "Key Arguments",
                technical: "Technical",
                news: "Fundamentals & News",
                sentiment: "Web Sentiment",
                strategy: "Recommended Strategy",
                rationale: "Why this strategy?",
            },
            ReportLanguage::French => Self {
                synthesis: "Synthèse de la Situation",
                arguments: "Arguments Clés",
                technical: "Technique",
                news: "Fondamental & News",
                sentiment: "Sentiment Web",
                strategy: "Stratégie Recommandée",
                rationale: "Pourquoi cette stratégie ?",
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct Entry {
    key: &'static str,
    value: String,
}

/// Rendered prompt pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesisPrompt {
    pub system: String,
    pub user: String,
}

/// Renders the synthesis prompts for one narrative language
#[derive(Debug, Clone, Copy, Default)]
pub struct PromptBuilder {
    language: ReportLanguage,
}

impl PromptBuilder {
    pub fn new(language: ReportLanguage) -> Self {
        Self { language }
    }

    /// Render both prompts from the accumulated state
    ///
    /// Fields not written yet are rendered as their placeholder text.
    pub fn build(&self, state: &SharedState) -> Result<SynthesisPrompt, PromptError> {
        let system = render(
            "system",
            SYSTEM_TEMPLATE,
            minijinja::context! {
                symbol_name => state.symbol_name(),
                language => self.language.name(),
                headings => Headings::for_language(self.language),
            },
        )?;

        let snapshot = state
            .technical_snapshot()
            .cloned()
            .unwrap_or_else(TechnicalSnapshot::no_data);
        let technicals: Vec<Entry> = snapshot
            .entries()
            .into_iter()
            .map(|(key, value)| Entry { key, value })
            .collect();

        let user = render(
            "user",
            USER_TEMPLATE,
            minijinja::context! {
                symbol_name => state.symbol_name(),
                instrument_id => state.instrument_id(),
                technicals => technicals,
                news => state.news_digest().map_or("", Digest::text),
                web_strategies => state.web_strategy_digest().map_or("", Digest::text),
            },
        )?;

        Ok(SynthesisPrompt { system, user })
    }
}

fn render(name: &str, source: &str, ctx: minijinja::Value) -> Result<String, PromptError> {
    let env = Environment::new();
    env.render_str(source, ctx)
        .map_err(|e| PromptError::RenderError {
            name: name.to_string(),
            detail: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use strategist_core::{StateUpdate, TechnicalIndicators, Trend};

    fn populated_state() -> SharedState {
        SharedState::new("EURUSD=X", "EURUSD")
            .merge(StateUpdate::technicals(TechnicalSnapshot::Indicators(
                TechnicalIndicators {
                    price: 1.0842,
                    rsi: 58.2,
                    sma20: 1.081,
                    sma50: 1.075,
                    trend_sma: Trend::Bullish,
                    previous_close: 1.0831,
                },
            )))
            .unwrap()
            .merge(StateUpdate::news(Digest::Available(
                "- ECB holds rates\n- Dollar slips".to_string(),
            )))
            .unwrap()
            .merge(StateUpdate::web_strategy(Digest::Unavailable(
                "Could not fetch web strategies.".to_string(),
            )))
            .unwrap()
    }

    #[test]
    fn test_user_prompt_sections() {
        let prompt = PromptBuilder::default().build(&populated_state()).unwrap();
        let user = &prompt.user;

        assert!(user.starts_with("ASSET: EURUSD (EURUSD=X)\n"));
        assert!(user.contains("--- TECHNICAL DATA ---\nprice: 1.0842\nrsi: 58.2\n"));
        assert!(user.contains("trend_sma: BULLISH\n"));
        assert!(user.contains("--- BREAKING NEWS ---\n- ECB holds rates\n- Dollar slips"));
        assert!(user.ends_with("--- WEB STRATEGIES ---\nCould not fetch web strategies."));

        let technical = user.find("--- TECHNICAL DATA ---").unwrap();
        let news = user.find("--- BREAKING NEWS ---").unwrap();
        let web = user.find("--- WEB STRATEGIES ---").unwrap();
        assert!(technical < news && news < web);
    }

    #[test]
    fn test_unavailable_technicals_rendered_as_error() {
        let state = SharedState::new("EURUSD=X", "EURUSD")
            .merge(StateUpdate::technicals(TechnicalSnapshot::no_data()))
            .unwrap();
        let prompt = PromptBuilder::default().build(&state).unwrap();
        assert!(prompt.user.contains("--- TECHNICAL DATA ---\nerror: no data\n"));
    }

    #[test]
    fn test_system_prompt_format_obligation() {
        let prompt = PromptBuilder::default().build(&populated_state()).unwrap();
        let system = &prompt.system;

        assert!(system.contains("Senior Hedge Fund Portfolio Manager"));
        assert!(system.contains("# DECISION: BUY"));
        assert!(system.contains("# DECISION: WAIT"));
        assert!(system.contains("## 1. Situation Synthesis"));
        assert!(system.contains("## 3. Recommended Strategy"));
        assert!(system.contains("Stop Loss"));
        assert!(system.contains("written in English"));
    }

    #[test]
    fn test_french_headings_keep_english_label() {
        let prompt = PromptBuilder::new(ReportLanguage::French)
            .build(&populated_state())
            .unwrap();

        assert!(prompt.system.contains("written in French"));
        assert!(prompt.system.contains("## 2. Arguments Clés"));
        assert!(prompt.system.contains("# DECISION: SELL"));
    }
}
