//! Synthesis stage: one reasoning call producing the final report

use crate::config::PipelineConfig;
use crate::prompts::PromptBuilder;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use strategist_core::{
    PipelinePhase, Result, SharedState, Stage, StageError, StateField, StateUpdate,
};
use strategist_llm::{CompletionRequest, LLMProvider, Message, StopReason};
use tracing::{debug, info, warn};

/// Asks the reasoning collaborator for the markdown report
///
/// Any failure here is returned to the driver, which aborts the run.
pub struct SynthesisStage {
    provider: Arc<dyn LLMProvider>,
    prompts: PromptBuilder,
    model: String,
    temperature: f32,
    max_tokens: usize,
    timeout: Duration,
}

impl SynthesisStage {
    pub fn new(provider: Arc<dyn LLMProvider>, config: &PipelineConfig) -> Self {
        Self {
            provider,
            prompts: PromptBuilder::new(config.language),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            timeout: config.reasoning_timeout,
        }
    }

    fn request(&self, state: &SharedState) -> Result<CompletionRequest> {
        let prompt = self.prompts.build(state)?;

        Ok(CompletionRequest::builder(&self.model)
            .system(prompt.system)
            .add_message(Message::user(prompt.user))
            .max_tokens(self.max_tokens)
            .temperature(self.temperature)
            .build())
    }
}

#[async_trait]
impl Stage for SynthesisStage {
    fn name(&self) -> &'static str {
        "synthesis"
    }

    fn phase(&self) -> PipelinePhase {
        PipelinePhase::Synthesis
    }

    fn owned_fields(&self) -> &'static [StateField] {
        &[StateField::FinalReport]
    }

    async fn run(&self, state: &SharedState) -> Result<StateUpdate> {
        let request = self.request(state)?;
        let provider = self.provider.name();
        info!(provider, model = %self.model, "Requesting synthesis");

        let response = tokio::time::timeout(self.timeout, self.provider.complete(request))
            .await
            .map_err(|_| {
                StageError::ReasoningFailure(format!(
                    "{provider} timed out after {}s",
                    self.timeout.as_secs_f64()
                ))
            })?
            .map_err(|e| StageError::ReasoningFailure(format!("{provider}: {e}")))?;

        debug!(
            stop_reason = ?response.stop_reason,
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            "Synthesis response received"
        );
        if response.stop_reason == StopReason::MaxTokens {
            warn!(max_tokens = self.max_tokens, "Report truncated at the token limit");
        }

        let report = response.message.text().ok_or_else(|| {
            StageError::ReasoningFailure(format!("{provider} returned an empty report"))
        })?;

        Ok(StateUpdate::report(report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReportLanguage;
    use std::sync::Mutex;
    use strategist_core::{Digest, TechnicalSnapshot};
    use strategist_llm::{CompletionResponse, LLMError, Role};

    /// Captures the request and replies with a fixed outcome
    struct Scripted {
        reply: std::result::Result<CompletionResponse, String>,
        seen: Mutex<Vec<CompletionRequest>>,
    }

    impl Scripted {
        fn new(reply: std::result::Result<CompletionResponse, String>) -> Self {
            Self {
                reply,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl LLMProvider for Scripted {
        async fn complete(
            &self,
            request: CompletionRequest,
        ) -> strategist_llm::Result<CompletionResponse> {
            self.seen.lock().unwrap().push(request);
            self.reply.clone().map_err(LLMError::RequestFailed)
        }

        fn name(&self) -> &'static str {
            "scripted"
        }
    }

    fn state() -> SharedState {
        SharedState::new("EURUSD=X", "EURUSD")
            .merge(StateUpdate::technicals(TechnicalSnapshot::no_data()))
            .unwrap()
            .merge(StateUpdate::news(Digest::Available("- ECB holds rates".to_string())))
            .unwrap()
            .merge(StateUpdate::web_strategy(Digest::Unavailable(
                "Could not fetch web strategies.".to_string(),
            )))
            .unwrap()
    }

    fn stage(provider: Arc<Scripted>) -> SynthesisStage {
        let config = PipelineConfig::builder()
            .language(ReportLanguage::French)
            .build()
            .unwrap();
        SynthesisStage::new(provider, &config)
    }

    #[tokio::test]
    async fn test_report_stored_verbatim() {
        let report = "# DECISION: WAIT\n\n## 1. Synthèse de la Situation\n...";
        let provider = Arc::new(Scripted::new(Ok(CompletionResponse::text(report))));

        let update = stage(provider.clone()).run(&state()).await.unwrap();
        assert_eq!(update, StateUpdate::report(report));

        let seen = provider.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        let request = &seen[0];
        assert_eq!(request.model, "gemini-2.5-flash");
        assert_eq!(request.messages.len(), 1);
        assert_eq!(request.messages[0].role, Role::User);
        assert!(request.system.as_deref().unwrap().contains("written in French"));
        assert!(
            request
                .user_text()
                .unwrap()
                .starts_with("ASSET: EURUSD (EURUSD=X)")
        );
    }

    #[tokio::test]
    async fn test_truncated_report_is_kept() {
        let mut response = CompletionResponse::text("# DECISION: BUY\n## 1.");
        response.stop_reason = StopReason::MaxTokens;
        let provider = Arc::new(Scripted::new(Ok(response)));

        let update = stage(provider).run(&state()).await.unwrap();
        assert_eq!(update.final_report.as_deref(), Some("# DECISION: BUY\n## 1."));
    }

    #[tokio::test]
    async fn test_provider_error_is_reasoning_failure() {
        let provider = Arc::new(Scripted::new(Err("quota exceeded".to_string())));

        let err = stage(provider).run(&state()).await.unwrap_err();
        let StageError::ReasoningFailure(reason) = err else {
            panic!("expected a reasoning failure");
        };
        assert!(reason.contains("quota exceeded"));
    }

    #[tokio::test]
    async fn test_blank_report_is_reasoning_failure() {
        let provider = Arc::new(Scripted::new(Ok(CompletionResponse::text("  \n"))));

        let err = stage(provider).run(&state()).await.unwrap_err();
        assert!(!err.is_recoverable());
    }
}
