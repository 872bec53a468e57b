//! The orchestrator.

use crate::disposition::{Disposition, HistoryAction};
use crate::transcript::render_transcript;
use gemrelay_config::AppConfig;
use gemrelay_core::error::ValidationError;
use gemrelay_core::message::{Turn, UserId};
use gemrelay_core::outcome::ApiOutcome;
use gemrelay_core::transport::{HttpRequest, Transport};
use gemrelay_memory::{ForgetOutcome, HistoryStore, InstructionStore};
use gemrelay_providers::{GeminiEndpoint, classify};
use std::sync::Arc;
use std::time::Duration;
use tracing::{Instrument, debug, error, info, info_span, warn};
use uuid::Uuid;

pub const BLANK_QUESTION_REPLY: &str = "Please provide a question for me to answer.";

/// Relays questions to the model, keeping per-user context.
pub struct Relay {
    endpoint: GeminiEndpoint,
    transport: Arc<dyn Transport>,
    history: Arc<HistoryStore>,
    instructions: Arc<InstructionStore>,
    request_timeout: Duration,
}

impl Relay {
    pub fn new(
        endpoint: GeminiEndpoint,
        transport: Arc<dyn Transport>,
        history: Arc<HistoryStore>,
        instructions: Arc<InstructionStore>,
        request_timeout: Duration,
    ) -> Self {
        Self {
            endpoint,
            transport,
            history,
            instructions,
            request_timeout,
        }
    }

    /// Wire a relay with fresh stores sized from `config`.
    pub fn from_config(config: &AppConfig, transport: Arc<dyn Transport>) -> Self {
        Self::new(
            GeminiEndpoint::from_config(config),
            transport,
            Arc::new(HistoryStore::new(config.limits.max_history_turns)),
            Arc::new(InstructionStore::new(config.limits.system_instruction_max_length)),
            config.request_timeout(),
        )
    }

    pub fn model(&self) -> &str {
        self.endpoint.model()
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn instructions(&self) -> &InstructionStore {
        &self.instructions
    }

    /// Ask the model `question` on behalf of `user` and return the text to
    /// deliver. Never fails: remote and transport faults become replies.
    pub async fn ask(&self, user: &UserId, question: &str) -> String {
        if question.trim().is_empty() {
            return BLANK_QUESTION_REPLY.to_string();
        }

        let request_id = Uuid::new_v4();
        let span = info_span!("ask", %request_id, user = %user);
        self.ask_locked(user, question).instrument(span).await
    }

    async fn ask_locked(&self, user: &UserId, question: &str) -> String {
        info!(question_len = question.chars().count(), "Question accepted");

        let mut guard = self.history.lock(user).await;
        let instruction = self.instructions.get(user).await;
        let window = guard.append_provisional(Turn::user(question));
        debug!(
            turns = window.len(),
            has_instruction = instruction.is_some(),
            "Sending history window"
        );

        let outcome = match self.endpoint.build_request(window, instruction.as_deref()) {
            Ok(request) => self.send(request).await,
            Err(e) => ApiOutcome::UnexpectedFault(format!("failed to encode request: {e}")),
        };
        log_outcome(&outcome);

        let Disposition { action, reply } = Disposition::for_outcome(outcome);
        match action {
            HistoryAction::Commit(turn) => {
                guard.commit_model_turn(turn);
                info!(reply_len = reply.chars().count(), turns = guard.len(), "Answer delivered");
            }
            HistoryAction::Keep => guard.keep_provisional(),
            HistoryAction::Rollback => {
                guard.rollback_last_if_user();
            }
        }
        reply
    }

    async fn send(&self, request: HttpRequest) -> ApiOutcome {
        match tokio::time::timeout(self.request_timeout, self.transport.post(request)).await {
            Ok(Ok(response)) => {
                debug!(status = response.status, body_len = response.body.len(), "Response received");
                classify(response.status, &response.body)
            }
            Ok(Err(e)) if e.is_connectivity() => ApiOutcome::NetworkError(e.to_string()),
            Ok(Err(e)) => ApiOutcome::UnexpectedFault(e.to_string()),
            Err(_) => ApiOutcome::NetworkError(format!(
                "request timed out after {}s",
                self.request_timeout.as_secs()
            )),
        }
    }

    /// Clear the user's history. Returns whether there was any.
    pub async fn reset_history(&self, user: &UserId) -> bool {
        let existed = self.history.reset(user).await;
        if existed {
            info!(user = %user, "History reset");
        }
        existed
    }

    pub async fn set_instruction(
        &self,
        user: &UserId,
        text: impl Into<String>,
    ) -> Result<(), ValidationError> {
        self.instructions.set(user, text).await?;
        info!(user = %user, "System instruction set");
        Ok(())
    }

    /// Drop the user's system instruction. Returns whether one was set.
    pub async fn reset_instruction(&self, user: &UserId) -> bool {
        let existed = self.instructions.reset(user).await;
        if existed {
            info!(user = %user, "System instruction reset");
        }
        existed
    }

    pub async fn forget_last_exchange(&self, user: &UserId) -> ForgetOutcome {
        let outcome = self.history.forget_last_exchange(user).await;
        match &outcome {
            ForgetOutcome::RemovedOneFallback { turn } => {
                warn!(user = %user, role = %turn.role, "Forget removed a single turn from an irregular tail");
            }
            ForgetOutcome::NothingToForget => {}
            _ => info!(user = %user, "Last exchange forgotten"),
        }
        outcome
    }

    pub async fn render_history(&self, user: &UserId) -> String {
        let turns = self.history.get(user).await;
        render_transcript(&turns, self.history.max_history_turns(), self.model())
    }
}

fn log_outcome(outcome: &ApiOutcome) {
    match outcome {
        ApiOutcome::Answered(_) => {}
        ApiOutcome::PromptBlocked { reason, safety_ratings } => {
            warn!(%reason, ratings = ?safety_ratings, "Prompt blocked before generation");
        }
        ApiOutcome::GenerationStopped { reason, safety_ratings } => {
            warn!(%reason, ratings = ?safety_ratings, "Generation stopped; keeping question");
        }
        ApiOutcome::MalformedResponse => error!("Response missing expected content"),
        ApiOutcome::HttpError { status, detail } => error!(status, %detail, "Model API returned an error"),
        ApiOutcome::NetworkError(detail) => error!(%detail, "Could not reach model API"),
        ApiOutcome::UnexpectedFault(detail) => error!(%detail, "Unexpected fault during model call"),
    }
}
