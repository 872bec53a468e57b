//! Commit/rollback policy: what each outcome does to the provisional turn and
//! what the user is told.

use gemrelay_core::message::Turn;
use gemrelay_core::outcome::ApiOutcome;

/// The history mutation that settles a provisional user turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryAction {
    /// Append the model's answer after the question.
    Commit(Turn),
    /// Leave the question in place without an answer.
    Keep,
    /// Remove the question.
    Rollback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Disposition {
    pub action: HistoryAction,
    pub reply: String,
}

impl Disposition {
    pub fn for_outcome(outcome: ApiOutcome) -> Self {
        match outcome {
            ApiOutcome::Answered(text) => Self {
                action: HistoryAction::Commit(Turn::model(text.clone())),
                reply: text,
            },
            ApiOutcome::PromptBlocked { reason, .. } => Self::rollback(format!(
                "Your prompt was blocked before generation. Reason: `{reason}`. \
                 Please rephrase your message. It was not added to the history."
            )),
            ApiOutcome::GenerationStopped { reason, .. } => Self {
                action: HistoryAction::Keep,
                reply: format!(
                    "This response generation was stopped. Reason: `{reason}`. \
                     Please modify your prompt or check safety settings. \
                     Your message was kept in the history for context."
                ),
            },
            ApiOutcome::MalformedResponse => Self::rollback(
                "Sorry, I received an unexpected response format from the AI. \
                 Your message was not added to the history."
                    .to_string(),
            ),
            ApiOutcome::HttpError { status, detail } => Self::rollback(format!(
                "Sorry, there was an error communicating with the AI (Status {status}). \
                 Details: {detail}. Your message was not added to history."
            )),
            ApiOutcome::NetworkError(detail) => Self::rollback(format!(
                "Sorry, I couldn't connect to the AI service. Error: {detail}. \
                 Your message was not added to history."
            )),
            ApiOutcome::UnexpectedFault(detail) => Self::rollback(format!(
                "An unexpected error occurred while talking to the AI: {detail}. \
                 Your message was not added to history."
            )),
        }
    }

    fn rollback(reply: String) -> Self {
        Self {
            action: HistoryAction::Rollback,
            reply,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answered_commits_model_turn() {
        let d = Disposition::for_outcome(ApiOutcome::Answered("42".into()));
        assert_eq!(d.action, HistoryAction::Commit(Turn::model("42")));
        assert_eq!(d.reply, "42");
    }

    #[test]
    fn only_generation_stopped_keeps_the_question() {
        let outcomes = [
            ApiOutcome::PromptBlocked { reason: "SAFETY".into(), safety_ratings: vec![] },
            ApiOutcome::GenerationStopped { reason: "SAFETY".into(), safety_ratings: vec![] },
            ApiOutcome::MalformedResponse,
            ApiOutcome::HttpError { status: 500, detail: "boom".into() },
            ApiOutcome::NetworkError("refused".into()),
            ApiOutcome::UnexpectedFault("bad".into()),
        ];
        let keeps: Vec<_> = outcomes
            .into_iter()
            .map(|o| (o.kind(), Disposition::for_outcome(o).action))
            .filter(|(_, action)| *action != HistoryAction::Rollback)
            .collect();
        assert_eq!(keeps, vec![("generation_stopped", HistoryAction::Keep)]);
    }

    #[test]
    fn replies_carry_reason_and_detail() {
        let blocked = Disposition::for_outcome(ApiOutcome::PromptBlocked {
            reason: "SAFETY".into(),
            safety_ratings: vec![],
        });
        assert!(blocked.reply.contains("`SAFETY`"));
        assert!(blocked.reply.contains("not added to the history"));

        let stopped = Disposition::for_outcome(ApiOutcome::GenerationStopped {
            reason: "RECITATION".into(),
            safety_ratings: vec![],
        });
        assert!(stopped.reply.contains("`RECITATION`"));
        assert!(stopped.reply.contains("kept in the history"));

        let http = Disposition::for_outcome(ApiOutcome::HttpError {
            status: 429,
            detail: "Resource has been exhausted".into(),
        });
        assert!(http.reply.contains("(Status 429)"));
        assert!(http.reply.contains("Details: Resource has been exhausted."));

        let network = Disposition::for_outcome(ApiOutcome::NetworkError("dns failure".into()));
        assert!(network.reply.contains("Error: dns failure."));
    }
}
