//! The classified result of one call to the model API.
//!
//! An `ApiOutcome` is produced by the response classifier and consumed by the
//! orchestrator within a single `ask`; it is never stored.

use serde::{Deserialize, Serialize};

/// A per-category safety verdict reported by the model API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SafetyRating {
    #[serde(default)]
    pub category: String,

    #[serde(default)]
    pub probability: String,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub blocked: bool,
}

impl std::fmt::Display for SafetyRating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}={}", self.category, self.probability)?;
        if self.blocked {
            f.write_str(" (blocked)")?;
        }
        Ok(())
    }
}

/// Every shape a model API call can resolve to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiOutcome {
    /// The model produced usable text.
    Answered(String),

    /// The prompt was rejected before any generation (`promptFeedback.blockReason`).
    PromptBlocked {
        reason: String,
        safety_ratings: Vec<SafetyRating>,
    },

    /// Generation started but ended for a non-`STOP` reason; no answer text.
    GenerationStopped {
        reason: String,
        safety_ratings: Vec<SafetyRating>,
    },

    /// HTTP 200 without the fields we need.
    MalformedResponse,

    /// Non-200 status; `detail` is already truncated for display.
    HttpError { status: u16, detail: String },

    /// The API could not be reached (connect failure or timeout).
    NetworkError(String),

    /// Any other fault raised while talking to the API.
    UnexpectedFault(String),
}

impl ApiOutcome {
    /// Short stable label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Answered(_) => "answered",
            Self::PromptBlocked { .. } => "prompt_blocked",
            Self::GenerationStopped { .. } => "generation_stopped",
            Self::MalformedResponse => "malformed_response",
            Self::HttpError { .. } => "http_error",
            Self::NetworkError(_) => "network_error",
            Self::UnexpectedFault(_) => "unexpected_fault",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn safety_rating_parses_api_shape() {
        let rating: SafetyRating = serde_json::from_str(
            r#"{"category": "HARM_CATEGORY_HARASSMENT", "probability": "HIGH", "blocked": true}"#,
        )
        .unwrap();
        assert_eq!(rating.category, "HARM_CATEGORY_HARASSMENT");
        assert!(rating.blocked);
        assert_eq!(rating.to_string(), "HARM_CATEGORY_HARASSMENT=HIGH (blocked)");
    }

    #[test]
    fn safety_rating_tolerates_missing_fields() {
        let rating: SafetyRating = serde_json::from_str("{}").unwrap();
        assert!(rating.category.is_empty());
        assert!(!rating.blocked);
    }

    #[test]
    fn outcome_kinds_are_distinct() {
        let outcomes = [
            ApiOutcome::Answered("hi".into()),
            ApiOutcome::PromptBlocked { reason: "SAFETY".into(), safety_ratings: vec![] },
            ApiOutcome::GenerationStopped { reason: "MAX_TOKENS".into(), safety_ratings: vec![] },
            ApiOutcome::MalformedResponse,
            ApiOutcome::HttpError { status: 500, detail: "boom".into() },
            ApiOutcome::NetworkError("refused".into()),
            ApiOutcome::UnexpectedFault("panic".into()),
        ];
        let mut kinds: Vec<_> = outcomes.iter().map(ApiOutcome::kind).collect();
        kinds.sort_unstable();
        kinds.dedup();
        assert_eq!(kinds.len(), outcomes.len());
    }
}
