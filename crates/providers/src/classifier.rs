//! Response classification.
//!
//! A total function from `(status, body)` to [`ApiOutcome`]. Decision order:
//!
//! 1. status ≠ 200 → `HttpError` with the API's error message (≤ 300 chars)
//! 2. a first candidate exists:
//!    - it has text → `Answered`
//!    - its finish reason is present and not `STOP` → `GenerationStopped`
//!    - otherwise → `MalformedResponse`
//! 3. `promptFeedback.blockReason` present → `PromptBlocked`
//! 4. otherwise (including unparseable bodies) → `MalformedResponse`

use crate::gemini::{FINISH_REASON_STOP, GenerateContentResponse};
use gemrelay_core::outcome::ApiOutcome;
use tracing::trace;

/// Longest error detail surfaced to users.
pub const MAX_ERROR_DETAIL_CHARS: usize = 300;

const NO_ERROR_MESSAGE: &str = "No specific error message.";

pub fn classify(status: u16, body: &str) -> ApiOutcome {
    if status != 200 {
        let detail = truncate_chars(&extract_error_message(body), MAX_ERROR_DETAIL_CHARS);
        return ApiOutcome::HttpError { status, detail };
    }

    match serde_json::from_str::<GenerateContentResponse>(body) {
        Ok(response) => classify_response(response),
        Err(e) => {
            trace!(error = %e, "Response body did not match the generateContent shape");
            ApiOutcome::MalformedResponse
        }
    }
}

fn classify_response(response: GenerateContentResponse) -> ApiOutcome {
    let first = response
        .candidates
        .and_then(|candidates| candidates.into_iter().next());

    if let Some(candidate) = first {
        if let Some(text) = candidate.first_text() {
            return ApiOutcome::Answered(text.to_string());
        }
        return match candidate.finish_reason {
            Some(reason) if reason != FINISH_REASON_STOP => ApiOutcome::GenerationStopped {
                reason,
                safety_ratings: candidate.safety_ratings.unwrap_or_default(),
            },
            _ => ApiOutcome::MalformedResponse,
        };
    }

    match response.prompt_feedback {
        Some(feedback) => match feedback.block_reason {
            Some(reason) => ApiOutcome::PromptBlocked {
                reason,
                safety_ratings: feedback.safety_ratings.unwrap_or_default(),
            },
            None => ApiOutcome::MalformedResponse,
        },
        None => ApiOutcome::MalformedResponse,
    }
}

/// `error.message` from a JSON error body, else the raw body text.
fn extract_error_message(body: &str) -> String {
    let from_json = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .filter(|m| !m.trim().is_empty());
    if let Some(message) = from_json {
        return message;
    }

    let raw = body.trim();
    if raw.is_empty() {
        NO_ERROR_MESSAGE.to_string()
    } else {
        raw.to_string()
    }
}

fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => text[..cut].to_string(),
        None => text.to_string(),
    }
}
