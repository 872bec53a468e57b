//! Gemini `generateContent` wire format.
//!
//! Request side: ordered turns as `{role, parts:[{text}]}`, a fixed
//! generation config, four safety settings at `BLOCK_MEDIUM_AND_ABOVE`, and
//! an optional system instruction.
//!
//! Response side: loosely-typed shapes where every field is optional, so the
//! classifier can tell "missing" from "present".
//!
//! The API key travels in the `x-goog-api-key` header rather than the query
//! string, so request URLs are safe to log.

use gemrelay_config::AppConfig;
use gemrelay_core::message::{Role, Turn};
use gemrelay_core::outcome::SafetyRating;
use gemrelay_core::transport::HttpRequest;
use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const API_VERSION: &str = "v1beta";
const API_KEY_HEADER: &str = "x-goog-api-key";

pub const TEMPERATURE: f32 = 0.7;
pub const TOP_P: f32 = 1.0;
pub const TOP_K: u32 = 1;

pub const SAFETY_THRESHOLD: &str = "BLOCK_MEDIUM_AND_ABOVE";
pub const HARM_CATEGORIES: [&str; 4] = [
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
];

/// The finish reason of a normally completed generation.
pub const FINISH_REASON_STOP: &str = "STOP";

/// Where and as whom to call the model.
#[derive(Clone)]
pub struct GeminiEndpoint {
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiEndpoint {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            model: model.into(),
            api_key: api_key.into(),
        }
    }

    /// Build from validated configuration. A missing key yields an endpoint
    /// whose calls fail with HTTP 400/403 from the API.
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.api_key.clone().unwrap_or_default(), &config.model)
            .with_base_url(&config.base_url)
    }

    /// Override the API origin (proxies, tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn url(&self) -> String {
        format!(
            "{}/{API_VERSION}/models/{}:generateContent",
            self.base_url, self.model
        )
    }

    /// Build the outbound request for a history window and optional instruction.
    pub fn build_request(
        &self,
        turns: &[Turn],
        instruction: Option<&str>,
    ) -> Result<HttpRequest, serde_json::Error> {
        let payload = GenerateContentRequest::new(turns, instruction);
        let body = serde_json::to_value(&payload)?;
        Ok(HttpRequest::new(self.url(), body).with_header(API_KEY_HEADER, &self.api_key))
    }
}

impl std::fmt::Debug for GeminiEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiEndpoint")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

// --- Request types ---

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    pub generation_config: GenerationConfig,
    pub safety_settings: Vec<SafetySetting>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<SystemInstruction>,
}

impl GenerateContentRequest {
    pub fn new(turns: &[Turn], instruction: Option<&str>) -> Self {
        Self {
            contents: turns.iter().map(Content::from).collect(),
            generation_config: GenerationConfig::default(),
            safety_settings: HARM_CATEGORIES
                .iter()
                .map(|category| SafetySetting {
                    category: (*category).into(),
                    threshold: SAFETY_THRESHOLD.into(),
                })
                .collect(),
            system_instruction: instruction
                .filter(|text| !text.trim().is_empty())
                .map(|text| SystemInstruction {
                    parts: vec![Part { text: text.into() }],
                }),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Content {
    pub role: Role,
    pub parts: Vec<Part>,
}

impl From<&Turn> for Content {
    fn from(turn: &Turn) -> Self {
        Self {
            role: turn.role,
            parts: vec![Part { text: turn.text.clone() }],
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Part {
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: TEMPERATURE,
            top_p: TOP_P,
            top_k: TOP_K,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SafetySetting {
    pub category: String,
    pub threshold: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SystemInstruction {
    pub parts: Vec<Part>,
}

// --- Response types ---

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Option<Vec<Candidate>>,
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Candidate {
    #[serde(default)]
    pub content: Option<CandidateContent>,
    #[serde(default)]
    pub finish_reason: Option<String>,
    #[serde(default)]
    pub safety_ratings: Option<Vec<SafetyRating>>,
}

impl Candidate {
    /// `content.parts[0].text`, when it holds something to show.
    pub fn first_text(&self) -> Option<&str> {
        self.content
            .as_ref()?
            .parts
            .as_deref()?
            .first()?
            .text
            .as_deref()
            .filter(|text| !text.trim().is_empty())
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct CandidateContent {
    #[serde(default)]
    pub parts: Option<Vec<ResponsePart>>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ResponsePart {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PromptFeedback {
    #[serde(default)]
    pub block_reason: Option<String>,
    #[serde(default)]
    pub safety_ratings: Option<Vec<SafetyRating>>,
}
