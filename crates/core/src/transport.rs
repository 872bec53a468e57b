//! Transport trait: the abstraction over the outbound HTTP client.
//!
//! A Transport knows how to POST a JSON body and hand back the raw status and
//! body text. It does not interpret the response: that is the classifier's
//! job. One transport instance is shared by every in-flight request.

use async_trait::async_trait;
use crate::error::TransportError;

/// An outbound JSON POST.
#[derive(Clone)]
pub struct HttpRequest {
    /// Fully-qualified endpoint URL (no credentials embedded)
    pub url: String,

    /// Extra request headers, including the credential header
    pub headers: Vec<(String, String)>,

    /// JSON body
    pub body: serde_json::Value,
}

impl HttpRequest {
    pub fn new(url: impl Into<String>, body: serde_json::Value) -> Self {
        Self {
            url: url.into(),
            headers: Vec::new(),
            body,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

// Header values may carry the API key.
impl std::fmt::Debug for HttpRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let header_names: Vec<&str> = self.headers.iter().map(|(k, _)| k.as_str()).collect();
        f.debug_struct("HttpRequest")
            .field("url", &self.url)
            .field("headers", &header_names)
            .field("body", &self.body)
            .finish()
    }
}

/// The raw result of a completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// The core Transport trait.
///
/// Implementations: reqwest-backed HTTPS client, scripted doubles in tests.
#[async_trait]
pub trait Transport: Send + Sync {
    /// A human-readable name for this transport (e.g., "reqwest").
    fn name(&self) -> &str;

    /// Send the request. Returns `Ok` for any HTTP status; `Err` only when no
    /// response was obtained.
    async fn post(&self, request: HttpRequest) -> std::result::Result<HttpResponse, TransportError>;
}
