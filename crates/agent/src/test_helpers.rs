//! Shared test helpers for relay tests.

use async_trait::async_trait;
use gemrelay_core::error::TransportError;
use gemrelay_core::transport::{HttpRequest, HttpResponse, Transport};
use serde_json::json;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

/// One scripted transport reaction.
pub enum Script {
    Respond(HttpResponse),
    Fail(TransportError),
    /// Never respond.
    Hang,
}

impl Script {
    pub fn status(status: u16, body: &str) -> Self {
        Self::Respond(HttpResponse::new(status, body))
    }

    pub fn answer(text: &str) -> Self {
        Self::status(
            200,
            &json!({
                "candidates": [{
                    "content": {"role": "model", "parts": [{"text": text}]},
                    "finishReason": "STOP"
                }]
            })
            .to_string(),
        )
    }

    pub fn blocked(reason: &str) -> Self {
        Self::status(
            200,
            &json!({"promptFeedback": {"blockReason": reason, "safetyRatings": []}}).to_string(),
        )
    }

    pub fn stopped(reason: &str) -> Self {
        Self::status(
            200,
            &json!({"candidates": [{"finishReason": reason, "safetyRatings": []}]}).to_string(),
        )
    }

    pub fn fail(error: TransportError) -> Self {
        Self::Fail(error)
    }
}

/// A transport that replays scripted reactions in call order and records
/// every request it receives.
///
/// Panics if more calls are made than reactions provided.
pub struct ScriptedTransport {
    script: Mutex<VecDeque<Script>>,
    requests: Mutex<Vec<HttpRequest>>,
    delay: Option<Duration>,
}

impl ScriptedTransport {
    pub fn new(script: Vec<Script>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            requests: Mutex::new(Vec::new()),
            delay: None,
        }
    }

    /// Sleep before answering each call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn post(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let next = {
            let call = self.requests.lock().unwrap().len();
            self.requests.lock().unwrap().push(request);
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| panic!("ScriptedTransport: no reaction for call #{call}"))
        };

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match next {
            Script::Respond(response) => Ok(response),
            Script::Fail(error) => Err(error),
            Script::Hang => std::future::pending().await,
        }
    }
}
