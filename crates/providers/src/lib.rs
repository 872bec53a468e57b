//! Model API plumbing for GemRelay.
//!
//! - [`gemini`]: request payload, response shapes, and endpoint addressing
//! - [`classifier`]: maps a raw `(status, body)` pair to an `ApiOutcome`
//! - [`http`]: the reqwest-backed `Transport`

pub mod classifier;
pub mod gemini;
pub mod http;

pub use classifier::classify;
pub use gemini::{GeminiEndpoint, GenerateContentRequest};
pub use http::ReqwestTransport;
