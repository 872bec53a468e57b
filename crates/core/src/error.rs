//! Error types for the GemRelay domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.
//!
//! Remote-side failures (blocked prompts, malformed payloads, HTTP errors)
//! are not errors here: they are classified into an
//! [`ApiOutcome`](crate::outcome::ApiOutcome) and turned into user-facing text.

use thiserror::Error;

/// The top-level error type for GemRelay's outer surfaces.
///
/// `ask` never fails; this covers wiring a relay and driving a channel.
#[derive(Debug, Error)]
pub enum Error {
    // --- Transport errors ---
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    // --- Channel errors ---
    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Terminal I/O ---
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config { message: message.into() }
    }
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// Input exceeded a configured bound. Never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("System instruction is too long ({length} characters, max {max})")]
    InstructionTooLong { length: usize, max: usize },
}

/// Failure to obtain any HTTP response from the remote API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("Connection failed: {0}")]
    Connect(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Transport not configured: {0}")]
    NotConfigured(String),

    #[error("Unexpected transport failure: {0}")]
    Other(String),
}

impl TransportError {
    /// Connectivity faults surface as network errors; everything else is an
    /// unexpected fault.
    pub fn is_connectivity(&self) -> bool {
        matches!(self, Self::Connect(_) | Self::Timeout(_))
    }
}

#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("Message delivery failed to {channel}: {reason}")]
    DeliveryFailed { channel: String, reason: String },

    #[error("Channel connection lost: {0}")]
    ConnectionLost(String),
}
