//! # GemRelay Core
//!
//! Domain types, traits, and error definitions for the GemRelay chat relay.
//! This crate has **no framework dependencies**: it defines the domain model
//! that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! The seams of the system are traits defined here:
//! - [`Transport`]: how a request reaches the hosted model API
//! - [`Channel`]: how replies reach the chat platform
//!
//! Implementations live in their respective crates, so the orchestrator can
//! be exercised with scripted doubles in tests.

pub mod error;
pub mod message;
pub mod outcome;
pub mod transport;
pub mod channel;

// Re-export key types at crate root for ergonomics
pub use error::{Error, Result};
pub use message::{Role, Turn, UserId};
pub use outcome::{ApiOutcome, SafetyRating};
pub use transport::{HttpRequest, HttpResponse, Transport};
pub use channel::{Channel, ChannelMessage};
