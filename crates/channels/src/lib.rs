//! Chat-facing plumbing for GemRelay.
//!
//! - **Chunker**: splits replies to fit a channel's payload limit
//! - **Command**: slash-command parsing for text channels
//! - **CLI**: interactive terminal chat (stdin/stdout)

pub mod chunker;
pub mod cli;
pub mod command;

pub use chunker::split;
pub use cli::CliChannel;
pub use command::{Command, help_text};
