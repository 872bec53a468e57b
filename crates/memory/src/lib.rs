//! In-process stores for GemRelay.
//!
//! Both stores are keyed by [`UserId`](gemrelay_core::UserId) and live only
//! as long as the process; nothing is persisted across restarts.

pub mod history;
pub mod instructions;

pub use history::{ForgetOutcome, HistoryGuard, HistoryStore};
pub use instructions::InstructionStore;
