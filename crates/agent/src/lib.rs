//! The relay loop of GemRelay.
//!
//! One `ask` runs under the user's history lock:
//!
//! 1. **Append** the question as a provisional user turn
//! 2. **Build** the request (history window + optional system instruction)
//! 3. **Send** it through the shared transport, bounded by the request timeout
//! 4. **Classify** the response into an [`ApiOutcome`](gemrelay_core::ApiOutcome)
//! 5. **Settle** the provisional turn per the [`disposition`] table and
//!    return the user-facing text
//!
//! Nothing escapes `ask` as an error: every failure becomes a reply.
//! [`dispatch()`] maps slash commands onto the relay's operations.

pub mod disposition;
pub mod dispatch;
pub mod relay;
pub mod transcript;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use dispatch::{Reply, dispatch};
pub use disposition::{Disposition, HistoryAction};
pub use relay::Relay;
pub use transcript::render_transcript;
