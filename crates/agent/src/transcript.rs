//! Human-readable rendering of a user's history.

use gemrelay_core::message::{Role, Turn};
use std::fmt::Write;

/// Longest text shown per turn before `...`.
pub const MAX_TURN_PREVIEW_CHARS: usize = 500;

pub const EMPTY_HISTORY_REPLY: &str = "You don't have any chat history with me yet.";

/// Render `turns` as a Markdown transcript.
///
/// The header reports `(len + 1) / 2` exchanges against the configured
/// maximum. Consecutive user turns (a question kept after a stopped
/// generation, followed by another) are shown as a continuation.
pub fn render_transcript(turns: &[Turn], max_history_turns: usize, model: &str) -> String {
    if turns.is_empty() {
        return EMPTY_HISTORY_REPLY.to_string();
    }

    let approx_turns = turns.len().div_ceil(2);
    let mut out = format!(
        "**Conversation History (Approx. last {approx_turns}/{max_history_turns} turns):**\n\n"
    );

    let mut counter = 1;
    let mut previous: Option<Role> = None;
    for turn in turns {
        match turn.role {
            Role::User if previous == Some(Role::User) => out.push_str("**(... You continued):**\n"),
            Role::User => {
                let _ = writeln!(out, "**{counter}. You:**");
                counter += 1;
            }
            Role::Model => {
                let _ = writeln!(out, "**Me ({model}):**");
            }
        }
        previous = Some(turn.role);
        let _ = writeln!(out, "```\n{}\n```", preview(&turn.text));
    }
    out
}

fn preview(text: &str) -> String {
    match text.char_indices().nth(MAX_TURN_PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
