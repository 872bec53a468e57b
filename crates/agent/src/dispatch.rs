//! Executes parsed channel commands against a [`Relay`].

use crate::relay::Relay;
use crate::transcript::EMPTY_HISTORY_REPLY;
use gemrelay_channels::command::{Command, help_text};
use gemrelay_core::error::ValidationError;
use gemrelay_core::message::UserId;
use gemrelay_memory::ForgetOutcome;

/// Characters of a forgotten question quoted back to the user.
const FORGET_PREVIEW_CHARS: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Text(String),
    /// The user asked to leave.
    Exit,
}

pub async fn dispatch(relay: &Relay, user: &UserId, command: Command) -> Reply {
    let text = match command {
        Command::Exit => return Reply::Exit,
        Command::Ask(question) => relay.ask(user, &question).await,
        Command::ResetHistory => {
            if relay.reset_history(user).await {
                "🧹 Your chat history with me has been cleared.".to_string()
            } else {
                EMPTY_HISTORY_REPLY.to_string()
            }
        }
        Command::SetPrompt(instruction) if instruction.trim().is_empty() => {
            "Please provide an instruction, e.g. `/set_prompt Answer like a pirate.`".to_string()
        }
        Command::SetPrompt(instruction) => {
            match relay.set_instruction(user, instruction.clone()).await {
                Ok(()) => format!(
                    "✅ Understood! I will now try to follow these instructions for our conversation:\n\
                     ```\n{instruction}\n```\nUse `/reset_prompt` to clear this."
                ),
                Err(ValidationError::InstructionTooLong { max, .. }) => format!(
                    "Error: System instruction is too long (max {max} characters). Please shorten it."
                ),
            }
        }
        Command::ResetPrompt => {
            if relay.reset_instruction(user).await {
                "My custom system instruction for our chat has been reset to default.".to_string()
            } else {
                "You haven't set a custom system instruction with me yet.".to_string()
            }
        }
        Command::Forget => forget_reply(relay.forget_last_exchange(user).await),
        Command::ShowHistory => relay.render_history(user).await,
        Command::Help => help_text(),
        Command::Unknown(name) => {
            format!("Unknown command `/{name}`. Type `/help` to see what I can do.")
        }
    };
    Reply::Text(text)
}

fn forget_reply(outcome: ForgetOutcome) -> String {
    match outcome {
        ForgetOutcome::RemovedPair { question, .. } => {
            let preview: String = question.text.chars().take(FORGET_PREVIEW_CHARS).collect();
            format!(
                "Okay, I've forgotten our last exchange (your question starting with \"{preview}...\" and my response)."
            )
        }
        ForgetOutcome::RemovedSingle { .. } => {
            "Okay, I've forgotten your last message (there was no response from me yet).".to_string()
        }
        ForgetOutcome::RemovedOneFallback { .. } => {
            "Okay, I've forgotten the last message in our history.".to_string()
        }
        ForgetOutcome::NothingToForget => {
            "There's nothing in our recent history for me to forget!".to_string()
        }
    }
}
