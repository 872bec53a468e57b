//! Slash-command parsing for text channels.
//!
//! Anything that does not start with `/` is a question.

/// A parsed inbound line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Ask(String),
    ResetHistory,
    SetPrompt(String),
    ResetPrompt,
    Forget,
    ShowHistory,
    Help,
    Exit,
    Unknown(String),
}

/// Name, argument placeholder and description of every command, for `/help`.
pub const COMMANDS: &[(&str, Option<&str>, &str)] = &[
    ("ask", Some("question"), "Ask the AI a question (maintains conversation history)."),
    ("reset_history", None, "Reset your conversation history with the AI."),
    ("set_prompt", Some("instruction"), "Set a custom system prompt/instruction for the AI in this chat."),
    ("reset_prompt", None, "Reset the custom AI system prompt/instruction for this chat."),
    ("forget", None, "Remove the last question and AI answer from your history."),
    ("show_history", None, "View the recent conversation history I remember."),
    ("help", None, "Shows a list of available commands."),
    ("exit", None, "Leave the chat."),
];

impl Command {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if matches!(line, "exit" | "quit" | ":q") {
            return Self::Exit;
        }
        let Some(rest) = line.strip_prefix('/') else {
            return Self::Ask(line.to_string());
        };

        let (name, arg) = match rest.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (rest, ""),
        };

        match name {
            "ask" => Self::Ask(arg.to_string()),
            "reset_history" => Self::ResetHistory,
            "set_prompt" => Self::SetPrompt(arg.to_string()),
            "reset_prompt" => Self::ResetPrompt,
            "forget" => Self::Forget,
            "show_history" => Self::ShowHistory,
            "help" => Self::Help,
            "exit" | "quit" => Self::Exit,
            other => Self::Unknown(other.to_string()),
        }
    }
}

/// Markdown listing of [`COMMANDS`].
pub fn help_text() -> String {
    let mut out = String::from("Here are the commands you can use with me:\n");
    for (name, param, description) in COMMANDS {
        match param {
            Some(param) => out.push_str(&format!("`/{name} <{param}>` {description}\n")),
            None => out.push_str(&format!("`/{name}` {description}\n")),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_lines_are_questions() {
        assert_eq!(Command::parse("  what is rust?  "), Command::Ask("what is rust?".into()));
    }

    #[test]
    fn commands_with_arguments() {
        assert_eq!(Command::parse("/ask why  is the sky blue"), Command::Ask("why  is the sky blue".into()));
        assert_eq!(
            Command::parse("/set_prompt Answer like a pirate."),
            Command::SetPrompt("Answer like a pirate.".into())
        );
        assert_eq!(Command::parse("/set_prompt"), Command::SetPrompt(String::new()));
    }

    #[test]
    fn bare_commands() {
        assert_eq!(Command::parse("/reset_history"), Command::ResetHistory);
        assert_eq!(Command::parse("/reset_prompt"), Command::ResetPrompt);
        assert_eq!(Command::parse("/forget"), Command::Forget);
        assert_eq!(Command::parse("/show_history"), Command::ShowHistory);
        assert_eq!(Command::parse("/help"), Command::Help);
    }

    #[test]
    fn exit_aliases() {
        for line in ["exit", "quit", ":q", "/exit", "/quit"] {
            assert_eq!(Command::parse(line), Command::Exit, "{line}");
        }
    }

    #[test]
    fn unknown_command() {
        assert_eq!(Command::parse("/ping"), Command::Unknown("ping".into()));
    }

    #[test]
    fn help_lists_every_command() {
        let help = help_text();
        for (name, _, _) in COMMANDS {
            assert!(help.contains(&format!("`/{name}")));
        }
        assert!(help.contains("`/set_prompt <instruction>`"));
    }
}
