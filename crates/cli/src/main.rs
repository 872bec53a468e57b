//! GemRelay CLI: the main entry point.
//!
//! Commands:
//! - `chat`   : Interactive chat with slash commands (default)
//! - `ask`    : Ask a single question and exit
//! - `doctor` : Check configuration and credentials

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "gemrelay",
    about = "GemRelay — chat with Gemini, keeping your conversation context",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Chat interactively (type /help for commands)
    Chat,

    /// Ask a single question and print the answer
    Ask {
        /// The question to ask
        #[arg(short, long)]
        message: String,
    },

    /// Check configuration and credentials
    Doctor,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env file is not an error.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Initialize tracing; stdout is reserved for the conversation.
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command.unwrap_or(Commands::Chat) {
        Commands::Chat => commands::chat::run().await?,
        Commands::Ask { message } => commands::ask::run(message).await?,
        Commands::Doctor => commands::doctor::run().await?,
    }

    Ok(())
}
