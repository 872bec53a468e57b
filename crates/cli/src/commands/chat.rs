//! `gemrelay chat`: interactive mode.

use gemrelay_agent::{Reply, dispatch};
use gemrelay_channels::{CliChannel, Command, split};
use gemrelay_core::channel::Channel;
use gemrelay_core::message::UserId;
use std::io::Write;
use tracing::info;

pub async fn run() -> gemrelay_core::Result<()> {
    let (config, relay) = super::build_relay()?;
    let user = UserId::new(&config.user_id);

    println!();
    println!("  ╔══════════════════════════════════════════════╗");
    println!("  ║         GemRelay — Interactive Mode          ║");
    println!("  ╚══════════════════════════════════════════════╝");
    println!();
    println!("  Model:     {}", config.model);
    println!("  History:   last {} exchanges", config.limits.max_history_turns);
    println!();
    println!("  Type your message and press Enter.");
    println!("  Type /help for commands, 'exit' or Ctrl+D to quit.");
    println!();

    let channel = CliChannel::new(user);
    let mut rx = channel.start().await?;
    info!(model = %config.model, channel = channel.name(), "Chat session started");

    prompt()?;
    while let Some(result) = rx.recv().await {
        match result {
            Ok(msg) => {
                let command = Command::parse(&msg.content);
                if matches!(command, Command::Ask(_)) {
                    eprint!("  ...");
                }
                let reply = dispatch(&relay, &msg.sender_id, command).await;
                eprint!("\r     \r");

                match reply {
                    Reply::Exit => break,
                    Reply::Text(text) => {
                        let segments = split(&text, config.limits.max_response_length);
                        channel.send_all(&msg.chat_id, &segments).await?;
                        println!();
                    }
                }
            }
            Err(e) => {
                eprintln!("  [Error] {e}");
                break;
            }
        }
        prompt()?;
    }

    channel.stop().await?;
    println!("  Goodbye!");
    Ok(())
}

fn prompt() -> std::io::Result<()> {
    print!("  You > ");
    std::io::stdout().flush()
}
