//! `gemrelay ask`: single-question mode.

use gemrelay_channels::cli::CLI_CHAT_ID;
use gemrelay_channels::{CliChannel, split};
use gemrelay_core::channel::Channel;
use gemrelay_core::message::UserId;

pub async fn run(message: String) -> gemrelay_core::Result<()> {
    let (config, relay) = super::build_relay()?;
    let user = UserId::new(&config.user_id);
    let channel = CliChannel::new(user.clone());

    eprint!("  Thinking...");
    let answer = relay.ask(&user, &message).await;
    eprint!("\r              \r");

    let segments = split(&answer, config.limits.max_response_length);
    channel.send_all(CLI_CHAT_ID, &segments).await?;
    Ok(())
}
