//! CLI channel: interactive terminal-based chat.
//!
//! Reads lines from stdin, writes replies to stdout.
//! Used for `gemrelay chat`.

use async_trait::async_trait;
use gemrelay_core::channel::{Channel, ChannelMessage};
use gemrelay_core::error::ChannelError;
use gemrelay_core::message::UserId;
use tokio::io::{self, AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::warn;

pub const CLI_CHAT_ID: &str = "cli_session";

/// Interactive CLI channel for terminal-based chat.
pub struct CliChannel {
    sender_id: UserId,
}

impl CliChannel {
    pub fn new(sender_id: UserId) -> Self {
        Self { sender_id }
    }
}

#[async_trait]
impl Channel for CliChannel {
    fn name(&self) -> &str {
        "cli"
    }

    async fn start(
        &self,
    ) -> Result<mpsc::Receiver<Result<ChannelMessage, ChannelError>>, ChannelError> {
        let (tx, rx) = mpsc::channel(32);
        let sender_id = self.sender_id.clone();

        tokio::spawn(forward_lines(BufReader::new(io::stdin()), sender_id, tx));

        Ok(rx)
    }

    async fn send(&self, _chat_id: &str, content: &str) -> Result<(), ChannelError> {
        write_line(content)
            .await
            .map_err(|e| ChannelError::DeliveryFailed {
                channel: "cli".into(),
                reason: e.to_string(),
            })
    }
}

async fn write_line(content: &str) -> io::Result<()> {
    let mut stdout = io::stdout();
    stdout.write_all(content.as_bytes()).await?;
    stdout.write_all(b"\n").await?;
    stdout.flush().await
}

/// Forward non-blank lines from `reader` as messages until EOF, a read
/// error, or the receiver is dropped.
pub async fn forward_lines<R>(
    reader: R,
    sender_id: UserId,
    tx: mpsc::Sender<Result<ChannelMessage, ChannelError>>,
) where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                if line.trim().is_empty() {
                    continue;
                }
                let msg = ChannelMessage {
                    sender_id: sender_id.clone(),
                    content: line,
                    chat_id: CLI_CHAT_ID.into(),
                };
                if tx.send(Ok(msg)).await.is_err() {
                    break;
                }
            }
            Ok(None) => break, // EOF (Ctrl+D)
            Err(e) => {
                warn!(error = %e, "Failed to read from stdin");
                let _ = tx.send(Err(ChannelError::ConnectionLost(e.to_string()))).await;
                break;
            }
        }
    }
}
