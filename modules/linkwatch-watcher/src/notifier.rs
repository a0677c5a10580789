//! Message delivery seam.

use anyhow::Result;
use async_trait::async_trait;
use tracing::warn;

use linkwatch_common::Config;
use telegram_client::TelegramClient;

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, text: &str) -> Result<()>;
}

pub struct TelegramNotifier {
    client: TelegramClient,
}

impl TelegramNotifier {
    pub fn new(bot_token: &str, chat_id: &str) -> Self {
        Self {
            client: TelegramClient::new(bot_token.to_string(), chat_id.to_string()),
        }
    }

    /// Build a notifier when both Telegram credentials are present. Absent
    /// credentials are not an error: new URLs simply stay pending until a
    /// later run or a manual send.
    pub fn from_config(config: &Config) -> Option<Self> {
        match (&config.telegram_bot_token, &config.telegram_chat_id) {
            (Some(token), Some(chat_id)) => Some(Self::new(token, chat_id)),
            _ => {
                warn!("TELEGRAM_BOT_TOKEN or TELEGRAM_GROUP_CHAT_ID not set, skipping delivery");
                None
            }
        }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, text: &str) -> Result<()> {
        self.client.send_message(text).await?;
        Ok(())
    }
}
