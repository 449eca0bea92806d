//! Telegram Bot API channel

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use super::{NotificationError, NotificationResult, Notifier};
use crate::config::TelegramSettings;

#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub chat_id: String,
}

impl TelegramConfig {
    pub fn new(bot_token: impl Into<String>, chat_id: impl Into<String>) -> Self {
        Self {
            bot_token: bot_token.into(),
            chat_id: chat_id.into(),
        }
    }

    /// Config section first, then TELEGRAM_BOT_TOKEN / TELEGRAM_CHAT_ID
    pub fn resolve(settings: &TelegramSettings) -> NotificationResult<Self> {
        let bot_token = settings
            .bot_token
            .clone()
            .or_else(|| std::env::var("TELEGRAM_BOT_TOKEN").ok())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| NotificationError::InvalidConfig("missing bot token".into()))?;
        let chat_id = settings
            .chat_id
            .clone()
            .or_else(|| std::env::var("TELEGRAM_CHAT_ID").ok())
            .filter(|c| !c.is_empty())
            .ok_or_else(|| NotificationError::InvalidConfig("missing chat id".into()))?;
        Ok(Self { bot_token, chat_id })
    }
}

pub struct TelegramNotifier {
    config: TelegramConfig,
    client: reqwest::Client,
}

impl TelegramNotifier {
    pub fn new(config: TelegramConfig, client: reqwest::Client) -> Self {
        Self { config, client }
    }

    fn endpoint(&self) -> String {
        format!(
            "https://api.telegram.org/bot{}/sendMessage",
            self.config.bot_token
        )
    }

    fn payload(&self, text: &str) -> serde_json::Value {
        // Plain text: the report contains '*' markers that Markdown would eat
        serde_json::json!({
            "chat_id": self.config.chat_id,
            "text": text,
            "disable_web_page_preview": true,
        })
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    fn name(&self) -> &str {
        "telegram"
    }

    fn is_enabled(&self) -> bool {
        !self.config.bot_token.is_empty() && !self.config.chat_id.is_empty()
    }

    async fn send(&self, text: &str) -> NotificationResult<()> {
        debug!(chat_id = %self.config.chat_id, "Sending Telegram message");

        let response = self
            .client
            .post(self.endpoint())
            .json(&self.payload(text))
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            info!("Telegram message sent");
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        if status.as_u16() == 429 {
            warn!("Telegram rate limited");
            return Err(NotificationError::RateLimited(60));
        }

        error!(status = %status, body = %body, "Telegram send failed");
        Err(NotificationError::SendFailed(format!("HTTP {}: {}", status, body)))
    }
}
