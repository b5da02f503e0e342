//! Telegram delivery via the Bot API `sendMessage` endpoint.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;

use super::{Alert, AlertSink};

pub struct TelegramSink {
    client: reqwest::Client,
    token: String,
    chat_id: String,
    base: String,
}

/// Bot API envelope; `description` explains failures like a bad chat id.
#[derive(Debug, Deserialize)]
struct SendMessageResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

impl TelegramSink {
    pub fn new(token: &str, chat_id: &str, base: &str, timeout_secs: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("building Telegram HTTP client")?;
        Ok(Self {
            client,
            token: token.to_string(),
            chat_id: chat_id.to_string(),
            base: base.trim_end_matches('/').to_string(),
        })
    }

    fn send_message_url(&self) -> String {
        format!("{}/bot{}/sendMessage", self.base, self.token)
    }
}

#[async_trait]
impl AlertSink for TelegramSink {
    async fn send(&self, alert: &Alert) -> Result<()> {
        let text = alert.message_text();
        let params = [
            ("chat_id", self.chat_id.as_str()),
            ("text", text.as_str()),
        ];
        let body: SendMessageResponse = self
            .client
            .post(self.send_message_url())
            .form(&params)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .context("decoding sendMessage response")?;

        if !body.ok {
            bail!(
                "Telegram rejected message: {}",
                body.description.unwrap_or_else(|| "no description".to_string())
            );
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "telegram"
    }
}
