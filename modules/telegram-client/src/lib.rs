pub mod error;

pub use error::{Result, TelegramError};

use std::time::Duration;

use serde::{Deserialize, Serialize};

const BASE_URL: &str = "https://api.telegram.org";

/// How much of a non-JSON error body to keep in the error message.
const ERROR_BODY_CAP: usize = 200;

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct ApiEnvelope {
    #[serde(default)]
    description: Option<String>,
}

pub struct TelegramClient {
    client: reqwest::Client,
    bot_token: String,
    chat_id: String,
}

impl TelegramClient {
    pub fn new(bot_token: String, chat_id: String) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .expect("Failed to build HTTP client"),
            bot_token,
            chat_id,
        }
    }

    /// Send one plain-text message to the configured chat.
    pub async fn send_message(&self, text: &str) -> Result<()> {
        let url = format!("{}/bot{}/sendMessage", BASE_URL, self.bot_token);
        let resp = self
            .client
            .post(&url)
            .json(&SendMessageRequest {
                chat_id: &self.chat_id,
                text,
            })
            .send()
            .await?;

        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }

        let body = resp.text().await.unwrap_or_default();
        let message = extract_error_message(&body, status.as_u16());
        tracing::debug!(status = status.as_u16(), error = %message, "sendMessage failed");
        Err(TelegramError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

/// Pull the API's `description` field out of an error body, falling back to
/// the raw body (capped) or the bare status code.
fn extract_error_message(body: &str, status: u16) -> String {
    if let Ok(envelope) = serde_json::from_str::<ApiEnvelope>(body) {
        if let Some(description) = envelope.description {
            return description;
        }
    }
    if body.is_empty() {
        status.to_string()
    } else {
        body.chars().take(ERROR_BODY_CAP).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_message_prefers_api_description() {
        let body = r#"{"ok":false,"error_code":403,"description":"Forbidden: bot was kicked"}"#;
        assert_eq!(
            extract_error_message(body, 403),
            "Forbidden: bot was kicked"
        );
    }

    #[test]
    fn error_message_falls_back_to_raw_body() {
        assert_eq!(extract_error_message("<html>bad gateway</html>", 502), "<html>bad gateway</html>");
    }

    #[test]
    fn error_message_falls_back_to_status_code() {
        assert_eq!(extract_error_message("", 500), "500");
    }
}
