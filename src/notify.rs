//! WhatsApp delivery via the Twilio REST API.
//!
//! Formats a notification from a mail message and its summary, enforces the
//! outbound character limit, and posts to Twilio with bounded retries.

use crate::config::{TwilioSecrets, WhatsAppConfig};
use crate::mail::MailMessage;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

const TWILIO_API_BASE: &str = "https://api.twilio.com/2010-04-01";

/// User-Agent string identifying this client
const USER_AGENT: &str = concat!("mailbrief/", env!("CARGO_PKG_VERSION"));

/// Default timeout for HTTP requests
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Send attempts per message before giving up
const MAX_RETRIES: u32 = 3;

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("twilio api returned {status}: {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    sid: String,
}

/// Render the notification text for a summarised message
pub fn format_notification(message: &MailMessage, summary: &str) -> String {
    format!(
        "📧 New Email\nFrom: {}\nSubject: {}\nTime: {}\nSummary: {}",
        message.sender,
        message.subject,
        message.timestamp.format("%Y-%m-%d %H:%M:%S"),
        summary
    )
}

/// Cap a message at `max_chars` characters, marking the cut with `...`.
/// Counts characters rather than bytes so the cut never lands inside a
/// multi-byte sequence.
pub fn truncate_message(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{}...", kept)
}

/// Twilio WhatsApp sender
pub struct WhatsAppSender {
    http: Client,
    secrets: TwilioSecrets,
    config: WhatsAppConfig,
}

impl WhatsAppSender {
    /// Create a sender for the given account and numbers
    pub fn new(secrets: TwilioSecrets, config: WhatsAppConfig) -> Result<Self, NotifyError> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            secrets,
            config,
        })
    }

    /// Send a WhatsApp message, returning the Twilio message sid.
    ///
    /// The body is truncated to the configured limit first. Failed attempts
    /// are retried with exponential backoff (1 s, 2 s) up to three tries.
    pub async fn send(&self, body: &str) -> Result<String, NotifyError> {
        let body = truncate_message(body, self.config.max_chars);
        let url = format!(
            "{}/Accounts/{}/Messages.json",
            TWILIO_API_BASE, self.secrets.account_sid
        );

        let mut attempt = 0;
        loop {
            match self.try_send(&url, &body).await {
                Ok(sid) => {
                    info!(sid = %sid, chars = body.chars().count(), "whatsapp message sent");
                    return Ok(sid);
                }
                Err(err) if attempt + 1 < MAX_RETRIES => {
                    let delay = Duration::from_secs(1 << attempt);
                    warn!(
                        "send attempt {} failed ({}), retrying in {:?}",
                        attempt + 1,
                        err,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn try_send(&self, url: &str, body: &str) -> Result<String, NotifyError> {
        let form = [
            ("To", format!("whatsapp:{}", self.config.to_number)),
            ("From", format!("whatsapp:{}", self.config.from_number)),
            ("Body", body.to_string()),
        ];
        let response = self
            .http
            .post(url)
            .basic_auth(&self.secrets.account_sid, Some(&self.secrets.auth_token))
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Api { status, body });
        }
        let message: MessageResponse = response.json().await?;
        Ok(message.sid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn notification_layout_matches_expected_fields() {
        let message = MailMessage {
            id: "m1".to_string(),
            sender: "bob@example.com".to_string(),
            subject: "Lunch plans".to_string(),
            timestamp: chrono::Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap(),
            body: String::new(),
        };
        let rendered = format_notification(&message, "Meet at noon.");
        assert_eq!(
            rendered,
            "📧 New Email\nFrom: bob@example.com\nSubject: Lunch plans\n\
             Time: 2024-03-01 12:30:00\nSummary: Meet at noon."
        );
    }

    #[test]
    fn short_messages_pass_through_unchanged() {
        assert_eq!(truncate_message("hello", 10), "hello");
        assert_eq!(truncate_message("hello", 5), "hello");
    }

    #[test]
    fn long_messages_are_cut_with_ellipsis() {
        let text = "a".repeat(20);
        let truncated = truncate_message(&text, 10);
        assert_eq!(truncated, format!("{}...", "a".repeat(7)));
        assert_eq!(truncated.chars().count(), 10);
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        let text = "€".repeat(10);
        let truncated = truncate_message(&text, 8);
        assert_eq!(truncated, format!("{}...", "€".repeat(5)));
        assert_eq!(truncated.chars().count(), 8);
    }
}
