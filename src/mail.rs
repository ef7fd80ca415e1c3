//! Gmail mailbox access.
//!
//! Talks to the Gmail REST API via reqwest: lists unread inbox messages,
//! fetches them in full, and marks them read once a notification has gone
//! out. Message bodies arrive as a tree of MIME parts with base64url
//! payloads; the plain-text parts are collected with an explicit work stack
//! so malformed nesting cannot exhaust the call stack.

use crate::config::GmailSecrets;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration as StdDuration;
use thiserror::Error;
use tracing::debug;

const GMAIL_API_BASE: &str = "https://gmail.googleapis.com/gmail/v1/users/me";
const TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";

/// User-Agent string identifying this client
const USER_AGENT: &str = concat!("mailbrief/", env!("CARGO_PKG_VERSION"));

/// Default timeout for HTTP requests
const REQUEST_TIMEOUT: StdDuration = StdDuration::from_secs(30);

/// Body handed to the summariser when a message has no text/plain part
pub const NO_BODY_PLACEHOLDER: &str = "No body content available";

#[derive(Error, Debug)]
pub enum MailError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("gmail api returned {status}: {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("token refresh failed: {0}")]
    TokenRefresh(String),
}

/// A fetched mail message, reduced to what the notification needs
#[derive(Debug, Clone)]
pub struct MailMessage {
    pub id: String,
    pub sender: String,
    pub subject: String,
    pub timestamp: DateTime<Utc>,
    pub body: String,
}

/// Short-lived OAuth access token with its expiry
#[derive(Debug, Clone)]
struct AccessToken {
    token: String,
    expires_at: DateTime<Utc>,
}

impl AccessToken {
    /// Expired, with a 60-second margin so a token never dies mid-request
    fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at - Duration::seconds(60)
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct MessageList {
    messages: Vec<MessageRef>,
}

#[derive(Debug, Deserialize)]
struct MessageRef {
    id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MessageResource {
    id: String,
    internal_date: Option<String>,
    payload: Option<MessagePart>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
struct MessagePart {
    mime_type: Option<String>,
    headers: Vec<Header>,
    body: Option<PartBody>,
    parts: Vec<MessagePart>,
}

#[derive(Debug, Deserialize)]
struct Header {
    name: String,
    value: String,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct PartBody {
    data: Option<String>,
}

/// Gmail REST client holding a cached access token
pub struct GmailClient {
    http: Client,
    secrets: GmailSecrets,
    token: Option<AccessToken>,
}

impl GmailClient {
    /// Create a client for the given OAuth credentials
    pub fn new(secrets: GmailSecrets) -> Result<Self, MailError> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            secrets,
            token: None,
        })
    }

    /// List the ids of unread inbox messages, newest first
    pub async fn list_unread(&mut self, max_results: u32) -> Result<Vec<String>, MailError> {
        let token = self.access_token().await?;
        let query: Vec<(&str, String)> = vec![
            ("labelIds", "INBOX".to_string()),
            ("labelIds", "UNREAD".to_string()),
            ("maxResults", max_results.to_string()),
        ];
        let response = self
            .http
            .get(format!("{}/messages", GMAIL_API_BASE))
            .bearer_auth(&token)
            .query(&query)
            .send()
            .await?;
        let list: MessageList = check(response).await?.json().await?;
        Ok(list.messages.into_iter().map(|m| m.id).collect())
    }

    /// Fetch a full message and reduce it to a [`MailMessage`]
    pub async fn fetch(&mut self, id: &str) -> Result<MailMessage, MailError> {
        let token = self.access_token().await?;
        let response = self
            .http
            .get(format!("{}/messages/{}", GMAIL_API_BASE, id))
            .bearer_auth(&token)
            .query(&[("format", "full")])
            .send()
            .await?;
        let resource: MessageResource = check(response).await?.json().await?;
        Ok(reduce_message(resource))
    }

    /// Remove the UNREAD label after the notification has been delivered
    pub async fn mark_read(&mut self, id: &str) -> Result<(), MailError> {
        let token = self.access_token().await?;
        let response = self
            .http
            .post(format!("{}/messages/{}/modify", GMAIL_API_BASE, id))
            .bearer_auth(&token)
            .json(&serde_json::json!({ "removeLabelIds": ["UNREAD"] }))
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    /// Return a valid access token, refreshing it through the refresh-token
    /// grant when the cached one is missing or about to expire
    async fn access_token(&mut self) -> Result<String, MailError> {
        if let Some(token) = &self.token {
            if !token.is_expired() {
                return Ok(token.token.clone());
            }
        }

        let form = [
            ("client_id", self.secrets.client_id.as_str()),
            ("client_secret", self.secrets.client_secret.as_str()),
            ("refresh_token", self.secrets.refresh_token.as_str()),
            ("grant_type", "refresh_token"),
        ];
        let response = self.http.post(TOKEN_ENDPOINT).form(&form).send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(MailError::TokenRefresh(format!("{}: {}", status, body)));
        }
        let refreshed: TokenResponse = response.json().await?;
        debug!("refreshed gmail access token");

        let token = AccessToken {
            token: refreshed.access_token,
            expires_at: Utc::now() + Duration::seconds(refreshed.expires_in),
        };
        let value = token.token.clone();
        self.token = Some(token);
        Ok(value)
    }
}

/// Surface non-2xx responses as API errors with their body text
async fn check(response: reqwest::Response) -> Result<reqwest::Response, MailError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        let body = response.text().await.unwrap_or_default();
        Err(MailError::Api { status, body })
    }
}

/// Reduce a Gmail message resource to the fields a notification needs
fn reduce_message(resource: MessageResource) -> MailMessage {
    let headers = resource
        .payload
        .as_ref()
        .map(|p| p.headers.as_slice())
        .unwrap_or(&[]);
    let sender = header_value(headers, "From").unwrap_or("Unknown").to_string();
    let subject = header_value(headers, "Subject")
        .unwrap_or("No Subject")
        .to_string();
    let timestamp = resource
        .internal_date
        .as_deref()
        .and_then(|ms| ms.parse::<i64>().ok())
        .and_then(DateTime::from_timestamp_millis)
        .unwrap_or_else(Utc::now);
    let body = resource
        .payload
        .as_ref()
        .map(extract_plain_text)
        .unwrap_or_else(|| NO_BODY_PLACEHOLDER.to_string());

    MailMessage {
        id: resource.id,
        sender,
        subject,
        timestamp,
        body,
    }
}

fn header_value<'a>(headers: &'a [Header], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|h| h.name.eq_ignore_ascii_case(name))
        .map(|h| h.value.as_str())
}

/// Collect every text/plain part of the payload tree, in document order.
///
/// The traversal uses an explicit stack: part trees come from the network
/// and arbitrarily deep nesting must not translate into call-stack depth.
fn extract_plain_text(payload: &MessagePart) -> String {
    let mut collected: Vec<String> = Vec::new();

    if payload.parts.is_empty() {
        // Single-part message: the payload body is the text
        if let Some(data) = payload.body.as_ref().and_then(|b| b.data.as_deref()) {
            if let Some(text) = decode_body(data) {
                collected.push(text);
            }
        }
    } else {
        let mut stack: Vec<&MessagePart> = payload.parts.iter().rev().collect();
        while let Some(part) = stack.pop() {
            if part.parts.is_empty() {
                if part.mime_type.as_deref() == Some("text/plain") {
                    if let Some(data) = part.body.as_ref().and_then(|b| b.data.as_deref()) {
                        if let Some(text) = decode_body(data) {
                            collected.push(text);
                        }
                    }
                }
            } else {
                for child in part.parts.iter().rev() {
                    stack.push(child);
                }
            }
        }
    }

    if collected.is_empty() {
        NO_BODY_PLACEHOLDER.to_string()
    } else {
        collected.join("\n")
    }
}

/// Decode a base64url body segment; padding is tolerated either way.
/// Undecodable segments are skipped rather than failing the whole body.
fn decode_body(data: &str) -> Option<String> {
    let bytes = URL_SAFE_NO_PAD.decode(data.trim_end_matches('=')).ok()?;
    Some(String::from_utf8_lossy(&bytes).into_owned())
}
