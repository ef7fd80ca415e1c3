//! Configuration loading and management for mailbrief.
//!
//! Loads settings from `mailbrief.toml` with environment variable overrides
//! for all credentials, so secrets never need to live in the config file.

use crate::language::Language;
use crate::summarize::DEFAULT_SUMMARY_SENTENCES;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("missing required credential: {0}")]
    MissingSecret(&'static str),
    #[error("unsupported summary language: {0}")]
    UnsupportedLanguage(String),
}

/// Summarisation settings — the only configuration that affects summary output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryConfig {
    /// Number of sentences to keep in a summary
    #[serde(default = "default_sentences")]
    pub sentences: usize,
    /// Language tag selecting stop words and sentence rules
    #[serde(default = "default_language")]
    pub language: String,
}

/// Mailbox polling settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    /// Seconds between inbox checks
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
    /// Unread messages fetched per check
    #[serde(default = "default_max_messages")]
    pub max_messages: u32,
}

/// WhatsApp delivery settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhatsAppConfig {
    /// Sending number registered with Twilio (without the `whatsapp:` prefix)
    pub from_number: String,
    /// Recipient number
    pub to_number: String,
    /// Hard limit on outbound message length, in characters
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,
}

/// Credentials (loaded from environment)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ApiConfig {
    #[serde(default)]
    pub google_client_id: Option<String>,
    #[serde(default)]
    pub google_client_secret: Option<String>,
    #[serde(default)]
    pub gmail_refresh_token: Option<String>,
    #[serde(default)]
    pub twilio_account_sid: Option<String>,
    #[serde(default)]
    pub twilio_auth_token: Option<String>,
}

/// OAuth credentials for the Gmail collaborator
#[derive(Debug, Clone)]
pub struct GmailSecrets {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
}

/// Twilio account credentials
#[derive(Debug, Clone)]
pub struct TwilioSecrets {
    pub account_sid: String,
    pub auth_token: String,
}

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub summary: SummaryConfig,
    #[serde(default)]
    pub mail: MailConfig,
    pub whatsapp: WhatsAppConfig,
    #[serde(default)]
    pub api: ApiConfig,
}

impl Config {
    /// Load configuration from the default location (mailbrief.toml in cwd or home)
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::find_config_file()?;
        Self::load_from(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &PathBuf) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&content)?;

        // Override credentials from environment variables
        if let Ok(value) = std::env::var("GOOGLE_CLIENT_ID") {
            config.api.google_client_id = Some(value);
        }
        if let Ok(value) = std::env::var("GOOGLE_CLIENT_SECRET") {
            config.api.google_client_secret = Some(value);
        }
        if let Ok(value) = std::env::var("GMAIL_REFRESH_TOKEN") {
            config.api.gmail_refresh_token = Some(value);
        }
        if let Ok(value) = std::env::var("TWILIO_ACCOUNT_SID") {
            config.api.twilio_account_sid = Some(value);
        }
        if let Ok(value) = std::env::var("TWILIO_AUTH_TOKEN") {
            config.api.twilio_auth_token = Some(value);
        }

        Ok(config)
    }

    /// Find the config file in standard locations
    fn find_config_file() -> Result<PathBuf, ConfigError> {
        // Check current directory first
        let local_config = PathBuf::from("mailbrief.toml");
        if local_config.exists() {
            return Ok(local_config);
        }

        // Check home directory
        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config").join("mailbrief").join("mailbrief.toml");
            if home_config.exists() {
                return Ok(home_config);
            }
        }

        // Default to local path (will error on read)
        Ok(local_config)
    }

    /// Resolve the configured summary language, rejecting unknown tags
    pub fn language(&self) -> Result<Language, ConfigError> {
        Language::from_tag(&self.summary.language)
            .ok_or_else(|| ConfigError::UnsupportedLanguage(self.summary.language.clone()))
    }

    /// Gmail OAuth credentials, required to poll the mailbox
    pub fn gmail_secrets(&self) -> Result<GmailSecrets, ConfigError> {
        Ok(GmailSecrets {
            client_id: require(&self.api.google_client_id, "GOOGLE_CLIENT_ID")?,
            client_secret: require(&self.api.google_client_secret, "GOOGLE_CLIENT_SECRET")?,
            refresh_token: require(&self.api.gmail_refresh_token, "GMAIL_REFRESH_TOKEN")?,
        })
    }

    /// Twilio credentials, required to deliver notifications
    pub fn twilio_secrets(&self) -> Result<TwilioSecrets, ConfigError> {
        Ok(TwilioSecrets {
            account_sid: require(&self.api.twilio_account_sid, "TWILIO_ACCOUNT_SID")?,
            auth_token: require(&self.api.twilio_auth_token, "TWILIO_AUTH_TOKEN")?,
        })
    }
}

fn require(value: &Option<String>, name: &'static str) -> Result<String, ConfigError> {
    value
        .as_deref()
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or(ConfigError::MissingSecret(name))
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            sentences: default_sentences(),
            language: default_language(),
        }
    }
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval(),
            max_messages: default_max_messages(),
        }
    }
}

fn default_sentences() -> usize {
    DEFAULT_SUMMARY_SENTENCES
}

fn default_language() -> String {
    "english".to_string()
}

fn default_poll_interval() -> u64 {
    60
}

fn default_max_messages() -> u32 {
    3
}

fn default_max_chars() -> usize {
    1500
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const MINIMAL: &str = r#"
[whatsapp]
from_number = "+14155238886"
to_number = "+46700000000"
"#;

    #[test]
    fn minimal_config_gets_defaults() {
        let config: Config = toml::from_str(MINIMAL).unwrap();
        assert_eq!(config.summary.sentences, 3);
        assert_eq!(config.summary.language, "english");
        assert_eq!(config.mail.poll_interval_secs, 60);
        assert_eq!(config.mail.max_messages, 3);
        assert_eq!(config.whatsapp.max_chars, 1500);
    }

    #[test]
    fn explicit_values_override_defaults() {
        let toml_str = r#"
[summary]
sentences = 5
language = "en"

[mail]
poll_interval_secs = 300

[whatsapp]
from_number = "+1"
to_number = "+2"
max_chars = 800
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.summary.sentences, 5);
        assert_eq!(config.mail.poll_interval_secs, 300);
        assert_eq!(config.whatsapp.max_chars, 800);
        assert_eq!(config.language().unwrap(), Language::English);
    }

    #[test]
    fn unsupported_language_is_rejected() {
        let mut config: Config = toml::from_str(MINIMAL).unwrap();
        config.summary.language = "latin".to_string();
        assert!(matches!(
            config.language(),
            Err(ConfigError::UnsupportedLanguage(_))
        ));
    }

    #[test]
    fn missing_secret_is_reported_by_name() {
        let config: Config = toml::from_str(MINIMAL).unwrap();
        match config.twilio_secrets() {
            Err(ConfigError::MissingSecret(name)) => assert_eq!(name, "TWILIO_ACCOUNT_SID"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn secrets_can_come_from_the_config_file() {
        let toml_str = r#"
[whatsapp]
from_number = "+1"
to_number = "+2"

[api]
twilio_account_sid = "ACxxxx"
twilio_auth_token = "token"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        let secrets = config.twilio_secrets().unwrap();
        assert_eq!(secrets.account_sid, "ACxxxx");
        assert_eq!(secrets.auth_token, "token");
    }

    #[test]
    fn load_from_reads_a_file_on_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(MINIMAL.as_bytes()).unwrap();
        let config = Config::load_from(&file.path().to_path_buf()).unwrap();
        assert_eq!(config.whatsapp.from_number, "+14155238886");
    }
}
