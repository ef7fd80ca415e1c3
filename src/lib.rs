//! # mailbrief
//!
//! An inbox watcher that summarises unread mail and forwards it to WhatsApp.
//!
//! ## How it works
//!
//! - **Extractive summaries**: sentences are scored by document-wide word
//!   frequency (stop words excluded) and the best ones are returned in
//!   their original order — no LLM, no network call
//! - **Gmail polling**: unread messages are fetched over the Gmail REST
//!   API and marked read once their notification has been delivered
//! - **WhatsApp delivery**: summaries go out through the Twilio API with a
//!   hard character limit and bounded retries

pub mod config;
pub mod language;
pub mod mail;
pub mod notify;
pub mod service;
pub mod summarize;

pub use config::Config;
pub use language::Language;
pub use mail::GmailClient;
pub use notify::WhatsAppSender;
pub use service::NotifierService;
pub use summarize::Summarizer;
