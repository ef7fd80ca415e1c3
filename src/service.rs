//! The polling service gluing mailbox, summariser, and delivery together.
//!
//! One check cycle lists unread messages, then fetches, summarises,
//! formats, sends, and marks each one read. Failures are logged and the
//! loop keeps going; a message that could not be delivered stays unread
//! and is picked up again on the next cycle.

use crate::config::Config;
use crate::mail::{GmailClient, MailError};
use crate::notify::{self, NotifyError, WhatsAppSender};
use crate::summarize::Summarizer;
use std::time::Duration;
use thiserror::Error;
use tokio::time;
use tracing::{debug, error, info, warn};

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error(transparent)]
    Mail(#[from] MailError),
    #[error(transparent)]
    Notify(#[from] NotifyError),
}

/// Inbox watcher: polls for unread mail and forwards summaries
pub struct NotifierService {
    config: Config,
    gmail: GmailClient,
    sender: WhatsAppSender,
    summarizer: Summarizer,
}

impl NotifierService {
    pub fn new(
        config: Config,
        gmail: GmailClient,
        sender: WhatsAppSender,
        summarizer: Summarizer,
    ) -> Self {
        Self {
            config,
            gmail,
            sender,
            summarizer,
        }
    }

    /// Poll the inbox on the configured interval until the task is dropped
    pub async fn run(&mut self) {
        let interval = Duration::from_secs(self.config.mail.poll_interval_secs);
        let mut ticker = time::interval(interval);
        info!("mailbox watch started (interval: {:?})", interval);

        loop {
            ticker.tick().await;
            debug!("running mailbox check cycle");
            if let Err(e) = self.check_cycle().await {
                // Keep polling even when a whole cycle fails
                error!("mailbox check failed: {}", e);
            }
        }
    }

    /// Run one check cycle; returns the number of notifications delivered
    pub async fn check_cycle(&mut self) -> Result<usize, ServiceError> {
        let ids = self
            .gmail
            .list_unread(self.config.mail.max_messages)
            .await?;
        if ids.is_empty() {
            debug!("no unread messages");
            return Ok(0);
        }

        info!("processing {} unread message(s)", ids.len());
        let mut delivered = 0;
        for id in ids {
            match self.notify_one(&id).await {
                Ok(()) => delivered += 1,
                // The message stays unread and is retried next cycle
                Err(e) => warn!("message {} skipped: {}", id, e),
            }
        }
        Ok(delivered)
    }

    async fn notify_one(&mut self, id: &str) -> Result<(), ServiceError> {
        let message = self.gmail.fetch(id).await?;
        let summary = self
            .summarizer
            .summarize(&message.body, self.config.summary.sentences);
        let notification = notify::format_notification(&message, &summary);
        self.sender.send(&notification).await?;

        // Marked read only after delivery, so nothing is silently dropped
        self.gmail.mark_read(id).await?;
        info!(id = %id, from = %message.sender, "notification delivered");
        Ok(())
    }
}
