//! Inbox retrieval over IMAP
//!
//! Every fetch opens its own session, reads the whole INBOX and logs
//! out again, whether or not the read succeeded. Nothing is cached
//! between calls, so each poll re-downloads and re-parses every
//! message.

use crate::client::MiabClient;
use crate::connection::{self, ImapSession};
use crate::error::{Error, Result};
use crate::message::ParsedMessage;
use futures::StreamExt;
use std::future::Future;
use tracing::{debug, info, warn};

const INBOX: &str = "INBOX";

/// Something that can list a mailbox's inbox.
///
/// [`MiabClient`] reads it over IMAP; tests substitute canned inboxes.
pub trait Inbox {
    /// All messages in the inbox of `email`, oldest first.
    fn fetch_inbox(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<Vec<ParsedMessage>>> + Send;
}

impl MiabClient {
    /// Fetch and parse every message in the INBOX of `email`. Messages
    /// that cannot be parsed are logged and left out.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`], [`Error::Tls`] or [`Error::Imap`] if the
    /// session cannot be opened or a command fails.
    pub async fn fetch_emails(&self, email: &str, password: &str) -> Result<Vec<ParsedMessage>> {
        let mut session = connection::connect(self.imap_endpoint(), email, password).await?;

        let result = read_inbox(&mut session).await;

        if let Err(e) = session.logout().await {
            debug!("Logout failed: {}", e);
        }
        result
    }
}

impl Inbox for MiabClient {
    fn fetch_inbox(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<Vec<ParsedMessage>>> + Send {
        self.fetch_emails(email, password)
    }
}

async fn read_inbox(session: &mut ImapSession) -> Result<Vec<ParsedMessage>> {
    let exists = connection::select(session, INBOX).await?;
    if exists == 0 {
        debug!("INBOX is empty");
        return Ok(vec![]);
    }

    let mut fetches = session
        .fetch("1:*", "BODY.PEEK[]")
        .await
        .map_err(|e| Error::Imap(format!("Fetch failed: {e}")))?;

    let mut raw = Vec::new();
    while let Some(item) = fetches.next().await {
        let fetch = item.map_err(|e| Error::Imap(format!("Fetch error: {e}")))?;
        if let Some(body) = fetch.body() {
            raw.push((fetch.message, body.to_vec()));
        }
    }
    drop(fetches);

    let messages = parse_all(raw);
    info!("Fetched {} messages from INBOX", messages.len());
    Ok(messages)
}

/// Parse fetched bodies in sequence order. Bodies that are not a
/// message at all are skipped so one broken message cannot hide the
/// rest of the inbox.
fn parse_all(mut raw: Vec<(u32, Vec<u8>)>) -> Vec<ParsedMessage> {
    raw.sort_by_key(|(seq, _)| *seq);
    raw.iter()
        .filter_map(|(seq, body)| match ParsedMessage::parse(*seq, body) {
            Ok(message) => Some(message),
            Err(e) => {
                warn!("Skipping message {}: {}", seq, e);
                None
            }
        })
        .collect()
}
