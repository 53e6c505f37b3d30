//! Parsed inbox messages
//!
//! Wraps [`mail_parser`] output into an owned, serializable struct with
//! the fields the filter engine looks at.

use crate::error::{Error, Result};
use chrono::{DateTime, FixedOffset};
use mail_parser::{Address, MessageParser};
use serde::Serialize;

/// A message fetched from an inbox.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedMessage {
    /// IMAP sequence number within the inbox at fetch time.
    pub seq: u32,
    /// Sender display text, e.g. `Alice <alice@example.com>`.
    pub from: String,
    pub to: String,
    pub subject: String,
    pub date: Option<DateTime<FixedOffset>>,
    pub message_id: Option<String>,
    /// Plain text body (converted from HTML when there is no text part).
    pub text: String,
    /// HTML rendering of the body.
    pub text_as_html: String,
    /// Every header as `(name, raw value)` in message order.
    pub headers: Vec<(String, String)>,
}

impl ParsedMessage {
    /// Parse a full RFC 5322 message source.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] if `raw` is not a message at all.
    pub fn parse(seq: u32, raw: &[u8]) -> Result<Self> {
        let message = MessageParser::default()
            .parse(raw)
            .ok_or_else(|| Error::Parse(format!("Message {seq} is not a valid email")))?;

        Ok(Self {
            seq,
            from: message.from().map(address_text).unwrap_or_default(),
            to: message.to().map(address_text).unwrap_or_default(),
            subject: message.subject().unwrap_or_default().to_string(),
            date: message
                .date()
                .and_then(|d| DateTime::parse_from_rfc3339(&d.to_rfc3339()).ok()),
            message_id: message.message_id().map(ToString::to_string),
            text: message
                .body_text(0)
                .map(|t| t.into_owned())
                .unwrap_or_default(),
            text_as_html: message
                .body_html(0)
                .map(|h| h.into_owned())
                .unwrap_or_default(),
            headers: message
                .headers_raw()
                .map(|(name, value)| (name.to_string(), value.trim().to_string()))
                .collect(),
        })
    }

    /// First header value with the given name (case-insensitive).
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Render an address header the way mail clients show it:
/// `Name <addr>` entries joined with `, `.
fn address_text(address: &Address<'_>) -> String {
    address
        .iter()
        .map(|addr| match (addr.name(), addr.address()) {
            (Some(name), Some(email)) => format!("{name} <{email}>"),
            (None, Some(email)) => email.to_string(),
            (Some(name), None) => name.to_string(),
            (None, None) => String::new(),
        })
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}
