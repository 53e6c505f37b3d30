//! Error types for miab-client

use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Unexpected server response: {0}")]
    Protocol(String),

    #[error("IMAP error: {0}")]
    Imap(String),

    #[error("TLS error: {0}")]
    Tls(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Email parsing error: {0}")]
    Parse(String),

    #[error("Invalid filter criteria: {0}")]
    Criteria(String),

    #[error("Email not found within {}ms", .0.as_millis())]
    Timeout(Duration),

    #[error("Wait cancelled")]
    Cancelled,

    #[error("Inbox fetch failed {failures} times in a row: {source}")]
    RetrievalFailed {
        failures: u32,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Whether this error came out of an IMAP session (connect, login,
    /// SELECT, FETCH or message parsing).
    #[must_use]
    pub fn is_retrieval(&self) -> bool {
        matches!(
            self,
            Self::Imap(_) | Self::Tls(_) | Self::Io(_) | Self::Parse(_)
        )
    }

    /// The payload reported as `response` in a failed [`Envelope`].
    ///
    /// HTTP error bodies are passed through verbatim (as JSON when the
    /// server sent JSON), everything else is the error message.
    ///
    /// [`Envelope`]: crate::Envelope
    #[must_use]
    pub fn detail(&self) -> serde_json::Value {
        match self {
            Self::Http { body, .. } | Self::Protocol(body) => {
                serde_json::from_str(body)
                    .unwrap_or_else(|_| serde_json::Value::String(body.trim().to_string()))
            }
            other => serde_json::Value::String(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
