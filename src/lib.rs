//! Mail-in-a-Box client library
//!
//! Talks to the admin HTTP API of a
//! [Mail-in-a-Box](https://mailinabox.email) box to provision
//! mailboxes, aliases and admin privileges, and reads mailbox inboxes
//! over IMAP to wait for a specific email to arrive.
//!
//! ```no_run
//! use miab_client::{FilterCriteria, MiabClient, WaitOptions};
//!
//! # async fn demo() -> miab_client::Result<()> {
//! let client = MiabClient::new("https://box.example.com", "admin@example.com", "secret")?;
//! let mailbox = client.create_mailbox("example.com", None, None).await?;
//!
//! let criteria = FilterCriteria::new().pattern(r"code: \d{6}");
//! let email = client
//!     .wait_for_email(&mailbox.email, &mailbox.password, &criteria, &WaitOptions::default())
//!     .await?;
//! println!("{}", email.subject);
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod connection;
mod credentials;
mod envelope;
mod error;
mod filter;
mod identity;
mod inbox;
mod message;
mod models;
mod poll;
mod transport;

pub use client::MiabClient;
pub use config::{DEFAULT_IMAP_PORT, DEFAULT_REQUEST_TIMEOUT, MiabConfig};
pub use credentials::Credentials;
pub use envelope::Envelope;
pub use error::{Error, Result};
pub use filter::{FilterCriteria, Pattern, filter};
pub use identity::{DEFAULT_PASSWORD_LENGTH, generate_password, generate_username};
pub use inbox::Inbox;
pub use message::ParsedMessage;
pub use models::{
    Alias, AliasDomain, MailDomain, MailUser, Mailbox, WebDomain, domain_names, mailbox_addresses,
};
pub use poll::{
    DEFAULT_MAX_CONSECUTIVE_FAILURES, DEFAULT_POLL_INTERVAL, DEFAULT_WAIT_TIMEOUT, WaitOptions,
    wait_for_mail,
};
pub use tokio_util::sync::CancellationToken;
