//! Waiting for a matching email
//!
//! The wait re-fetches the whole inbox every `interval` until a
//! message matches, the `timeout` runs out or the wait is cancelled.
//! A failed fetch is retried on the next tick; after
//! `max_consecutive_failures` failures in a row the wait gives up with
//! [`Error::RetrievalFailed`]. A fetch still running when the timeout
//! is reached is dropped and the wait ends with [`Error::Timeout`].

use crate::client::MiabClient;
use crate::error::{Error, Result};
use crate::filter::FilterCriteria;
use crate::inbox::Inbox;
use crate::message::ParsedMessage;
use std::time::Duration;
use tokio::time::{Instant, sleep, timeout};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(5 * 60);
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);
pub const DEFAULT_MAX_CONSECUTIVE_FAILURES: u32 = 5;

/// Timing and cancellation of [`wait_for_mail`].
#[derive(Debug, Clone)]
pub struct WaitOptions {
    pub timeout: Duration,
    pub interval: Duration,
    /// Fetch failures in a row tolerated before giving up. `0` never
    /// gives up before the timeout.
    pub max_consecutive_failures: u32,
    pub cancel: Option<CancellationToken>,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_WAIT_TIMEOUT,
            interval: DEFAULT_POLL_INTERVAL,
            max_consecutive_failures: DEFAULT_MAX_CONSECUTIVE_FAILURES,
            cancel: None,
        }
    }
}

impl WaitOptions {
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    #[must_use]
    pub fn max_consecutive_failures(mut self, failures: u32) -> Self {
        self.max_consecutive_failures = failures;
        self
    }

    #[must_use]
    pub fn cancel_on(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }
}

/// Poll `inbox` until a message matches `criteria`, returning the
/// earliest match of the first successful cycle that has one.
///
/// # Errors
///
/// - [`Error::Config`] if `email` or `password` is empty
/// - [`Error::Criteria`] if `criteria` is empty
/// - [`Error::Timeout`] if nothing matched in time
/// - [`Error::RetrievalFailed`] after too many failed fetches in a row
/// - [`Error::Cancelled`] if the cancellation token fired
pub async fn wait_for_mail<I: Inbox + ?Sized>(
    inbox: &I,
    email: &str,
    password: &str,
    criteria: &FilterCriteria,
    options: &WaitOptions,
) -> Result<ParsedMessage> {
    if email.is_empty() || password.is_empty() {
        return Err(Error::Config(
            "The email and password must be provided".into(),
        ));
    }
    criteria.validate()?;

    let start = Instant::now();
    let mut attempt = 0u32;
    let mut failures = 0u32;

    while start.elapsed() < options.timeout {
        attempt += 1;

        let remaining = options.timeout.saturating_sub(start.elapsed());
        let Ok(fetched) = timeout(remaining, inbox.fetch_inbox(email, password)).await else {
            warn!("Fetching inbox of {} ran past the deadline", email);
            break;
        };

        match fetched {
            Ok(messages) => {
                failures = 0;
                if let Some(found) = messages.into_iter().find(|m| criteria.matches(m)) {
                    info!("Matching email found for {} on attempt {}", email, attempt);
                    return Ok(found);
                }
                debug!("No matching email for {} yet (attempt {})", email, attempt);
            }
            Err(e) => {
                failures += 1;
                warn!("Fetching inbox of {} failed ({} in a row): {}", email, failures, e);
                if options.max_consecutive_failures > 0
                    && failures >= options.max_consecutive_failures
                {
                    return Err(Error::RetrievalFailed {
                        failures,
                        source: Box::new(e),
                    });
                }
            }
        }

        let remaining = options.timeout.saturating_sub(start.elapsed());
        if remaining.is_zero() {
            break;
        }
        pause(options.interval.min(remaining), options.cancel.as_ref()).await?;
    }

    Err(Error::Timeout(options.timeout))
}

async fn pause(duration: Duration, cancel: Option<&CancellationToken>) -> Result<()> {
    match cancel {
        Some(token) => tokio::select! {
            () = token.cancelled() => Err(Error::Cancelled),
            () = sleep(duration) => Ok(()),
        },
        None => {
            sleep(duration).await;
            Ok(())
        }
    }
}

impl MiabClient {
    /// Wait for an email matching `criteria` to land in the inbox of
    /// `email`. See [`wait_for_mail`].
    ///
    /// # Errors
    ///
    /// Same as [`wait_for_mail`].
    pub async fn wait_for_email(
        &self,
        email: &str,
        password: &str,
        criteria: &FilterCriteria,
        options: &WaitOptions,
    ) -> Result<ParsedMessage> {
        wait_for_mail(self, email, password, criteria, options).await
    }
}
