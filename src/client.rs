//! Mail-in-a-Box admin client

use crate::config::MiabConfig;
use crate::connection::ImapEndpoint;
use crate::credentials::Credentials;
use crate::error::{Error, Result};
use crate::identity::{self, DEFAULT_PASSWORD_LENGTH};
use crate::models::{AliasDomain, MailDomain, Mailbox, WebDomain};
use crate::transport::Transport;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::de::DeserializeOwned;
use std::sync::{Mutex, PoisonError};
use tracing::{info, warn};

/// Body the box answers with after a successful `users/add`.
const MAIL_USER_ADDED: &str = "mail user added";

/// Client for the admin API and inboxes of one Mail-in-a-Box box.
///
/// Admin operations authenticate with the admin credentials; inbox
/// operations log into the mailbox given to each call. Changing the
/// credentials takes `&mut self`, so it cannot race an in-flight
/// request.
pub struct MiabClient {
    credentials: Credentials,
    transport: Transport,
    imap: ImapEndpoint,
    rng: Mutex<StdRng>,
}

impl MiabClient {
    /// Create a client for `api_url` (e.g. `https://box.example.com`)
    /// with default settings.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if any argument is empty or the URL has
    /// no host.
    pub fn new(
        api_url: impl Into<String>,
        admin_email: impl Into<String>,
        admin_password: impl Into<String>,
    ) -> Result<Self> {
        Self::from_config(MiabConfig::new(api_url, admin_email, admin_password))
    }

    /// Create a client from a full configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for an incomplete configuration and
    /// [`Error::Transport`] if the HTTP client cannot be built.
    pub fn from_config(config: MiabConfig) -> Result<Self> {
        config.validate()?;

        let imap = ImapEndpoint {
            host: config.resolved_imap_host()?,
            port: config.imap_port,
            accept_invalid_certs: config.accept_invalid_certs,
        };
        let transport = Transport::new(
            &config.api_url,
            config.request_timeout,
            config.accept_invalid_certs,
        )?;

        Ok(Self {
            credentials: Credentials::new(config.admin_email, config.admin_password),
            transport,
            imap,
            rng: Mutex::new(StdRng::from_entropy()),
        })
    }

    /// Replace the random source used for generated usernames and
    /// passwords with one seeded from `seed`.
    #[must_use]
    pub fn with_rng_seed(self, seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
            ..self
        }
    }

    #[must_use]
    pub fn admin_email(&self) -> &str {
        self.credentials.email()
    }

    #[must_use]
    pub fn admin_password(&self) -> &str {
        self.credentials.password()
    }

    #[must_use]
    pub const fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn set_email(&mut self, email: impl Into<String>) {
        self.credentials.set_email(email);
    }

    pub fn set_password(&mut self, password: impl Into<String>) {
        self.credentials.set_password(password);
    }

    pub(crate) const fn imap_endpoint(&self) -> &ImapEndpoint {
        &self.imap
    }

    /// A fresh mailbox local-part.
    #[must_use]
    pub fn generate_username(&self) -> String {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        identity::generate_username(&mut *rng)
    }

    /// A fresh alphanumeric password of `length` characters.
    #[must_use]
    pub fn generate_password(&self, length: usize) -> String {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        identity::generate_password(&mut *rng, length)
    }

    // -- mailboxes --

    /// Create `username@domain`, generating whatever is not given.
    ///
    /// The box must answer with its exact confirmation text; any other
    /// body counts as a failure even on HTTP 200.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] with the server's message when the box
    /// rejects the request, [`Error::Protocol`] on an unexpected success
    /// body, and [`Error::Transport`] on network failure.
    pub async fn create_mailbox(
        &self,
        domain: &str,
        username: Option<&str>,
        password: Option<&str>,
    ) -> Result<Mailbox> {
        let username = username.map_or_else(|| self.generate_username(), ToString::to_string);
        let password = password.map_or_else(
            || self.generate_password(DEFAULT_PASSWORD_LENGTH),
            ToString::to_string,
        );
        let email = format!("{username}@{domain}");

        let body = self
            .transport
            .post(
                &self.credentials,
                "/admin/mail/users/add",
                &[("email", email.as_str()), ("password", password.as_str())],
            )
            .await?;

        let body = body.trim();
        if body != MAIL_USER_ADDED {
            warn!("Unexpected answer creating {}: {}", email, body);
            return Err(Error::Protocol(body.to_string()));
        }

        info!("Created mailbox {}", email);
        Ok(Mailbox { email, password })
    }

    /// Delete a mailbox. Returns the server's confirmation text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] when the box rejects the request and
    /// [`Error::Transport`] on network failure.
    pub async fn delete_mailbox(&self, email: &str) -> Result<String> {
        self.post_text("/admin/mail/users/delete", &[("email", email)])
            .await
    }

    /// Set a mailbox password, generating a 12-character one when
    /// `password` is `None`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] when the box rejects the request (e.g.
    /// a password that is too short) and [`Error::Transport`] on
    /// network failure.
    pub async fn update_password(&self, email: &str, password: Option<&str>) -> Result<Mailbox> {
        let password = password.map_or_else(
            || self.generate_password(DEFAULT_PASSWORD_LENGTH),
            ToString::to_string,
        );

        self.post_text(
            "/admin/mail/users/password",
            &[("email", email), ("password", password.as_str())],
        )
        .await?;

        Ok(Mailbox {
            email: email.to_string(),
            password,
        })
    }

    /// All mail users grouped by domain.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Protocol`] when the body is not a JSON array,
    /// plus the usual HTTP and transport errors.
    pub async fn get_mailboxes(&self) -> Result<Vec<MailDomain>> {
        self.get_json_array("/admin/mail/users?format=json").await
    }

    // -- privileges --

    /// Grant the admin privilege to a mail user.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] when the box rejects the request and
    /// [`Error::Transport`] on network failure.
    pub async fn make_admin(&self, email: &str) -> Result<String> {
        self.post_text(
            "/admin/mail/users/privileges/add",
            &[("email", email), ("privilege", "admin")],
        )
        .await
    }

    /// Revoke the admin privilege from a mail user.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] when the box rejects the request and
    /// [`Error::Transport`] on network failure.
    pub async fn remove_admin(&self, email: &str) -> Result<String> {
        self.post_text(
            "/admin/mail/users/privileges/remove",
            &[("email", email), ("privilege", "admin")],
        )
        .await
    }

    // -- aliases --

    /// All aliases grouped by domain.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Protocol`] when the body is not a JSON array,
    /// plus the usual HTTP and transport errors.
    pub async fn get_mail_aliases(&self) -> Result<Vec<AliasDomain>> {
        self.get_json_array("/admin/mail/aliases?format=json").await
    }

    /// Create an alias forwarding `address` to `forwards_to` (one or
    /// more comma-separated addresses).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] when the box rejects the request and
    /// [`Error::Transport`] on network failure.
    pub async fn add_mail_alias(&self, address: &str, forwards_to: &str) -> Result<String> {
        self.post_text(
            "/admin/mail/aliases/add",
            &[("address", address), ("forwards_to", forwards_to)],
        )
        .await
    }

    /// Remove an alias.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] when the box rejects the request and
    /// [`Error::Transport`] on network failure.
    pub async fn remove_mail_alias(&self, address: &str) -> Result<String> {
        self.post_text("/admin/mail/aliases/remove", &[("address", address)])
            .await
    }

    // -- system --

    /// Domains served by the box's web server.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Protocol`] when the body is not a JSON array,
    /// plus the usual HTTP and transport errors.
    pub async fn get_web_domains(&self) -> Result<Vec<WebDomain>> {
        self.get_json_array("/admin/web/domains").await
    }

    /// The Mail-in-a-Box version string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] and [`Error::Transport`] as usual.
    pub async fn get_version(&self) -> Result<String> {
        let body = self
            .transport
            .get(&self.credentials, "/admin/system/version")
            .await?;
        Ok(body.trim().to_string())
    }

    // -- private helpers --

    async fn post_text(&self, path: &str, form: &[(&str, &str)]) -> Result<String> {
        let body = self.transport.post(&self.credentials, path, form).await?;
        Ok(body.trim().to_string())
    }

    /// GET a listing that must be a JSON array.
    async fn get_json_array<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>> {
        let body = self.transport.get(&self.credentials, path).await?;
        parse_json_array(&body)
    }
}

fn parse_json_array<T: DeserializeOwned>(body: &str) -> Result<Vec<T>> {
    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|_| Error::Protocol(body.to_string()))?;
    if !value.is_array() {
        return Err(Error::Protocol(body.to_string()));
    }
    serde_json::from_value(value).map_err(|e| Error::Protocol(format!("{e}: {body}")))
}
