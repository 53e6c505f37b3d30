//! Client configuration

use crate::error::{Error, Result};
use std::env;
use std::time::Duration;
use url::Url;

/// Port of the implicit-TLS IMAP listener on a Mail-in-a-Box host.
pub const DEFAULT_IMAP_PORT: u16 = 993;

/// Timeout applied to every admin API request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// Connection settings for a Mail-in-a-Box box
#[derive(Debug, Clone)]
pub struct MiabConfig {
    /// Base URL of the box, e.g. `https://box.example.com`.
    pub api_url: String,
    pub admin_email: String,
    pub admin_password: String,
    /// IMAP host. Defaults to the host of `api_url`.
    pub imap_host: Option<String>,
    pub imap_port: u16,
    pub request_timeout: Duration,
    /// Skip certificate verification for both HTTPS and IMAPS.
    pub accept_invalid_certs: bool,
}

impl MiabConfig {
    /// Settings for the given box and admin account, everything else
    /// at its default.
    #[must_use]
    pub fn new(
        api_url: impl Into<String>,
        admin_email: impl Into<String>,
        admin_password: impl Into<String>,
    ) -> Self {
        Self {
            api_url: api_url.into(),
            admin_email: admin_email.into(),
            admin_password: admin_password.into(),
            imap_host: None,
            imap_port: DEFAULT_IMAP_PORT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            accept_invalid_certs: false,
        }
    }

    /// Load configuration from environment variables
    ///
    /// Reads from `.env` file if present. Required variables:
    /// - `MIAB_URL`
    /// - `MIAB_EMAIL`
    /// - `MIAB_PASSWORD`
    ///
    /// Optional (with defaults):
    /// - `MIAB_IMAP_HOST` (default: host of `MIAB_URL`)
    /// - `MIAB_IMAP_PORT` (default: `993`)
    /// - `MIAB_TIMEOUT_SECS` (default: `300`)
    /// - `MIAB_ACCEPT_INVALID_CERTS` (default: `false`)
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if a required variable is missing or
    /// an optional one cannot be parsed.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let mut config = Self::new(
            env::var("MIAB_URL").map_err(|_| Error::Config("MIAB_URL not set".into()))?,
            env::var("MIAB_EMAIL").map_err(|_| Error::Config("MIAB_EMAIL not set".into()))?,
            env::var("MIAB_PASSWORD")
                .map_err(|_| Error::Config("MIAB_PASSWORD not set".into()))?,
        );

        config.imap_host = env::var("MIAB_IMAP_HOST").ok();
        if let Ok(port) = env::var("MIAB_IMAP_PORT") {
            config.imap_port = port
                .parse()
                .map_err(|e| Error::Config(format!("Invalid MIAB_IMAP_PORT: {e}")))?;
        }
        if let Ok(secs) = env::var("MIAB_TIMEOUT_SECS") {
            let secs: u64 = secs
                .parse()
                .map_err(|e| Error::Config(format!("Invalid MIAB_TIMEOUT_SECS: {e}")))?;
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Ok(flag) = env::var("MIAB_ACCEPT_INVALID_CERTS") {
            config.accept_invalid_certs = parse_flag(&flag)?;
        }

        Ok(config)
    }

    /// Check that the required fields are present and the URL is usable.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] on an empty field or an `api_url`
    /// without a host.
    pub fn validate(&self) -> Result<()> {
        if self.api_url.is_empty() || self.admin_email.is_empty() || self.admin_password.is_empty()
        {
            return Err(Error::Config(
                "The api url, admin email and admin password must be provided".into(),
            ));
        }
        self.resolved_imap_host().map(|_| ())
    }

    /// The IMAP host: the explicit override, or the host of `api_url`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `api_url` is not a URL with a host.
    pub fn resolved_imap_host(&self) -> Result<String> {
        if let Some(host) = &self.imap_host {
            return Ok(host.clone());
        }
        let url = Url::parse(&self.api_url)
            .map_err(|e| Error::Config(format!("Invalid api url '{}': {e}", self.api_url)))?;
        url.host_str()
            .map(ToString::to_string)
            .ok_or_else(|| Error::Config(format!("Api url '{}' has no host", self.api_url)))
    }
}

fn parse_flag(value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" | "" => Ok(false),
        other => Err(Error::Config(format!(
            "Invalid MIAB_ACCEPT_INVALID_CERTS: {other}"
        ))),
    }
}
