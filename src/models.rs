//! Typed payloads of the admin API

use serde::{Deserialize, Serialize};

/// A mailbox created or updated through the admin API.
///
/// The client does not keep these around; the caller owns them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mailbox {
    pub email: String,
    pub password: String,
}

/// One domain of `GET /admin/mail/users?format=json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailDomain {
    pub domain: String,
    #[serde(default)]
    pub users: Vec<MailUser>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailUser {
    pub email: String,
    #[serde(default)]
    pub privileges: Vec<String>,
    /// `active` or `inactive`.
    #[serde(default)]
    pub status: String,
    /// Path of the mailbox on the server (only for inactive users).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mailbox: Option<String>,
}

impl MailUser {
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.privileges.iter().any(|p| p == "admin")
    }
}

/// Every user address across all domains, in listing order.
#[must_use]
pub fn mailbox_addresses(domains: &[MailDomain]) -> Vec<String> {
    domains
        .iter()
        .flat_map(|d| d.users.iter().map(|u| u.email.clone()))
        .collect()
}

/// One domain of `GET /admin/mail/aliases?format=json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasDomain {
    pub domain: String,
    #[serde(default)]
    pub aliases: Vec<Alias>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alias {
    pub address: String,
    #[serde(default)]
    pub address_display: String,
    #[serde(default)]
    pub forwards_to: Vec<String>,
    #[serde(default)]
    pub permitted_senders: Option<Vec<String>>,
    /// Aliases the box needs for itself (postmaster, abuse, ...).
    #[serde(default)]
    pub auto: bool,
}

/// One entry of `GET /admin/web/domains`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebDomain {
    pub domain: String,
    #[serde(default)]
    pub root: String,
    #[serde(default)]
    pub custom_root: String,
    #[serde(default)]
    pub ssl_certificate: Vec<String>,
    #[serde(default)]
    pub static_enabled: bool,
}

/// The `domain` field of every web domain, in listing order.
#[must_use]
pub fn domain_names(domains: &[WebDomain]) -> Vec<String> {
    domains.iter().map(|d| d.domain.clone()).collect()
}
