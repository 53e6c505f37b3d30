//! Admin credentials and the derived basic-auth token

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use std::fmt;

/// Admin email/password pair used for every admin API request.
///
/// The basic-auth token is recomputed whenever either half changes, so
/// it always matches the current pair.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    email: String,
    password: String,
    token: String,
}

impl Credentials {
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        let email = email.into();
        let password = password.into();
        let token = encode_token(&email, &password);
        Self {
            email,
            password,
            token,
        }
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }

    /// Base64 of `email:password`.
    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Value of the `Authorization` header.
    #[must_use]
    pub fn authorization(&self) -> String {
        format!("Basic {}", self.token)
    }

    pub fn set_email(&mut self, email: impl Into<String>) {
        self.email = email.into();
        self.token = encode_token(&self.email, &self.password);
    }

    pub fn set_password(&mut self, password: impl Into<String>) {
        self.password = password.into();
        self.token = encode_token(&self.email, &self.password);
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish_non_exhaustive()
    }
}

fn encode_token(email: &str, password: &str) -> String {
    BASE64.encode(format!("{email}:{password}"))
}
