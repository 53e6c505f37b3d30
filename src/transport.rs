//! Authenticated HTTP transport for the admin API
//!
//! Every request carries basic auth from the current [`Credentials`]
//! and a form-urlencoded content type. Non-2xx answers become
//! [`Error::Http`]. There are no retries at this layer.

use crate::credentials::Credentials;
use crate::error::{Error, Result};
use reqwest::Method;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use std::time::Duration;
use tracing::debug;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

pub struct Transport {
    http: reqwest::Client,
    base_url: String,
}

impl Transport {
    pub fn new(base_url: &str, timeout: Duration, accept_invalid_certs: bool) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .danger_accept_invalid_certs(accept_invalid_certs)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub async fn get(&self, credentials: &Credentials, path: &str) -> Result<String> {
        self.request(credentials, Method::GET, path, None).await
    }

    pub async fn post(
        &self,
        credentials: &Credentials,
        path: &str,
        form: &[(&str, &str)],
    ) -> Result<String> {
        self.request(credentials, Method::POST, path, Some(form))
            .await
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn request(
        &self,
        credentials: &Credentials,
        method: Method,
        path: &str,
        form: Option<&[(&str, &str)]>,
    ) -> Result<String> {
        debug!("{} {}", method, path);

        let mut request = self
            .http
            .request(method, self.endpoint(path))
            .header(AUTHORIZATION, credentials.authorization())
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE);
        if let Some(form) = form {
            request = request.form(form);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            debug!("{} answered {}", path, status);
            return Err(Error::Http {
                status: status.as_u16(),
                body,
            });
        }

        Ok(body)
    }
}
