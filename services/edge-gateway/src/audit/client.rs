use reqwest::Client;
use rust_common::{HttpConfig, PlatformError, build_http_client};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::Config;
use crate::middleware::auth::API_KEY_HEADER;

#[derive(Serialize)]
struct LoginNotice<'a> {
    token: &'a str,
    username: &'a str,
}

#[derive(Serialize)]
struct LogoutNotice<'a> {
    token: &'a str,
}

/// HTTP client for the session audit service.
#[derive(Clone)]
pub struct SessionAuditClient {
    http: Client,
    base: String,
    api_key: SecretString,
}

impl SessionAuditClient {
    /// Creates a client posting to `base` (the `.../auth-sessions` URL).
    #[must_use]
    pub fn new(http: Client, base: impl Into<String>, api_key: SecretString) -> Self {
        Self {
            http,
            base: base.into(),
            api_key,
        }
    }

    /// Builds the client from gateway configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn from_config(config: &Config) -> Result<Self, PlatformError> {
        let http = build_http_client(
            &HttpConfig::default()
                .with_timeout(config.audit_timeout)
                .with_user_agent(concat!("edge-gateway/", env!("CARGO_PKG_VERSION"))),
        )?;
        Ok(Self::new(
            http,
            config.session_audit_base(),
            config.session_service_api_key.clone(),
        ))
    }

    /// Records a login. Never fails; problems are logged.
    pub async fn notify_login(&self, token: &str, username: &str) {
        let body = LoginNotice { token, username };
        let request = self.http.post(&self.base).json(&body);
        match self.send(request).await {
            Ok(()) => debug!(username = %username, "Login audited"),
            Err(err) => warn!(username = %username, error = %err, "Login audit failed"),
        }
    }

    /// Records a logout. Never fails; problems are logged.
    pub async fn notify_logout(&self, token: &str) {
        let url = format!("{}/end", self.base);
        let request = self.http.put(url).json(&LogoutNotice { token });
        match self.send(request).await {
            Ok(()) => debug!("Logout audited"),
            Err(err) => warn!(error = %err, "Logout audit failed"),
        }
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<(), PlatformError> {
        let response = request
            .header(API_KEY_HEADER, self.api_key.expose_secret())
            .send()
            .await
            .map_err(|e| PlatformError::unavailable(e.without_url().to_string()))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(PlatformError::unavailable(format!("session service answered {status}")))
        }
    }
}

impl std::fmt::Debug for SessionAuditClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionAuditClient")
            .field("base", &self.base)
            .finish_non_exhaustive()
    }
}
