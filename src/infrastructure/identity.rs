//! Identity provider client.
//!
//! The service only needs two things from the identity provider: checking
//! a bearer token and fetching a user record by uid. Both sit behind
//! [`IdentityProvider`] so the transport layer holds one long-lived
//! instance instead of building a client per request.
//!
//! [`HttpIdentityProvider`] talks to an Identity Toolkit compatible REST
//! endpoint:
//!
//! - `POST {base}/v1/accounts:lookup?key={api_key}` with `{"idToken": ..}`
//! - `POST {base}/v1/projects/{project_id}/accounts:lookup` with
//!   `{"localId": [..]}`, authorized by a bearer access token

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

/// Default base URL of the identity provider.
pub const DEFAULT_IDENTITY_BASE_URL: &str = "https://identitytoolkit.googleapis.com";

/// Default timeout for identity requests.
pub const DEFAULT_IDENTITY_TIMEOUT: Duration = Duration::from_millis(5000);

// =============================================================================
// Identity Error
// =============================================================================

/// Failures of the identity provider.
///
/// Every variant is surfaced to the client as a 400 with this message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    /// A credential needed for the call is not configured.
    #[error("Identity provider is not configured: {0} is missing")]
    NotConfigured(&'static str),

    /// The request carried no token.
    #[error("ID token must be a non-empty string")]
    MissingToken,

    /// The provider refused the token or request.
    #[error("{0}")]
    Rejected(String),

    /// No user has the given uid.
    #[error("User not found: {0}")]
    UserNotFound(String),

    /// Failed to reach the provider.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// The provider did not answer in time.
    #[error("Timeout after {0}ms")]
    Timeout(u64),

    /// The provider answered with a server error or an unreadable body.
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
}

// =============================================================================
// Identity Types
// =============================================================================

/// The caller identified by a verified token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserIdentity {
    /// Provider-assigned user id.
    pub uid: String,
    /// Email address, if the account has one.
    pub email: Option<String>,
}

/// A user account as returned by `GET /auth/{userUid}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub uid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    pub email_verified: bool,
    pub disabled: bool,
}

impl UserRecord {
    /// Creates a record with only a uid set.
    #[must_use]
    pub fn new(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            email: None,
            display_name: None,
            photo_url: None,
            email_verified: false,
            disabled: false,
        }
    }

    /// Sets the email address.
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Returns the identity view of this record.
    #[must_use]
    pub fn identity(&self) -> UserIdentity {
        UserIdentity {
            uid: self.uid.clone(),
            email: self.email.clone(),
        }
    }
}

// =============================================================================
// Identity Provider Trait
// =============================================================================

/// Access to the external identity provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Verifies a bearer token and returns the caller it belongs to.
    async fn verify_token(&self, token: &str) -> Result<UserIdentity, IdentityError>;

    /// Fetches the account with the given uid.
    async fn lookup_user(&self, uid: &str) -> Result<UserRecord, IdentityError>;

    /// Returns the provider name for logging.
    fn provider_name(&self) -> &'static str;
}

// =============================================================================
// HTTP Identity Provider
// =============================================================================

/// Connection settings for [`HttpIdentityProvider`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityConfig {
    /// Base URL, without a trailing slash.
    pub base_url: String,
    /// Web API key used for token verification.
    pub api_key: Option<String>,
    /// Project id used for user lookup.
    pub project_id: Option<String>,
    /// OAuth access token used for user lookup.
    pub access_token: Option<String>,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_IDENTITY_BASE_URL.to_string(),
            api_key: None,
            project_id: None,
            access_token: None,
            timeout: DEFAULT_IDENTITY_TIMEOUT,
        }
    }
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<AccountInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountInfo {
    local_id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    photo_url: Option<String>,
    #[serde(default)]
    email_verified: bool,
    #[serde(default)]
    disabled: bool,
}

impl From<AccountInfo> for UserRecord {
    fn from(account: AccountInfo) -> Self {
        Self {
            uid: account.local_id,
            email: account.email,
            display_name: account.display_name,
            photo_url: account.photo_url,
            email_verified: account.email_verified,
            disabled: account.disabled,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Identity provider reached over HTTP.
pub struct HttpIdentityProvider {
    client: reqwest::Client,
    config: IdentityConfig,
}

impl HttpIdentityProvider {
    /// Creates a provider from `config`.
    #[must_use]
    pub fn new(mut config: IdentityConfig) -> Self {
        config.base_url = config.base_url.trim_end_matches('/').to_string();
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Returns the settings in use.
    #[must_use]
    pub const fn config(&self) -> &IdentityConfig {
        &self.config
    }

    async fn lookup(
        &self,
        request: reqwest::RequestBuilder,
        body: serde_json::Value,
    ) -> Result<Vec<AccountInfo>, IdentityError> {
        #[allow(clippy::cast_possible_truncation)] // Timeout in ms will not exceed u64
        let timeout_ms = self.config.timeout.as_millis() as u64;

        let response = request
            .timeout(self.config.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|error| {
                if error.is_timeout() {
                    IdentityError::Timeout(timeout_ms)
                } else if error.is_connect() {
                    IdentityError::ConnectionFailed(error.to_string())
                } else {
                    IdentityError::ServiceUnavailable(error.to_string())
                }
            })?;

        let status = response.status();
        if status.is_success() {
            let body: LookupResponse = response
                .json()
                .await
                .map_err(|error| IdentityError::ServiceUnavailable(error.to_string()))?;
            Ok(body.users)
        } else if status.is_client_error() {
            let message = response
                .json::<ErrorEnvelope>()
                .await
                .map_or_else(|_| format!("HTTP {status}"), |envelope| envelope.error.message);
            Err(IdentityError::Rejected(message))
        } else {
            Err(IdentityError::ServiceUnavailable(format!("HTTP {status}")))
        }
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    async fn verify_token(&self, token: &str) -> Result<UserIdentity, IdentityError> {
        if token.is_empty() {
            return Err(IdentityError::MissingToken);
        }
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(IdentityError::NotConfigured("IDENTITY_API_KEY"))?;

        let request = self
            .client
            .post(format!("{}/v1/accounts:lookup", self.config.base_url))
            .query(&[("key", api_key)]);
        let accounts = self.lookup(request, json!({ "idToken": token })).await?;

        accounts
            .into_iter()
            .next()
            .map(|account| UserRecord::from(account).identity())
            .ok_or_else(|| IdentityError::Rejected("USER_NOT_FOUND".to_string()))
    }

    async fn lookup_user(&self, uid: &str) -> Result<UserRecord, IdentityError> {
        let project_id = self
            .config
            .project_id
            .as_deref()
            .ok_or(IdentityError::NotConfigured("IDENTITY_PROJECT_ID"))?;
        let access_token = self
            .config
            .access_token
            .as_deref()
            .ok_or(IdentityError::NotConfigured("IDENTITY_ACCESS_TOKEN"))?;

        let request = self
            .client
            .post(format!(
                "{}/v1/projects/{project_id}/accounts:lookup",
                self.config.base_url
            ))
            .bearer_auth(access_token);
        let accounts = self.lookup(request, json!({ "localId": [uid] })).await?;

        accounts
            .into_iter()
            .find(|account| account.local_id == uid)
            .map(UserRecord::from)
            .ok_or_else(|| IdentityError::UserNotFound(uid.to_string()))
    }

    fn provider_name(&self) -> &'static str {
        "http"
    }
}

// =============================================================================
// Stub Identity Provider (for testing)
// =============================================================================

/// Identity provider that answers from memory.
///
/// Knows at most one user and the single token that identifies them.
pub struct StubIdentityProvider {
    account: Option<(String, UserRecord)>,
    failure: Option<IdentityError>,
}

impl StubIdentityProvider {
    /// Creates a stub that accepts `token` as belonging to `user`.
    #[must_use]
    pub fn with_user(token: impl Into<String>, user: UserRecord) -> Self {
        Self {
            account: Some((token.into(), user)),
            failure: None,
        }
    }

    /// Creates a stub that fails every call with `error`.
    #[must_use]
    pub const fn with_error(error: IdentityError) -> Self {
        Self {
            account: None,
            failure: Some(error),
        }
    }
}

#[async_trait]
impl IdentityProvider for StubIdentityProvider {
    async fn verify_token(&self, token: &str) -> Result<UserIdentity, IdentityError> {
        if let Some(error) = &self.failure {
            return Err(error.clone());
        }
        if token.is_empty() {
            return Err(IdentityError::MissingToken);
        }
        match &self.account {
            Some((known, user)) if known == token => Ok(user.identity()),
            _ => Err(IdentityError::Rejected("INVALID_ID_TOKEN".to_string())),
        }
    }

    async fn lookup_user(&self, uid: &str) -> Result<UserRecord, IdentityError> {
        if let Some(error) = &self.failure {
            return Err(error.clone());
        }
        match &self.account {
            Some((_, user)) if user.uid == uid => Ok(user.clone()),
            _ => Err(IdentityError::UserNotFound(uid.to_string())),
        }
    }

    fn provider_name(&self) -> &'static str {
        "stub"
    }
}

// =============================================================================
// Tests
// =============================================================================
