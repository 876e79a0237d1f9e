//! Firebase Authentication client over the Identity Toolkit REST API.
//!
//! Endpoints are `{base_url}/accounts:<method>?key=<api key>`. Firebase has
//! no server-side sign-out for client tokens, so `sign_out` only logs.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::shared::{resolve_api_key, resolve_base_url};
use super::{IdentityError, IdentityProvider};
use crate::config::IdentityConfig;
use crate::user::{Session, User, UserMetadata, mask_token};

/// Default base URL for the Identity Toolkit API.
pub const DEFAULT_BASE_URL: &str = "https://identitytoolkit.googleapis.com/v1";

pub const API_KEY_ENV: &str = "FITSESSION_API_KEY";
pub const BASE_URL_ENV: &str = "FITSESSION_IDENTITY_BASE_URL";

/// Fallback token lifetime when the provider omits or garbles `expiresIn`.
const DEFAULT_EXPIRES_IN_SECS: u64 = 3600;

/// Runtime configuration for the Firebase client.
#[derive(Debug, Clone)]
pub struct FirebaseConfig {
    /// Web API key of the Firebase project
    pub api_key: String,
    pub base_url: String,
    /// Per-request timeout; `None` waits indefinitely
    pub timeout: Option<Duration>,
}

impl FirebaseConfig {
    /// Builds the config from the `[identity]` section and environment.
    ///
    /// API key resolution order:
    /// 1. `api_key` in config
    /// 2. `FITSESSION_API_KEY`
    ///
    /// Base URL resolution order:
    /// 1. `FITSESSION_IDENTITY_BASE_URL` (if set and non-empty)
    /// 2. `base_url` in config
    /// 3. Default: `https://identitytoolkit.googleapis.com/v1`
    ///
    /// # Errors
    /// Returns an error if no API key is available or the base URL is invalid.
    pub fn from_config(identity: &IdentityConfig) -> Result<Self> {
        let api_key = resolve_api_key(identity.api_key.as_deref(), API_KEY_ENV)?;
        let base_url = resolve_base_url(identity.base_url.as_deref(), BASE_URL_ENV, DEFAULT_BASE_URL)?;
        Ok(Self {
            api_key,
            base_url,
            timeout: identity.request_timeout(),
        })
    }
}

/// Identity Toolkit REST client.
pub struct FirebaseAuthClient {
    config: FirebaseConfig,
    http: reqwest::Client,
}

impl FirebaseAuthClient {
    /// Creates a new client with the given configuration.
    ///
    /// # Panics
    /// - In test builds (`#[cfg(test)]`), panics if `base_url` is the production API.
    /// - At runtime, panics if `FITSESSION_BLOCK_REAL_API=1` and `base_url` is the production API.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: FirebaseConfig) -> Result<Self> {
        #[cfg(test)]
        assert!(
            config.base_url != DEFAULT_BASE_URL,
            "Tests must not use the production Identity Toolkit API!\n\
             Point base_url at a mock server (e.g., wiremock)."
        );

        #[cfg(not(test))]
        if std::env::var("FITSESSION_BLOCK_REAL_API").is_ok_and(|v| v == "1")
            && config.base_url == DEFAULT_BASE_URL
        {
            panic!(
                "FITSESSION_BLOCK_REAL_API=1 but trying to use production Identity Toolkit API!\n\
                 Set {BASE_URL_ENV} to a mock server."
            );
        }

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().context("Failed to build HTTP client")?;

        Ok(Self { config, http })
    }

    fn endpoint(&self, method: &str) -> String {
        format!("{}/accounts:{method}", self.config.base_url)
    }

    async fn call<Req, Resp>(&self, method: &str, body: &Req) -> Result<Resp, IdentityError>
    where
        Req: Serialize + Sync,
        Resp: for<'de> Deserialize<'de>,
    {
        let response = self
            .http
            .post(self.endpoint(method))
            .query(&[("key", self.config.api_key.as_str())])
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let err = IdentityError::http_status(status.as_u16(), &body);
            tracing::debug!(method, status = status.as_u16(), kind = %err.kind, "identity call rejected");
            return Err(err);
        }

        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| {
            let mut err = IdentityError::parse(format!("Failed to parse {method} response: {e}"));
            err.details = Some(text);
            err
        })
    }

    async fn lookup_metadata(&self, id_token: &str) -> Result<LookupUser, IdentityError> {
        let resp: LookupResponse = self.call("lookup", &LookupRequest { id_token }).await?;
        resp.users
            .into_iter()
            .next()
            .ok_or_else(|| IdentityError::parse("lookup returned no users"))
    }
}

#[async_trait]
impl IdentityProvider for FirebaseAuthClient {
    async fn authenticate(&self, email: &str, password: &str) -> Result<Session, IdentityError> {
        let resp: TokenResponse = self
            .call(
                "signInWithPassword",
                &PasswordRequest {
                    email,
                    password,
                    return_secure_token: true,
                },
            )
            .await?;

        let mut user = User {
            uid: resp.local_id,
            email: resp.email,
            display_name: resp.display_name.filter(|n| !n.is_empty()),
            email_verified: false,
            refresh_token: resp.refresh_token,
            metadata: UserMetadata::default(),
        };

        // Profile details are nice to have; sign-in already succeeded.
        match self.lookup_metadata(&resp.id_token).await {
            Ok(profile) => {
                user.email_verified = profile.email_verified;
                user.metadata = UserMetadata {
                    created_at: profile.created_at.as_deref().and_then(parse_millis),
                    last_login_at: profile.last_login_at.as_deref().and_then(parse_millis),
                };
            }
            Err(err) => {
                tracing::warn!(uid = %user.uid, error = %err, "account lookup failed, continuing without metadata");
            }
        }

        let expires_in = resp
            .expires_in
            .as_deref()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(DEFAULT_EXPIRES_IN_SECS);

        tracing::info!(
            uid = %user.uid,
            token = %mask_token(&resp.id_token),
            expires_in,
            "signed in with password"
        );
        Ok(Session::password(resp.id_token, expires_in, user))
    }

    async fn register(&self, email: &str, password: &str) -> Result<(), IdentityError> {
        let resp: TokenResponse = self
            .call(
                "signUp",
                &PasswordRequest {
                    email,
                    password,
                    return_secure_token: true,
                },
            )
            .await?;
        tracing::info!(uid = %resp.local_id, "account created");
        Ok(())
    }

    async fn send_password_reset(&self, email: &str) -> Result<(), IdentityError> {
        let _: OobCodeResponse = self
            .call(
                "sendOobCode",
                &OobCodeRequest {
                    request_type: "PASSWORD_RESET",
                    email,
                },
            )
            .await?;
        tracing::info!("password reset email requested");
        Ok(())
    }

    async fn sign_out(&self) -> Result<(), IdentityError> {
        tracing::debug!("firebase sign-out is local only");
        Ok(())
    }
}

fn parse_millis(raw: &str) -> Option<u64> {
    raw.trim().parse().ok()
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LookupRequest<'a> {
    id_token: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OobCodeRequest<'a> {
    request_type: &'a str,
    email: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenResponse {
    local_id: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    display_name: Option<String>,
    id_token: String,
    refresh_token: String,
    /// Seconds, encoded as a string
    #[serde(default)]
    expires_in: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<LookupUser>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LookupUser {
    #[serde(default)]
    email_verified: bool,
    #[serde(default)]
    created_at: Option<String>,
    #[serde(default)]
    last_login_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OobCodeResponse {}
