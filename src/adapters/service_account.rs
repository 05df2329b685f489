//! Google service-account authentication.
//!
//! A signed RS256 assertion is exchanged at the token endpoint for a bearer
//! token, which is cached until shortly before it expires.

use async_trait::async_trait;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tokio::sync::Mutex;

use crate::domain::{CalendarError, CalendarResult};

pub const CALENDAR_SCOPE: &str = "https://www.googleapis.com/auth/calendar";
pub const DEFAULT_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: u64 = 3600;
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// Source of bearer tokens for the calendar API.
#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
    async fn access_token(&self) -> CalendarResult<SecretString>;
}

/// Fixed token, for tests and pre-authorized deployments.
pub struct StaticToken(SecretString);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(SecretString::from(token.into()))
    }
}

#[async_trait]
impl AccessTokenProvider for StaticToken {
    async fn access_token(&self) -> CalendarResult<SecretString> {
        Ok(SecretString::from(self.0.expose_secret().to_string()))
    }
}

#[derive(Deserialize)]
struct RawKey {
    client_email: String,
    private_key: String,
    #[serde(default)]
    private_key_id: Option<String>,
    #[serde(default)]
    token_uri: Option<String>,
}

/// The fields of a service-account key file this service needs.
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: SecretString,
    pub private_key_id: Option<String>,
    pub token_uri: Option<String>,
}

impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key_id", &self.private_key_id)
            .finish_non_exhaustive()
    }
}

impl ServiceAccountKey {
    pub fn from_json(json: &str) -> CalendarResult<Self> {
        let raw: RawKey = serde_json::from_str(json)
            .map_err(|e| CalendarError::Credentials(format!("malformed key file: {}", e)))?;

        if raw.client_email.trim().is_empty() {
            return Err(CalendarError::Credentials("client_email is empty".to_string()));
        }

        Ok(Self {
            client_email: raw.client_email,
            private_key: SecretString::from(raw.private_key),
            private_key_id: raw.private_key_id,
            token_uri: raw.token_uri,
        })
    }

    pub fn from_file(path: impl AsRef<Path>) -> CalendarResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            CalendarError::Credentials(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json(&json)
    }
}

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: u64,
    exp: u64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    ASSERTION_LIFETIME_SECS
}

pub struct ServiceAccountTokenProvider {
    client: reqwest::Client,
    client_email: String,
    key_id: Option<String>,
    signing_key: EncodingKey,
    token_url: String,
    cache: Mutex<Option<(SecretString, Instant)>>,
}

impl ServiceAccountTokenProvider {
    /// `token_url` overrides the key file's `token_uri`, which in turn
    /// overrides Google's public endpoint.
    pub fn new(
        key: ServiceAccountKey,
        token_url: Option<String>,
        client: reqwest::Client,
    ) -> CalendarResult<Self> {
        let signing_key = EncodingKey::from_rsa_pem(key.private_key.expose_secret().as_bytes())
            .map_err(|e| CalendarError::Credentials(format!("private key is not valid RSA PEM: {}", e)))?;

        let token_url = token_url
            .or(key.token_uri)
            .unwrap_or_else(|| DEFAULT_TOKEN_URL.to_string());

        Ok(Self {
            client,
            client_email: key.client_email,
            key_id: key.private_key_id,
            signing_key,
            token_url,
            cache: Mutex::new(None),
        })
    }

    fn sign_assertion(&self) -> CalendarResult<String> {
        let iat = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| CalendarError::Credentials(e.to_string()))?
            .as_secs();

        let claims = AssertionClaims {
            iss: &self.client_email,
            scope: CALENDAR_SCOPE,
            aud: &self.token_url,
            iat,
            exp: iat + ASSERTION_LIFETIME_SECS,
        };

        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.key_id.clone();

        encode(&header, &claims, &self.signing_key)
            .map_err(|e| CalendarError::Credentials(format!("failed to sign assertion: {}", e)))
    }

    async fn fetch_token(&self) -> CalendarResult<(SecretString, Duration)> {
        let assertion = self.sign_assertion()?;

        let response = self
            .client
            .post(&self.token_url)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(match status.as_u16() {
                400 | 401 | 403 => CalendarError::Authentication(format!("token exchange rejected: {}", body)),
                429 => CalendarError::RateLimited,
                code => CalendarError::Api {
                    status: code,
                    message: body,
                },
            });
        }

        let token: TokenResponse = response.json().await?;
        tracing::debug!(expires_in = token.expires_in, "Obtained calendar access token");

        Ok((
            SecretString::from(token.access_token),
            Duration::from_secs(token.expires_in),
        ))
    }
}

#[async_trait]
impl AccessTokenProvider for ServiceAccountTokenProvider {
    async fn access_token(&self) -> CalendarResult<SecretString> {
        let mut cache = self.cache.lock().await;

        if let Some((token, valid_until)) = cache.as_ref() {
            if Instant::now() < *valid_until {
                return Ok(SecretString::from(token.expose_secret().to_string()));
            }
        }

        let (token, lifetime) = self.fetch_token().await?;
        let valid_until = Instant::now() + lifetime.saturating_sub(EXPIRY_MARGIN);
        let handed_out = SecretString::from(token.expose_secret().to_string());
        *cache = Some((token, valid_until));

        Ok(handed_out)
    }
}
