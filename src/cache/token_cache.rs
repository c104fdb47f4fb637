use std::fmt;
use std::sync::Arc;

use http::{HeaderMap, HeaderValue, Method};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::cache::token::CachedToken;
use crate::config::settings::Config;
use crate::errors::SiigoError;
use crate::helpers::time::{expires_at, now};
use crate::transport::executor::{HttpExecutor, HttpRequest};
use crate::utils::constants::{AUTH_PATH, HEADER_PARTNER_ID};

const MISSING_CREDENTIALS: &str = "username, access_key and partner_id are required";
const MISSING_ACCESS_TOKEN: &str = "No access_token in response";
const INVALID_EXPIRES_IN: &str = "Invalid expires_in in response";

/// Client credentials used for the token exchange.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub username: Option<String>,
    pub access_key: Option<String>,
    pub partner_id: Option<String>,
}

impl Credentials {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            username: cfg.username.clone(),
            access_key: cfg.access_key.clone(),
            partner_id: cfg.partner_id.clone(),
        }
    }

    /// All three values, or a configuration error. Empty strings count as missing.
    fn require(&self) -> Result<(&str, &str, &str), SiigoError> {
        fn present(v: &Option<String>) -> Option<&str> {
            v.as_deref().filter(|s| !s.is_empty())
        }

        match (
            present(&self.username),
            present(&self.access_key),
            present(&self.partner_id),
        ) {
            (Some(username), Some(access_key), Some(partner_id)) => {
                Ok((username, access_key, partner_id))
            }
            _ => Err(SiigoError::Configuration(MISSING_CREDENTIALS.to_owned())),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("access_key", &self.access_key.as_ref().map(|_| "***"))
            .field("partner_id", &self.partner_id)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    // anything but a non-empty string counts as missing
    access_token: Option<Value>,
    expires_in: Option<f64>,
}

/// Owner of the bearer token for one client.
///
/// The slot lock is held across the whole fetch path, so concurrent callers
/// that find the token expired wait for a single exchange instead of racing.
pub struct TokenCache {
    credentials: Credentials,
    token_url: String,
    executor: Arc<dyn HttpExecutor>,
    slot: Mutex<Option<CachedToken>>,
}

impl TokenCache {
    pub fn new(cfg: &Config, executor: Arc<dyn HttpExecutor>) -> Self {
        Self {
            credentials: Credentials::from_config(cfg),
            token_url: format!("{}{}", cfg.api_base(), AUTH_PATH),
            executor,
            slot: Mutex::new(None),
        }
    }

    /// Current token, fetched only when absent or expired.
    pub async fn get_token(&self) -> Result<String, SiigoError> {
        self.credentials.require()?;

        let mut slot = self.slot.lock().await;
        if let Some(token) = slot.as_ref().filter(|t| t.is_valid_at(now())) {
            return Ok(token.value.clone());
        }

        let fresh = self.exchange().await?;
        let value = fresh.value.clone();
        *slot = Some(fresh);
        Ok(value)
    }

    /// Replaces the cached token with a freshly exchanged one.
    ///
    /// `stale` is the token the caller saw rejected. When the slot already holds
    /// a different token another caller refreshed in the meantime, and that one
    /// is returned without a second exchange.
    pub async fn force_refresh(&self, stale: Option<&str>) -> Result<String, SiigoError> {
        self.credentials.require()?;

        let mut slot = self.slot.lock().await;
        if let (Some(stale), Some(current)) = (stale, slot.as_ref()) {
            if current.value != stale && current.is_valid_at(now()) {
                debug!("token already refreshed by a concurrent caller");
                return Ok(current.value.clone());
            }
        }

        let fresh = self.exchange().await?;
        let value = fresh.value.clone();
        *slot = Some(fresh);
        Ok(value)
    }

    /// Drops the cached token; the next `get_token` exchanges credentials again.
    pub async fn invalidate(&self) {
        self.slot.lock().await.take();
    }

    pub async fn cached(&self) -> Option<CachedToken> {
        self.slot.lock().await.clone()
    }

    async fn exchange(&self) -> Result<CachedToken, SiigoError> {
        let (username, access_key, partner_id) = self.credentials.require()?;

        let mut headers = HeaderMap::new();
        let partner = HeaderValue::from_str(partner_id)
            .map_err(|_| SiigoError::Configuration("partner_id is not a valid header value".into()))?;
        headers.insert(HEADER_PARTNER_ID, partner);

        let request = HttpRequest {
            method: Method::POST,
            url: self.token_url.clone(),
            headers,
            query: Vec::new(),
            json: Some(json!({ "username": username, "access_key": access_key })),
        };

        debug!("exchanging credentials at {}", self.token_url);
        let issued_at = now();
        let response = self.executor.execute(request).await?;
        if !response.is_success() {
            return Err(SiigoError::response(response.status, response.body));
        }

        let payload: TokenResponse = response.json()?;
        let value = match payload.access_token {
            Some(Value::String(token)) if !token.is_empty() => token,
            _ => return Err(SiigoError::response(500, MISSING_ACCESS_TOKEN)),
        };
        let expires = match payload.expires_in {
            Some(secs) if !secs.is_finite() || secs < 0.0 => {
                return Err(SiigoError::response(500, INVALID_EXPIRES_IN));
            }
            Some(secs) => expires_at(issued_at, secs),
            None => None,
        };

        info!(expires_at = ?expires, "fetched new access token");
        Ok(CachedToken::new(value, expires))
    }
}
