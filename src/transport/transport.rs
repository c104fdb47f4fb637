use std::sync::Arc;

use http::header::{HeaderName, AUTHORIZATION};
use http::{HeaderMap, HeaderValue, Method};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::cache::token_cache::TokenCache;
use crate::config::settings::Config;
use crate::errors::SiigoError;
use crate::resilience::retry::RetrySettings;
use crate::transport::executor::{ApiResponse, HttpExecutor, HttpRequest};
use crate::utils::constants::HEADER_PARTNER_ID;

/// Per-call extras: headers, query parameters and a json body.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub headers: Vec<(String, String)>,
    pub params: Vec<(String, String)>,
    pub json: Option<Value>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Caller headers win over the auth headers on a name collision.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((name.into(), value.into()));
        self
    }

    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, SiigoError> {
        let value = serde_json::to_value(body)
            .map_err(|err| SiigoError::InvalidArgument(format!("body is not serializable: {err}")))?;
        self.json = Some(value);
        Ok(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AuthAttempt {
    First,
    Refreshed,
}

/// Authenticated request pipeline.
///
/// One logical call is at most two auth attempts: the first one, and a single
/// retry after a 401 forced a token refresh. Each auth attempt has its own
/// bounded retry on connect/read failures.
pub struct Transport {
    base_url: String,
    partner_id: Option<String>,
    tokens: TokenCache,
    executor: Arc<dyn HttpExecutor>,
    retry: RetrySettings,
}

impl Transport {
    pub fn new(cfg: &Config, executor: Arc<dyn HttpExecutor>) -> Self {
        Self {
            base_url: cfg.api_base().to_owned(),
            partner_id: cfg.partner_id.clone(),
            tokens: TokenCache::new(cfg, executor.clone()),
            executor,
            retry: RetrySettings::from(&cfg.retry),
        }
    }

    pub fn tokens(&self) -> &TokenCache {
        &self.tokens
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn request(
        &self,
        method: Method,
        url: &str,
        options: RequestOptions,
    ) -> Result<ApiResponse, SiigoError> {
        let url = join_url(&self.base_url, url);
        let mut attempt = AuthAttempt::First;
        let mut token = self.tokens.get_token().await?;

        loop {
            let request = HttpRequest {
                method: method.clone(),
                url: url.clone(),
                headers: self.compose_headers(&token, &options.headers)?,
                query: options.params.clone(),
                json: options.json.clone(),
            };
            let response = self.send(request).await?;

            match (attempt, response.status) {
                (AuthAttempt::First, 401) => {
                    warn!(%method, %url, "request rejected with 401, refreshing token");
                    token = self.tokens.force_refresh(Some(&token)).await?;
                    attempt = AuthAttempt::Refreshed;
                }
                _ => return classify(response),
            }
        }
    }

    /// `Partner-Id` and `Authorization`, then caller headers on top.
    pub fn compose_headers(
        &self,
        token: &str,
        extra: &[(String, String)],
    ) -> Result<HeaderMap, SiigoError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            HEADER_PARTNER_ID,
            header_value(self.partner_id.as_deref().unwrap_or(""))?,
        );
        let mut bearer = header_value(&format!("Bearer {token}"))?;
        bearer.set_sensitive(true);
        headers.insert(AUTHORIZATION, bearer);

        for (name, value) in extra {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| SiigoError::InvalidArgument(format!("invalid header name '{name}'")))?;
            headers.insert(name, header_value(value)?);
        }
        Ok(headers)
    }

    async fn send(&self, request: HttpRequest) -> Result<ApiResponse, SiigoError> {
        let executor = &self.executor;
        self.retry
            .run_with_retry(|attempt| {
                let request = request.clone();
                async move {
                    debug!(attempt, method = %request.method, url = %request.url, "sending request");
                    executor.execute(request).await
                }
            })
            .await
            .map_err(SiigoError::from)
    }

    /// Releases the underlying connection pool.
    pub fn close(self) {
        debug!(base_url = %self.base_url, "closing transport");
    }
}

fn classify(response: ApiResponse) -> Result<ApiResponse, SiigoError> {
    if response.status >= 400 {
        return Err(SiigoError::response(response.status, response.body));
    }
    Ok(response)
}

fn header_value(value: &str) -> Result<HeaderValue, SiigoError> {
    HeaderValue::from_str(value)
        .map_err(|_| SiigoError::InvalidArgument("header value contains invalid characters".into()))
}

/// Absolute `http(s)://` urls pass through, anything else is joined onto `base`.
pub(crate) fn join_url(base: &str, url: &str) -> String {
    if url.starts_with("http://") || url.starts_with("https://") {
        return url.to_owned();
    }
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        url.trim_start_matches('/')
    )
}
