//! Single HTTP exchange behind a trait, so the transport can be driven by a
//! scripted executor in tests.

use async_trait::async_trait;
use http::{HeaderMap, Method};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::settings::Config;
use crate::errors::{SendFailure, SiigoError};

/// A fully built request: absolute url, final headers, query and json body.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub query: Vec<(String, String)>,
    pub json: Option<Value>,
}

/// Completed HTTP response, whatever its status.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: String,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    pub fn status_code(&self) -> u16 {
        self.status
    }

    pub fn text(&self) -> &str {
        &self.body
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Deserializes the body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, SiigoError> {
        serde_json::from_str(&self.body).map_err(SiigoError::from)
    }

    pub fn json_value(&self) -> Result<Value, SiigoError> {
        self.json()
    }
}

#[async_trait]
pub trait HttpExecutor: Send + Sync {
    /// Sends one request. Any completed response is `Ok`, status included.
    async fn execute(&self, request: HttpRequest) -> Result<ApiResponse, SendFailure>;
}

/// Production executor using reqwest. Dropping it releases the connection pool.
#[derive(Debug, Clone)]
pub struct ReqwestExecutor {
    inner: Client,
}

impl ReqwestExecutor {
    pub fn new(cfg: &Config) -> Result<Self, SiigoError> {
        let inner = Client::builder()
            // connect_timeout must be the only timer running while connecting
            .connect_timeout(cfg.timeout())
            .read_timeout(cfg.timeout())
            .user_agent(cfg.user_agent.as_str())
            .build()
            .map_err(|err| SiigoError::Configuration(format!("failed to build HTTP client: {err}")))?;
        Ok(Self { inner })
    }
}

#[async_trait]
impl HttpExecutor for ReqwestExecutor {
    async fn execute(&self, request: HttpRequest) -> Result<ApiResponse, SendFailure> {
        let mut builder = self
            .inner
            .request(request.method, &request.url)
            .headers(request.headers);

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.json {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.text().await?;

        Ok(ApiResponse {
            status,
            headers,
            body,
        })
    }
}
