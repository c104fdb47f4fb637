use std::sync::Arc;

use http::Method;
use tracing::debug;

use crate::config::settings::Config;
use crate::errors::SiigoError;
use crate::resources::customers::CustomersResource;
use crate::resources::webhooks::WebhooksResource;
use crate::transport::executor::{ApiResponse, HttpExecutor, ReqwestExecutor};
use crate::transport::transport::{RequestOptions, Transport};

/// Entry point: one token owner and one connection pool per client.
///
/// The pool is released by [`Client::close`] or when the client is dropped,
/// so scoping the client guarantees release on every exit path.
pub struct Client {
    cfg: Config,
    transport: Transport,
}

impl Client {
    pub fn new(cfg: Config) -> Result<Self, SiigoError> {
        let executor = ReqwestExecutor::new(&cfg)?;
        Ok(Self::with_executor(cfg, Arc::new(executor)))
    }

    pub fn with_executor(cfg: Config, executor: Arc<dyn HttpExecutor>) -> Self {
        debug!(base_url = %cfg.base_url, "building client");
        let transport = Transport::new(&cfg, executor);
        Self { cfg, transport }
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    pub fn customers(&self) -> CustomersResource<'_> {
        CustomersResource::new(&self.transport)
    }

    pub fn webhooks(&self) -> WebhooksResource<'_> {
        WebhooksResource::new(&self.transport)
    }

    pub async fn request(
        &self,
        method: Method,
        url: &str,
        options: RequestOptions,
    ) -> Result<ApiResponse, SiigoError> {
        self.transport.request(method, url, options).await
    }

    pub fn close(self) {
        self.transport.close();
    }
}
