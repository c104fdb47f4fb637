use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use http::Method;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::errors::SiigoError;
use crate::transport::{RequestOptions, Transport};
use crate::utils::constants::WEBHOOKS_PATH;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Webhook {
    pub id: String,
    pub application_id: String,
    pub url: String,
    pub topic: String,
    pub company_key: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

/// Event a webhook subscribes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WebhookTopic {
    ProductsCreate,
    ProductsUpdate,
    StockUpdate,
}

impl WebhookTopic {
    pub const ALL: [WebhookTopic; 3] = [
        WebhookTopic::ProductsCreate,
        WebhookTopic::ProductsUpdate,
        WebhookTopic::StockUpdate,
    ];

    /// Short type name, e.g. `PRODUCTS_CREATE`.
    pub fn type_name(self) -> &'static str {
        match self {
            WebhookTopic::ProductsCreate => "PRODUCTS_CREATE",
            WebhookTopic::ProductsUpdate => "PRODUCTS_UPDATE",
            WebhookTopic::StockUpdate => "STOCK_UPDATE",
        }
    }

    /// Topic string on the wire.
    pub fn topic(self) -> &'static str {
        match self {
            WebhookTopic::ProductsCreate => "public.siigoapi.products.create",
            WebhookTopic::ProductsUpdate => "public.siigoapi.products.update",
            WebhookTopic::StockUpdate => "public.siigoapi.products.stock.update",
        }
    }
}

impl fmt::Display for WebhookTopic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

impl FromStr for WebhookTopic {
    type Err = SiigoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WebhookTopic::ALL
            .into_iter()
            .find(|t| t.type_name() == s)
            .ok_or_else(|| SiigoError::InvalidArgument(format!("Invalid webhook type: {s}")))
    }
}

fn validate_url(url: &str) -> Result<(), SiigoError> {
    if url.starts_with("http") {
        Ok(())
    } else {
        Err(SiigoError::InvalidArgument(
            "Invalid URL. It must start with 'http://' or 'https://'".to_owned(),
        ))
    }
}

/// `/v1/webhooks`
pub struct WebhooksResource<'a> {
    transport: &'a Transport,
    base: String,
}

impl<'a> WebhooksResource<'a> {
    pub fn new(transport: &'a Transport) -> Self {
        Self {
            base: format!("{}{}", transport.base_url(), WEBHOOKS_PATH),
            transport,
        }
    }

    pub fn url(&self) -> &str {
        &self.base
    }

    pub async fn list(&self) -> Result<Vec<Webhook>, SiigoError> {
        let response = self
            .transport
            .request(Method::GET, &self.base, RequestOptions::new())
            .await?;
        response.json()
    }

    /// The webhook subscribed to `topic`, if any. Only the matching entry is decoded.
    pub async fn get_by_topic(&self, topic: WebhookTopic) -> Result<Option<Webhook>, SiigoError> {
        let response = self
            .transport
            .request(Method::GET, &self.base, RequestOptions::new())
            .await?;
        let entries: Vec<Value> = response.json()?;

        entries
            .into_iter()
            .find(|entry| entry.get("topic").and_then(Value::as_str) == Some(topic.topic()))
            .map(|entry| serde_json::from_value(entry).map_err(SiigoError::from))
            .transpose()
    }

    pub async fn select(&self, topic: WebhookTopic) -> Result<Webhook, SiigoError> {
        self.get_by_topic(topic)
            .await?
            .ok_or_else(|| SiigoError::NotFound(format!("Webhook with type {topic} not found")))
    }

    pub async fn create(&self, topic: WebhookTopic, url: &str) -> Result<Webhook, SiigoError> {
        validate_url(url)?;

        let payload = json!({
            "topic": topic.topic(),
            "url": url,
            "active": true,
        });
        let options = RequestOptions::new().json(&payload)?;
        let response = self.transport.request(Method::POST, &self.base, options).await?;
        let webhook: Webhook = response.json()?;
        info!(id = %webhook.id, %topic, "webhook created");
        Ok(webhook)
    }

    /// Only a 200 counts as deleted.
    pub async fn delete(&self, webhook_id: &str) -> Result<(), SiigoError> {
        let url = format!("{}/{}", self.base, webhook_id);
        let response = self
            .transport
            .request(Method::DELETE, &url, RequestOptions::new())
            .await?;

        if response.status != 200 {
            return Err(SiigoError::response(
                response.status,
                format!(
                    "Failed to delete webhook with ID {webhook_id}. Status code: {}",
                    response.status
                ),
            ));
        }
        Ok(())
    }

    /// Makes sure exactly one webhook for `topic` points at `url`.
    ///
    /// An existing subscription with the same url is returned untouched; one with
    /// another url is deleted and recreated.
    pub async fn upsert(&self, topic: WebhookTopic, url: &str) -> Result<Webhook, SiigoError> {
        validate_url(url)?;

        match self.get_by_topic(topic).await? {
            Some(existing) if existing.url == url => {
                debug!(id = %existing.id, %topic, "webhook already up to date");
                Ok(existing)
            }
            Some(existing) => {
                self.delete(&existing.id).await?;
                self.create(topic, url).await
            }
            None => self.create(topic, url).await,
        }
    }
}
