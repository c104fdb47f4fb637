use std::sync::Arc;

use anyhow::Result;
use httpmock::Method::{DELETE, GET, POST};
use httpmock::MockServer;
use serde_json::json;

use crate::client::Client;
use crate::errors::SiigoError;
use crate::resources::webhooks::WebhookTopic;
use crate::tests::common::{test_config, webhook, ScriptedExecutor, TEST_BASE_URL};

const CREATE_TOPIC: &str = "public.siigoapi.products.create";
const STOCK_TOPIC: &str = "public.siigoapi.products.stock.update";

async fn server_with_auth() -> MockServer {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/auth");
            then.status(200)
                .json_body(json!({"access_token": "tok", "expires_in": 3600}));
        })
        .await;
    server
}

#[test]
fn topics_parse_from_type_names() {
    assert_eq!("PRODUCTS_CREATE".parse::<WebhookTopic>().unwrap(), WebhookTopic::ProductsCreate);
    assert_eq!("STOCK_UPDATE".parse::<WebhookTopic>().unwrap().topic(), STOCK_TOPIC);
    assert_eq!(WebhookTopic::ProductsUpdate.to_string(), "PRODUCTS_UPDATE");

    let err = "ORDERS_CREATE".parse::<WebhookTopic>().unwrap_err();
    assert_eq!(err, SiigoError::InvalidArgument("Invalid webhook type: ORDERS_CREATE".into()));
}

#[tokio::test]
async fn list_and_lookup_by_topic() -> Result<()> {
    let server = server_with_auth().await;
    let listing = server
        .mock_async(|when, then| {
            when.method(GET).path("/v1/webhooks");
            then.status(200).json_body(json!([
                webhook("wh-1", CREATE_TOPIC, "https://hooks.example.com/create"),
                webhook("wh-2", STOCK_TOPIC, "https://hooks.example.com/stock"),
            ]));
        })
        .await;

    let client = Client::new(test_config(&server.base_url()))?;
    let webhooks = client.webhooks();

    let all = webhooks.list().await?;
    assert_eq!(all.len(), 2);
    assert_eq!(all[1].topic, STOCK_TOPIC);

    let stock = webhooks.get_by_topic(WebhookTopic::StockUpdate).await?;
    assert_eq!(stock.map(|w| w.id), Some("wh-2".to_owned()));

    let missing = webhooks.get_by_topic(WebhookTopic::ProductsUpdate).await?;
    assert!(missing.is_none());

    let err = webhooks.select(WebhookTopic::ProductsUpdate).await.unwrap_err();
    assert_eq!(
        err,
        SiigoError::NotFound("Webhook with type PRODUCTS_UPDATE not found".into())
    );

    listing.assert_hits_async(4).await;
    Ok(())
}

#[tokio::test]
async fn lookup_only_decodes_the_matching_entry() -> Result<()> {
    let body = json!([
        {"topic": "public.siigoapi.other", "broken": true},
        webhook("wh-1", CREATE_TOPIC, "https://hooks.example.com/create"),
    ])
    .to_string();
    let executor = Arc::new(
        ScriptedExecutor::new()
            .auth_token("tok", Some(3600))
            .api_response(200, body),
    );
    let client = Client::with_executor(test_config(TEST_BASE_URL), executor);

    let selected = client.webhooks().select(WebhookTopic::ProductsCreate).await?;
    assert_eq!(selected.id, "wh-1");
    assert!(selected.active);
    Ok(())
}

#[tokio::test]
async fn create_posts_topic_url_and_active_flag() -> Result<()> {
    let server = server_with_auth().await;
    let create = server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/webhooks").json_body(json!({
                "topic": CREATE_TOPIC,
                "url": "https://hooks.example.com/create",
                "active": true
            }));
            then.status(200)
                .json_body(webhook("wh-9", CREATE_TOPIC, "https://hooks.example.com/create"));
        })
        .await;

    let client = Client::new(test_config(&server.base_url()))?;
    let created = client
        .webhooks()
        .create(WebhookTopic::ProductsCreate, "https://hooks.example.com/create")
        .await?;

    assert_eq!(created.id, "wh-9");
    create.assert_hits_async(1).await;
    Ok(())
}

#[tokio::test]
async fn invalid_url_is_rejected_before_any_call() -> Result<()> {
    let executor = Arc::new(ScriptedExecutor::new());
    let client = Client::with_executor(test_config(TEST_BASE_URL), executor.clone());

    let err = client
        .webhooks()
        .create(WebhookTopic::StockUpdate, "ftp://hooks.example.com")
        .await
        .unwrap_err();
    assert!(matches!(err, SiigoError::InvalidArgument(msg) if msg.starts_with("Invalid URL")));

    let err = client.webhooks().upsert(WebhookTopic::StockUpdate, "").await.unwrap_err();
    assert!(matches!(err, SiigoError::InvalidArgument(_)));

    assert!(executor.requests().is_empty());
    Ok(())
}

#[tokio::test]
async fn delete_requires_200() -> Result<()> {
    let server = server_with_auth().await;
    let deleted = server
        .mock_async(|when, then| {
            when.method(DELETE).path("/v1/webhooks/wh-1");
            then.status(200);
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(DELETE).path("/v1/webhooks/wh-2");
            then.status(204);
        })
        .await;

    let client = Client::new(test_config(&server.base_url()))?;
    client.webhooks().delete("wh-1").await?;
    deleted.assert_hits_async(1).await;

    let err = client.webhooks().delete("wh-2").await.unwrap_err();
    assert_eq!(err.status(), Some(204));
    assert!(err.to_string().contains("Failed to delete webhook with ID wh-2"));
    Ok(())
}

#[tokio::test]
async fn upsert_keeps_matching_subscription() -> Result<()> {
    let listing = json!([webhook("wh-1", CREATE_TOPIC, "https://hooks.example.com/create")]).to_string();
    let executor = Arc::new(
        ScriptedExecutor::new()
            .auth_token("tok", Some(3600))
            .api_response(200, listing),
    );
    let client = Client::with_executor(test_config(TEST_BASE_URL), executor.clone());

    let kept = client
        .webhooks()
        .upsert(WebhookTopic::ProductsCreate, "https://hooks.example.com/create")
        .await?;
    assert_eq!(kept.id, "wh-1");
    assert_eq!(executor.api_calls(), 1);
    Ok(())
}

#[tokio::test]
async fn upsert_replaces_subscription_with_other_url() -> Result<()> {
    let listing = json!([webhook("wh-1", CREATE_TOPIC, "https://old.example.com")]).to_string();
    let created = webhook("wh-2", CREATE_TOPIC, "https://new.example.com").to_string();
    let executor = Arc::new(
        ScriptedExecutor::new()
            .auth_token("tok", Some(3600))
            .api_response(200, listing)
            .api_response(200, "")
            .api_response(200, created),
    );
    let client = Client::with_executor(test_config(TEST_BASE_URL), executor.clone());

    let replaced = client
        .webhooks()
        .upsert(WebhookTopic::ProductsCreate, "https://new.example.com")
        .await?;
    assert_eq!(replaced.id, "wh-2");

    let sent = executor.api_requests();
    assert_eq!(sent.len(), 3);
    assert_eq!(sent[1].method, http::Method::DELETE);
    assert_eq!(sent[1].url, "https://api.test.siigo.com/v1/webhooks/wh-1");
    assert_eq!(sent[2].method, http::Method::POST);
    Ok(())
}

#[tokio::test]
async fn upsert_creates_when_missing() -> Result<()> {
    let created = webhook("wh-3", STOCK_TOPIC, "https://hooks.example.com/stock").to_string();
    let executor = Arc::new(
        ScriptedExecutor::new()
            .auth_token("tok", Some(3600))
            .api_response(200, "[]")
            .api_response(201, created),
    );
    let client = Client::with_executor(test_config(TEST_BASE_URL), executor.clone());

    let subscribed = client
        .webhooks()
        .upsert(WebhookTopic::StockUpdate, "https://hooks.example.com/stock")
        .await?;
    assert_eq!(subscribed.id, "wh-3");
    assert_eq!(executor.api_calls(), 2);
    Ok(())
}
