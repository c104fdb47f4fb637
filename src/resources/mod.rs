//! Typed resources on top of [`Transport::request`](crate::transport::Transport::request).

use serde_json::Value;

pub mod customers;
pub mod webhooks;

pub use customers::{Customer, CustomersResource};
pub use webhooks::{Webhook, WebhookTopic, WebhooksResource};

/// Items of a list response.
///
/// Lenient on purpose: a non-empty `results` array, else a non-empty `data`
/// array, else nothing. Bodies that are not objects yield an empty list.
pub(crate) fn list_items(body: Value) -> Vec<Value> {
    let Value::Object(mut map) = body else {
        return Vec::new();
    };
    for key in ["results", "data"] {
        if let Some(Value::Array(items)) = map.remove(key) {
            if !items.is_empty() {
                return items;
            }
        }
    }
    Vec::new()
}
