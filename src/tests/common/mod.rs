// Shared fixtures for the crate test suites.
pub use axum::Router;
pub use serde_json::json;
pub use tokio::task::JoinHandle;

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::config::settings::{Config, LogFormat, LoggingConfig, RetryConfig};
use crate::errors::SendFailure;
use crate::transport::executor::{ApiResponse, HttpExecutor, HttpRequest};
use crate::utils::logging::init_logging;

pub const TEST_BASE_URL: &str = "https://api.test.siigo.com";

/// Spawn an Axum router on an ephemeral port and return (JoinHandle, SocketAddr)
pub async fn spawn_axum(router: Router) -> (JoinHandle<()>, SocketAddr) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind failed");
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, router).await.expect("server failed");
    });
    (handle, addr)
}

pub fn init_test_logging() {
    let _ = init_logging(&LoggingConfig::new("debug".to_owned(), LogFormat::Compact));
}

/// Millisecond backoff so retry paths stay fast.
pub fn fast_retry() -> RetryConfig {
    RetryConfig {
        attempts: 3,
        base_delay_ms: 1,
        min_delay_ms: 1,
        max_delay_ms: 5,
    }
}

pub fn test_config(base_url: &str) -> Config {
    Config::new("test_user", "test_key", "test_partner")
        .with_base_url(base_url)
        .with_retry(fast_retry())
}

pub fn token_body(token: &str, expires_in: Option<u64>) -> String {
    match expires_in {
        Some(secs) => json!({"access_token": token, "expires_in": secs, "token_type": "Bearer"}),
        None => json!({"access_token": token, "token_type": "Bearer"}),
    }
    .to_string()
}

pub fn minimal_customer(id: &str, person_type: &str) -> Value {
    json!({
        "id": id,
        "type": "Customer",
        "person_type": person_type,
        "id_type": {"code": "13", "name": "Cédula de Ciudadanía"},
        "identification": "123456789",
        "branch_office": 0,
        "active": true,
        "vat_responsible": false,
    })
}

pub fn full_customer(id: &str) -> Value {
    json!({
        "id": id,
        "type": "Customer",
        "person_type": "Company",
        "id_type": {"code": "13", "name": "Cédula de Ciudadanía"},
        "identification": "123456789",
        "branch_office": 0,
        "check_digit": "1",
        "name": ["Test Company"],
        "commercial_name": "Test Co",
        "active": true,
        "vat_responsible": true,
        "fiscal_responsibilities": [{"code": "O-23", "name": "IVA Régimen Común"}],
        "address": {
            "address": "123 Test Street",
            "city": {
                "country_code": "CO",
                "country_name": "Colombia",
                "state_code": 11,
                "state_name": "Bogotá D.C.",
                "city_code": "11001",
                "city_name": "Bogotá",
            },
            "postal_code": "12345",
        },
        "phones": [{"indicative": "57", "number": "123456789", "extension": "123"}],
        "contacts": [{
            "first_name": "John",
            "last_name": "Doe",
            "email": "john.doe@test.com",
            "phone": {"indicative": "57", "number": "987654321"},
        }],
        "comments": "Test customer",
        "metadata": {"created": "2024-01-01T00:00:00Z"},
        "unexpected_key": {"ignored": true},
    })
}

pub fn webhook(id: &str, topic: &str, url: &str) -> Value {
    json!({
        "id": id,
        "application_id": "app-1",
        "url": url,
        "topic": topic,
        "company_key": "company-1",
        "active": true,
        "created_at": "2024-05-01T10:00:00Z",
    })
}

type Script = Mutex<VecDeque<Result<ApiResponse, SendFailure>>>;

/// In-memory executor replaying scripted outcomes.
///
/// Requests to `/auth` consume the auth script, everything else the api
/// script. An exhausted script answers 500.
#[derive(Default)]
pub struct ScriptedExecutor {
    auth: Script,
    api: Script,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn auth_token(self, token: &str, expires_in: Option<u64>) -> Self {
        self.auth_outcome(Ok(ApiResponse::new(200, token_body(token, expires_in))))
    }

    pub fn auth_outcome(self, outcome: Result<ApiResponse, SendFailure>) -> Self {
        self.auth.lock().unwrap().push_back(outcome);
        self
    }

    pub fn api_response(self, status: u16, body: impl Into<String>) -> Self {
        self.api_outcome(Ok(ApiResponse::new(status, body)))
    }

    pub fn api_failure(self, failure: SendFailure) -> Self {
        self.api_outcome(Err(failure))
    }

    pub fn api_outcome(self, outcome: Result<ApiResponse, SendFailure>) -> Self {
        self.api.lock().unwrap().push_back(outcome);
        self
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn auth_calls(&self) -> usize {
        self.requests().iter().filter(|r| is_auth(r)).count()
    }

    pub fn api_requests(&self) -> Vec<HttpRequest> {
        self.requests().into_iter().filter(|r| !is_auth(r)).collect()
    }

    pub fn api_calls(&self) -> usize {
        self.api_requests().len()
    }
}

fn is_auth(request: &HttpRequest) -> bool {
    request.url.ends_with("/auth")
}

#[async_trait]
impl HttpExecutor for ScriptedExecutor {
    async fn execute(&self, request: HttpRequest) -> Result<ApiResponse, SendFailure> {
        let script = if is_auth(&request) { &self.auth } else { &self.api };
        self.requests.lock().unwrap().push(request);
        script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(ApiResponse::new(500, "unscripted")))
    }
}
