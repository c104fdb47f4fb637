//! Shared constants and invariants

pub const DEFAULT_BASE_URL: &str = "https://api.siigo.com";
pub const DEFAULT_TIMEOUT_SECS: f64 = 30.0;
pub const DEFAULT_USER_AGENT: &str = concat!(
    "siigo-connector/",
    env!("CARGO_PKG_VERSION"),
    " (+https://github.com/arendondiosa/siigo-connector)"
);

pub const DEFAULT_RETRY_ATTEMPTS: u32 = 3;
pub const DEFAULT_RETRY_BASE_DELAY_MS: u64 = 300;
pub const DEFAULT_RETRY_MIN_DELAY_MS: u64 = 500;
pub const DEFAULT_RETRY_MAX_DELAY_MS: u64 = 5000;

// Request headers
pub const HEADER_PARTNER_ID: &str = "Partner-Id";

// API paths, relative to the base url
pub const AUTH_PATH: &str = "/auth";
pub const CUSTOMERS_PATH: &str = "/v1/customers";
pub const WEBHOOKS_PATH: &str = "/v1/webhooks";
