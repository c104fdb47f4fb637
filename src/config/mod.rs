pub mod settings;

pub use settings::{Config, LogFormat, LoggingConfig, RetryConfig};
