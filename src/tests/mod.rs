pub mod common;

mod webhooks;
