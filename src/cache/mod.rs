pub mod token;
pub mod token_cache;

pub use token::CachedToken;
pub use token_cache::{Credentials, TokenCache};
