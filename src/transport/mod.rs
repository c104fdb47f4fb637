/// Transport module
///
/// Authenticated request pipeline on top of a swappable HTTP executor.
pub mod executor;
pub mod transport;

pub use executor::{ApiResponse, HttpExecutor, HttpRequest, ReqwestExecutor};
pub use transport::{RequestOptions, Transport};
