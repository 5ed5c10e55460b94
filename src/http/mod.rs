//! Outbound HTTP: connection pool lifecycle, request execution and response
//! validation.
mod executor;
mod transport;
mod validator;


pub use executor::{CompletedResponse, RequestExecutor};
pub use transport::{ConnectionPool, TransportManager};
pub use validator::validate;

/// Per-request timeout used when none is configured.
pub const DEFAULT_REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(10);

pub(crate) const DEFAULT_USER_AGENT: &str = concat!("trickle/", env!("CARGO_PKG_VERSION"));
