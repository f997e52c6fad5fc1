//! Back-channel URL repair for outbound OAuth provider requests.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use config::schema::ClientConfig;
pub use http::{NormalizeError, NormalizingSender, Sender};
pub use lifecycle::{CancellationSignal, Canceller};
