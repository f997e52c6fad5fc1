//! Outbound HTTP pipeline.
//!
//! # Data Flow
//! ```text
//! caller (OAuth integration)
//!     → normalizer.rs (repair ?access_token, fail closed on bad URL)
//!         rewrite.rs (pure decision rule + string replacement)
//!     → transport.rs (reqwest or hyper-util; cancellation, timeouts)
//!     → identity provider
//! ```
//!
//! `sender.rs` defines the seam between stages; `layer.rs` offers the same
//! normalizer as tower middleware and `client.rs` assembles both forms.

pub mod client;
pub mod layer;
pub mod normalizer;
pub mod rewrite;
pub mod sender;
pub mod transport;

pub use client::{backchannel_sender, traced_client, TracedClient};
pub use layer::{NormalizeUrl, NormalizeUrlLayer};
pub use normalizer::{NormalizeError, NormalizingSender};
pub use rewrite::{normalize_uri, normalize_url, MalformedUrlError, Rewrite};
pub use sender::{OutgoingRequest, Sender};
pub use transport::{HyperTransport, ReqwestTransport, TransportError};
