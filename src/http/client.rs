//! Ready-made back-channel clients.
//!
//! An OAuth integration plugs one of these in as the HTTP client it uses to
//! talk to the identity provider.

use axum::body::Body;
use hyper_util::client::legacy::{connect::HttpConnector, Client};
use tower::ServiceBuilder;
use tower_http::trace::{HttpMakeClassifier, Trace, TraceLayer};

use crate::config::TransportConfig;
use crate::http::layer::{NormalizeUrl, NormalizeUrlLayer};
use crate::http::normalizer::NormalizingSender;
use crate::http::transport::{build_hyper_client, ReqwestTransport, TransportError};

/// `hyper-util` client behind URL repair and request tracing.
pub type TracedClient = Trace<NormalizeUrl<Client<HttpConnector, Body>>, HttpMakeClassifier>;

/// HTTPS-capable normalizing sender.
pub fn backchannel_sender(
    config: &TransportConfig,
) -> Result<NormalizingSender<ReqwestTransport>, TransportError> {
    Ok(NormalizingSender::new(ReqwestTransport::from_config(config)?))
}

/// Tower stack: trace → normalize → `hyper-util` client.
pub fn traced_client(config: &TransportConfig) -> TracedClient {
    ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(NormalizeUrlLayer::new())
        .service(build_hyper_client(config))
}
