//! Network transports.
//!
//! # Responsibilities
//! - Perform the actual send for an [`OutgoingRequest`]
//! - Honour the caller's cancellation signal
//! - Apply the configured connect and request timeouts
//!
//! # Design Decisions
//! - `ReqwestTransport` handles HTTPS and is what the CLI uses
//! - `HyperTransport` is the bare `hyper-util` client used by the tower stack;
//!   plain HTTP only
//! - Cancellation wins over a response that becomes ready at the same time

use std::future::Future;
use std::time::Duration;

use axum::body::Body;
use hyper::body::Incoming;
use hyper::header::{HeaderValue, USER_AGENT};
use hyper::Response;
use hyper_util::client::legacy::{connect::HttpConnector, Client};
use hyper_util::rt::{TokioExecutor, TokioTimer};
use thiserror::Error;

use crate::config::TransportConfig;
use crate::http::sender::{OutgoingRequest, Sender};
use crate::lifecycle::CancellationSignal;
use crate::observability::metrics;

/// Errors raised by the provided transports.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The caller's cancellation signal fired before the response arrived.
    #[error("request cancelled")]
    Cancelled,

    /// No response within the configured request timeout.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("HTTP client error: {0}")]
    Hyper(#[from] hyper_util::client::legacy::Error),

    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),
}

impl TransportError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, TransportError::Cancelled)
    }
}

/// Race `send` against cancellation and the request timeout.
async fn guarded<T, F>(
    transport: &'static str,
    send: F,
    timeout: Option<Duration>,
    cancel: CancellationSignal,
) -> Result<T, TransportError>
where
    F: Future<Output = Result<T, TransportError>>,
{
    let deadline = async {
        match timeout {
            Some(limit) => tokio::time::sleep(limit).await,
            None => std::future::pending::<()>().await,
        }
    };

    let result = tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            tracing::warn!(transport = transport, "Request cancelled by caller");
            Err(TransportError::Cancelled)
        }
        res = send => res,
        _ = deadline => Err(TransportError::Timeout(timeout.unwrap_or_default())),
    };

    metrics::record_transport_result(
        transport,
        match &result {
            Ok(_) => "ok",
            Err(TransportError::Cancelled) => "cancelled",
            Err(TransportError::Timeout(_)) => "timeout",
            Err(_) => "error",
        },
    );
    result
}

/// Transport backed by a pooled `reqwest::Client`.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Build a client from transport settings.
    pub fn from_config(config: &TransportConfig) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .pool_idle_timeout(Duration::from_secs(config.pool_idle_timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self { client })
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }
}

impl Sender for ReqwestTransport {
    type Response = reqwest::Response;
    type Error = TransportError;

    fn send(
        &self,
        request: OutgoingRequest,
        cancel: CancellationSignal,
    ) -> impl Future<Output = Result<reqwest::Response, TransportError>> + Send {
        let prepared = reqwest::Request::try_from(request);
        async move {
            let request = match prepared {
                Ok(request) => request,
                Err(e) => return Err(TransportError::from(e)),
            };
            tracing::debug!(
                method = %request.method(),
                host = request.url().host_str().unwrap_or_default(),
                path = request.url().path(),
                "Sending request"
            );
            // reqwest enforces its own timeout
            let send = async { self.client.execute(request).await.map_err(TransportError::from) };
            guarded("reqwest", send, None, cancel).await
        }
    }
}

/// Transport backed by a `hyper-util` legacy client.
#[derive(Debug, Clone)]
pub struct HyperTransport {
    client: Client<HttpConnector, Body>,
    request_timeout: Option<Duration>,
    user_agent: Option<HeaderValue>,
}

impl HyperTransport {
    /// Transport with default connector settings and no timeout.
    pub fn new() -> Self {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        Self {
            client,
            request_timeout: None,
            user_agent: None,
        }
    }

    pub fn from_config(config: &TransportConfig) -> Self {
        Self {
            client: build_hyper_client(config),
            request_timeout: Some(Duration::from_secs(config.request_timeout_secs)),
            user_agent: HeaderValue::from_str(&config.user_agent).ok(),
        }
    }
}

impl Default for HyperTransport {
    fn default() -> Self {
        Self::new()
    }
}

/// Pooled `hyper-util` client honouring the connect and idle timeouts.
pub fn build_hyper_client(config: &TransportConfig) -> Client<HttpConnector, Body> {
    let mut connector = HttpConnector::new();
    connector.set_connect_timeout(Some(Duration::from_secs(config.connect_timeout_secs)));

    Client::builder(TokioExecutor::new())
        .pool_timer(TokioTimer::new())
        .pool_idle_timeout(Duration::from_secs(config.pool_idle_timeout_secs))
        .build(connector)
}

impl Sender for HyperTransport {
    type Response = Response<Incoming>;
    type Error = TransportError;

    fn send(
        &self,
        request: OutgoingRequest,
        cancel: CancellationSignal,
    ) -> impl Future<Output = Result<Response<Incoming>, TransportError>> + Send {
        let mut request = request.map(Body::from);
        if let Some(agent) = &self.user_agent {
            request
                .headers_mut()
                .entry(USER_AGENT)
                .or_insert_with(|| agent.clone());
        }

        tracing::debug!(
            method = %request.method(),
            host = request.uri().host().unwrap_or_default(),
            path = request.uri().path(),
            "Sending request"
        );
        let send = self.client.request(request);
        let send = async move { send.await.map_err(TransportError::from) };
        guarded("hyper", send, self.request_timeout, cancel)
    }
}
