//! Outbound request normalizer.
//!
//! # Responsibilities
//! - Repair `?access_token` delimiters on non-OAuth back-channel URLs
//! - Refuse to send when the repaired URL does not parse
//! - Forward exactly once to the wrapped sender and return its result as-is
//!
//! # Design Decisions
//! - Stateless; one instance is shared across concurrent requests
//! - Transport errors are wrapped transparently, never translated
//! - No timeout or retry here; those belong to the transport or caller

use std::future::Future;

use thiserror::Error;

use crate::http::rewrite::{normalize_request, MalformedUrlError, Rewrite};
use crate::http::sender::{OutgoingRequest, Sender};
use crate::lifecycle::CancellationSignal;
use crate::observability::metrics::{self, RewriteOutcome};

/// Error returned by a normalizing pipeline stage.
#[derive(Debug, Error)]
pub enum NormalizeError<E> {
    /// The rewrite produced an invalid URL; nothing was sent.
    #[error(transparent)]
    MalformedUrl(#[from] MalformedUrlError),

    /// The wrapped sender failed. Carries its error untouched.
    #[error(transparent)]
    Transport(E),
}

impl<E> NormalizeError<E> {
    pub fn is_malformed_url(&self) -> bool {
        matches!(self, NormalizeError::MalformedUrl(_))
    }

    /// The wrapped sender's error, if that is what this is.
    pub fn into_transport(self) -> Option<E> {
        match self {
            NormalizeError::Transport(e) => Some(e),
            NormalizeError::MalformedUrl(_) => None,
        }
    }
}

/// Wraps a [`Sender`] and repairs back-channel URLs before forwarding.
#[derive(Debug, Clone, Default)]
pub struct NormalizingSender<S> {
    inner: S,
}

impl<S> NormalizingSender<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

/// Apply the rewrite rule to `request`, recording the decision.
pub(crate) fn prepare<B>(request: &mut hyper::Request<B>) -> Result<(), MalformedUrlError> {
    match normalize_request(request) {
        Ok(Rewrite::Rewritten(uri)) => {
            tracing::debug!(
                host = uri.host().unwrap_or_default(),
                path = uri.path(),
                "Repaired access_token delimiter"
            );
            metrics::record_rewrite(RewriteOutcome::Rewritten);
        }
        Ok(Rewrite::SkippedOauth) => {
            tracing::trace!(path = request.uri().path(), "OAuth endpoint, not rewriting");
            metrics::record_rewrite(RewriteOutcome::SkippedOauth);
        }
        Ok(Rewrite::Unchanged) => {
            metrics::record_rewrite(RewriteOutcome::Unchanged);
        }
        Err(e) => {
            metrics::record_rewrite(RewriteOutcome::Malformed);
            return Err(e);
        }
    }
    Ok(())
}

impl<S: Sender> Sender for NormalizingSender<S> {
    type Response = S::Response;
    type Error = NormalizeError<S::Error>;

    fn send(
        &self,
        mut request: OutgoingRequest,
        cancel: CancellationSignal,
    ) -> impl Future<Output = Result<Self::Response, Self::Error>> + Send {
        let prepared = prepare(&mut request);
        async move {
            if let Err(e) = prepared {
                return Err(NormalizeError::MalformedUrl(e));
            }
            self.inner
                .send(request, cancel)
                .await
                .map_err(NormalizeError::Transport)
        }
    }
}
