//! Tower middleware form of the normalizer.
//!
//! Lets the URL repair sit in any `tower` client stack, e.g. in front of a
//! `hyper-util` legacy client. Cancellation follows the tower convention:
//! dropping the response future abandons the call.

use std::task::{Context, Poll};

use futures_util::future::{self, Either, MapErr, Ready, TryFutureExt};
use hyper::Request;
use tower::{Layer, Service};

use crate::http::normalizer::{prepare, NormalizeError};

/// Applies [`NormalizeUrl`] to a service.
#[derive(Debug, Clone, Copy, Default)]
pub struct NormalizeUrlLayer;

impl NormalizeUrlLayer {
    pub fn new() -> Self {
        Self
    }
}

impl<S> Layer<S> for NormalizeUrlLayer {
    type Service = NormalizeUrl<S>;

    fn layer(&self, inner: S) -> Self::Service {
        NormalizeUrl { inner }
    }
}

/// Repairs `?access_token` delimiters before calling the inner service.
#[derive(Debug, Clone)]
pub struct NormalizeUrl<S> {
    inner: S,
}

impl<S> NormalizeUrl<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    pub fn get_ref(&self) -> &S {
        &self.inner
    }
}

type TransportMap<E> = fn(E) -> NormalizeError<E>;

impl<S, B> Service<Request<B>> for NormalizeUrl<S>
where
    S: Service<Request<B>>,
{
    type Response = S::Response;
    type Error = NormalizeError<S::Error>;
    type Future = Either<
        Ready<Result<S::Response, NormalizeError<S::Error>>>,
        MapErr<S::Future, TransportMap<S::Error>>,
    >;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx).map_err(NormalizeError::Transport)
    }

    fn call(&mut self, mut request: Request<B>) -> Self::Future {
        match prepare(&mut request) {
            Ok(()) => {
                let map: TransportMap<S::Error> = NormalizeError::Transport;
                Either::Right(self.inner.call(request).map_err(map))
            }
            Err(e) => Either::Left(future::ready(Err(NormalizeError::MalformedUrl(e)))),
        }
    }
}
