//! The "send request" capability shared by pipeline stages and transports.

use std::future::Future;
use std::sync::Arc;

use hyper::body::Bytes;
use hyper::Request;

use crate::lifecycle::CancellationSignal;

/// A request about to leave the process.
pub type OutgoingRequest = Request<Bytes>;

/// Something that can send an [`OutgoingRequest`].
///
/// Implemented by transports that perform the network call and by pipeline
/// stages that wrap another `Sender`. The cancellation signal must be passed
/// through unchanged to whichever implementation does the actual I/O.
pub trait Sender: Send + Sync {
    /// Whatever the transport returns; pipeline stages pass it through.
    type Response: Send;

    type Error: std::error::Error + Send + Sync + 'static;

    fn send(
        &self,
        request: OutgoingRequest,
        cancel: CancellationSignal,
    ) -> impl Future<Output = Result<Self::Response, Self::Error>> + Send;
}

impl<S: Sender> Sender for Arc<S> {
    type Response = S::Response;
    type Error = S::Error;

    fn send(
        &self,
        request: OutgoingRequest,
        cancel: CancellationSignal,
    ) -> impl Future<Output = Result<Self::Response, Self::Error>> + Send {
        (**self).send(request, cancel)
    }
}
