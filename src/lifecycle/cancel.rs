//! Cooperative cancellation for in-flight requests.

use tokio_util::sync::CancellationToken;

/// Owner side of a cancellation signal.
///
/// Hands out [`CancellationSignal`]s that observe a single cancel request.
/// Cancelling is sticky: signals created afterwards observe it too.
#[derive(Debug, Default)]
pub struct Canceller {
    token: CancellationToken,
}

impl Canceller {
    /// Create a new, untriggered canceller.
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
        }
    }

    /// Get a signal to pass along with a request.
    pub fn signal(&self) -> CancellationSignal {
        CancellationSignal {
            token: self.token.clone(),
        }
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// Caller-supplied cancellation signal, forwarded as-is down the sender chain.
///
/// Observe-only: holders can wait on it but not trigger it.
#[derive(Clone, Debug, Default)]
pub struct CancellationSignal {
    token: CancellationToken,
}

impl CancellationSignal {
    /// A signal that never fires.
    pub fn never() -> Self {
        Self {
            token: CancellationToken::new(),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolve once cancellation is requested.
    ///
    /// Pends forever if the owning [`Canceller`] is dropped without cancelling.
    pub async fn cancelled(&self) {
        self.token.cancelled().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    #[tokio::test]
    async fn test_signal_observes_cancel() {
        let canceller = Canceller::new();
        let signal = canceller.signal();
        assert!(!signal.is_cancelled());

        let waiter = tokio::spawn({
            let signal = signal.clone();
            async move { signal.cancelled().await }
        });

        canceller.cancel();
        timeout(Duration::from_secs(1), waiter)
            .await
            .expect("cancellation not observed")
            .unwrap();
        assert!(signal.is_cancelled());
        assert!(canceller.is_cancelled());
    }

    #[tokio::test]
    async fn test_late_signal_sees_earlier_cancel() {
        let canceller = Canceller::new();
        canceller.cancel();

        let signal = canceller.signal();
        assert!(signal.is_cancelled());
        timeout(Duration::from_millis(100), signal.cancelled())
            .await
            .expect("already-cancelled signal should resolve immediately");
    }

    #[tokio::test]
    async fn test_never_does_not_fire() {
        let signal = CancellationSignal::never();
        assert!(!signal.is_cancelled());
        assert!(timeout(Duration::from_millis(50), signal.cancelled())
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_dropped_canceller_does_not_fire() {
        let canceller = Canceller::new();
        let signal = canceller.signal();
        drop(canceller);

        assert!(timeout(Duration::from_millis(50), signal.cancelled())
            .await
            .is_err());
    }
}
