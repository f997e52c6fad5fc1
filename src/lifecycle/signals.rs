//! OS signal handling.

use std::sync::Arc;

use crate::lifecycle::cancel::Canceller;

/// Cancel `canceller` on the first Ctrl+C.
///
/// Spawns a background task; the returned handle can be aborted once the
/// guarded work has finished.
pub fn cancel_on_ctrl_c(canceller: Arc<Canceller>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("Interrupt received, cancelling in-flight request");
                canceller.cancel();
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            }
        }
    })
}
