//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Cancellation (cancel.rs):
//!     Canceller::cancel → every CancellationSignal → transport aborts send
//!
//! Signals (signals.rs):
//!     SIGINT (Ctrl+C) → Canceller::cancel
//! ```
//!
//! # Design Decisions
//! - Cancellation is cooperative and single-hop: pipeline stages forward the
//!   signal, only the transport acts on it
//! - Cancel is sticky, so a signal created after cancel still observes it

pub mod cancel;
pub mod signals;

pub use cancel::{CancellationSignal, Canceller};
