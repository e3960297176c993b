//! Error handling for the handover coordination engine.

use handover_core::TransactionStatus;
use thiserror::Error;

/// Error types for engine operations.
///
/// None of these are retried internally; the engine never auto-retries a
/// mutating action. An already-expired record answers mutating calls with
/// [`Error::InvalidTransition`] rather than a distinct error, so callers
/// handle it through the same status-aware path as cancellation.
#[derive(Error, Debug)]
pub enum Error {
    /// The action is not permitted for this caller's role in the current
    /// state. Never retried automatically.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The action is legal for the role but not for the current status.
    /// The current status is surfaced so the caller can refresh.
    #[error("Invalid transition: cannot {action} while {status}")]
    InvalidTransition {
        /// The operation that was attempted.
        action: &'static str,
        /// The status the transaction was in when the action arrived.
        status: TransactionStatus,
    },

    /// The selected meeting time is no longer in the future. The caller
    /// must re-propose; the engine never silently retries.
    #[error("Stale proposal: selected time is no longer in the future")]
    StaleProposal,

    /// Optimistic-concurrency conflict: the record changed between load
    /// and write. The caller should reload and may retry.
    #[error("Concurrent modification of transaction {0}")]
    ConcurrentModification(String),

    /// Transaction not found in the store.
    #[error("Transaction not found: {0}")]
    NotFound(String),

    /// Malformed request payload, rejected before any state read.
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<handover_core::Error> for Error {
    fn from(err: handover_core::Error) -> Self {
        Error::Validation(err.to_string())
    }
}
