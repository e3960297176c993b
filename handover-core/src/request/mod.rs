//! Request bodies for the engine operations.
//!
//! One module per operation. Each body knows how to validate its own
//! payload; validation here covers only the request contents (malformed
//! input is rejected before any state is read). Checks that depend on the
//! stored transaction, such as status, roles, and expiration, belong to
//! the engine.

pub mod cancel;
pub mod confirm_handover;
pub mod confirm_time;
pub mod create;
pub mod propose_time;
pub mod update_address;

pub use cancel::Cancel;
pub use confirm_handover::ConfirmHandover;
pub use confirm_time::ConfirmTime;
pub use create::CreateTransaction;
pub use propose_time::ProposeTime;
pub use update_address::UpdateAddress;

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Payload validation for request bodies.
pub trait Validate {
    /// Validate the request contents, returning a validation error on
    /// malformed input.
    fn validate(&self) -> Result<()>;
}

/// Any engine request, tagged by operation name. Useful for transports
/// that route a single endpoint into the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum HandoverRequest {
    /// Create a new transaction.
    Create(CreateTransaction),
    /// Propose candidate meeting times.
    ProposeTime(ProposeTime),
    /// Accept one of the proposed times.
    ConfirmTime(ConfirmTime),
    /// Attest that the handover occurred.
    ConfirmHandover(ConfirmHandover),
    /// Cancel the transaction.
    Cancel(Cancel),
    /// Update the exact meeting address.
    UpdateAddress(UpdateAddress),
}

impl HandoverRequest {
    /// The transaction this request addresses, if it targets an existing
    /// record.
    pub fn transaction_id(&self) -> Option<&str> {
        match self {
            HandoverRequest::Create(_) => None,
            HandoverRequest::ProposeTime(r) => Some(&r.transaction_id),
            HandoverRequest::ConfirmTime(r) => Some(&r.transaction_id),
            HandoverRequest::ConfirmHandover(r) => Some(&r.transaction_id),
            HandoverRequest::Cancel(r) => Some(&r.transaction_id),
            HandoverRequest::UpdateAddress(r) => Some(&r.transaction_id),
        }
    }
}

impl Validate for HandoverRequest {
    fn validate(&self) -> Result<()> {
        match self {
            HandoverRequest::Create(r) => r.validate(),
            HandoverRequest::ProposeTime(r) => r.validate(),
            HandoverRequest::ConfirmTime(r) => r.validate(),
            HandoverRequest::ConfirmHandover(r) => r.validate(),
            HandoverRequest::Cancel(r) => r.validate(),
            HandoverRequest::UpdateAddress(r) => r.validate(),
        }
    }
}
