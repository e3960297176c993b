//! Confirm-handover request: attests that the physical exchange occurred.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::request::Validate;

/// Request body for confirming the handover.
///
/// Each party confirms independently; the transaction completes and
/// settlement fires when the second flag is set. A repeated confirmation
/// from a party whose flag is already true is a no-op, not an error, so
/// at-least-once transports can retry safely.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmHandover {
    /// ID of the transaction.
    pub transaction_id: String,
}

impl ConfirmHandover {
    /// Create a new confirm-handover request.
    pub fn new(transaction_id: &str) -> Self {
        Self {
            transaction_id: transaction_id.to_string(),
        }
    }
}

impl Validate for ConfirmHandover {
    fn validate(&self) -> Result<()> {
        if self.transaction_id.is_empty() {
            return Err(Error::Validation(
                "Transaction ID is required in ConfirmHandover".to_string(),
            ));
        }
        Ok(())
    }
}
