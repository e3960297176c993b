//! Confirm-time request: accepts one of the proposed meeting times.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::request::Validate;

/// Request body for confirming a meeting time.
///
/// Only the party that did not author the most recent proposal set may
/// confirm; the selected time must be one of the stored candidates and
/// still in the future at the confirmation instant. Both rules are
/// enforced by the engine against stored state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmTime {
    /// ID of the transaction.
    pub transaction_id: String,

    /// The candidate time being accepted.
    pub selected_time: DateTime<Utc>,
}

impl ConfirmTime {
    /// Create a new confirm-time request.
    pub fn new(transaction_id: &str, selected_time: DateTime<Utc>) -> Self {
        Self {
            transaction_id: transaction_id.to_string(),
            selected_time,
        }
    }
}

impl Validate for ConfirmTime {
    fn validate(&self) -> Result<()> {
        if self.transaction_id.is_empty() {
            return Err(Error::Validation(
                "Transaction ID is required in ConfirmTime".to_string(),
            ));
        }
        Ok(())
    }
}
