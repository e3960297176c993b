//! Cancel request: unilaterally aborts the transaction.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::request::Validate;

/// Request body for cancelling a transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cancel {
    /// ID of the transaction being cancelled.
    pub transaction_id: String,

    /// Optional reason, kept on the record for history.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl Cancel {
    /// Create a new Cancel request.
    pub fn new(transaction_id: &str) -> Self {
        Self {
            transaction_id: transaction_id.to_string(),
            reason: None,
        }
    }

    /// Create a new Cancel request with a reason.
    pub fn with_reason(transaction_id: &str, reason: &str) -> Self {
        Self {
            transaction_id: transaction_id.to_string(),
            reason: Some(reason.to_string()),
        }
    }
}

impl Validate for Cancel {
    fn validate(&self) -> Result<()> {
        if self.transaction_id.is_empty() {
            return Err(Error::Validation(
                "Transaction ID is required in Cancel".to_string(),
            ));
        }
        Ok(())
    }
}
