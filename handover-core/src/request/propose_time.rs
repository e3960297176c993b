//! Propose-time request: suggests candidate meeting times.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::request::Validate;

/// Request body for proposing meeting times.
///
/// Either party may propose. The engine appends the new candidates to the
/// stored list and silently caps it at
/// [`crate::transaction::MAX_PROPOSED_TIMES`], dropping the oldest
/// unselected entries first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProposeTime {
    /// ID of the transaction the times are proposed for.
    pub transaction_id: String,

    /// Candidate meeting times.
    pub times: Vec<DateTime<Utc>>,
}

impl ProposeTime {
    /// Create a new propose-time request.
    pub fn new(transaction_id: &str, times: Vec<DateTime<Utc>>) -> Self {
        Self {
            transaction_id: transaction_id.to_string(),
            times,
        }
    }
}

impl Validate for ProposeTime {
    fn validate(&self) -> Result<()> {
        if self.transaction_id.is_empty() {
            return Err(Error::Validation(
                "Transaction ID is required in ProposeTime".to_string(),
            ));
        }

        if self.times.is_empty() {
            return Err(Error::Validation(
                "At least one candidate time is required".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_times_rejected() {
        let req = ProposeTime::new("txn-1", vec![]);
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_valid_request() {
        let req = ProposeTime::new("txn-1", vec![Utc::now()]);
        assert!(req.validate().is_ok());
    }
}
