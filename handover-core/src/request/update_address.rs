//! Update-address request: sets or corrects the exact meeting address.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::request::Validate;

/// Longest accepted address string. Addresses are short free text, not
/// documents.
pub const MAX_ADDRESS_LEN: usize = 500;

/// Request body for updating the exact address.
///
/// Only the provider may edit the address, and only while the
/// transaction is still live and the handover is not yet mutually
/// confirmed. Edits after time confirmation pass through this same
/// validation as the initial entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateAddress {
    /// ID of the transaction.
    pub transaction_id: String,

    /// The new exact address.
    pub address: String,
}

impl UpdateAddress {
    /// Create a new update-address request.
    pub fn new(transaction_id: &str, address: &str) -> Self {
        Self {
            transaction_id: transaction_id.to_string(),
            address: address.to_string(),
        }
    }
}

impl Validate for UpdateAddress {
    fn validate(&self) -> Result<()> {
        if self.transaction_id.is_empty() {
            return Err(Error::Validation(
                "Transaction ID is required in UpdateAddress".to_string(),
            ));
        }

        if self.address.trim().is_empty() {
            return Err(Error::Validation(
                "Address must not be blank".to_string(),
            ));
        }

        if self.address.len() > MAX_ADDRESS_LEN {
            return Err(Error::Validation(format!(
                "Address exceeds {} characters",
                MAX_ADDRESS_LEN
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_address_rejected() {
        assert!(UpdateAddress::new("txn-1", "  ").validate().is_err());
    }

    #[test]
    fn test_oversized_address_rejected() {
        let address = "x".repeat(MAX_ADDRESS_LEN + 1);
        assert!(UpdateAddress::new("txn-1", &address).validate().is_err());
    }

    #[test]
    fn test_valid_address() {
        assert!(UpdateAddress::new("txn-1", "Oranienstr. 12, backyard")
            .validate()
            .is_ok());
    }
}
