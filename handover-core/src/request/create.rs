//! Create request: opens a new transaction between two parties.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::offer::OfferRef;
use crate::party::Party;
use crate::request::Validate;

/// Request body for creating a transaction.
///
/// Issued by the interest flow of the messaging subsystem when a
/// requester expresses interest in an offer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTransaction {
    /// The party that owns the item.
    pub provider: Party,

    /// The party that asked for it.
    pub requester: Party,

    /// Snapshot of the offered item.
    pub offer: OfferRef,

    /// Coarse location, visible from creation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_district: Option<String>,
}

impl CreateTransaction {
    /// Create a new request body.
    pub fn new(provider: Party, requester: Party, offer: OfferRef) -> Self {
        Self {
            provider,
            requester,
            offer,
            location_district: None,
        }
    }

    /// Attach a district.
    pub fn with_district(mut self, district: &str) -> Self {
        self.location_district = Some(district.to_string());
        self
    }
}

impl Validate for CreateTransaction {
    fn validate(&self) -> Result<()> {
        if self.provider.user_id.is_empty() || self.requester.user_id.is_empty() {
            return Err(Error::Validation(
                "Both parties must have a user id".to_string(),
            ));
        }

        if self.provider.user_id == self.requester.user_id {
            return Err(Error::Validation(
                "Provider and requester must be distinct users".to_string(),
            ));
        }

        if self.offer.offer_id.is_empty() {
            return Err(Error::Validation(
                "Offer reference is required".to_string(),
            ));
        }

        if let Some(district) = &self.location_district {
            if district.trim().is_empty() {
                return Err(Error::Validation(
                    "District must not be blank when present".to_string(),
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_request() -> CreateTransaction {
        CreateTransaction::new(
            Party::new("user-p", "Paula"),
            Party::new("user-r", "Rami"),
            OfferRef::new("offer-1", "Drill", "used"),
        )
    }

    #[test]
    fn test_valid_request() {
        assert!(make_request().validate().is_ok());
    }

    #[test]
    fn test_same_party_rejected() {
        let mut req = make_request();
        req.requester = req.provider.clone();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_blank_district_rejected() {
        let req = make_request().with_district("   ");
        assert!(req.validate().is_err());
    }
}
