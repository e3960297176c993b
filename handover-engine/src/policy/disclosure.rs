//! Disclosure policy: progressive reveal of location precision.
//!
//! Location detail is staged: while the transaction is `pending` only the
//! coarse district is visible; once a meeting time is confirmed the exact
//! address is revealed. This is a confidentiality property, enforced at
//! the serialization boundary; the raw address field never leaves the
//! engine in any other form.

use handover_core::{Transaction, TransactionStatus};
use serde::{Deserialize, Serialize};

/// The location detail a caller is allowed to see.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum VisibleLocation {
    /// No location information available.
    None,

    /// Coarse district only.
    District(String),

    /// Full meeting address.
    Exact(String),
}

impl VisibleLocation {
    /// Whether the exact address is disclosed.
    pub fn is_exact(&self) -> bool {
        matches!(self, VisibleLocation::Exact(_))
    }
}

/// Compute the visible location for a transaction.
///
/// While `pending` (or after cancellation/expiry out of `pending`) only
/// the district is exposed. From `time_confirmed` onwards the exact
/// address is exposed when set, falling back to the district otherwise.
/// The exact address is never exposed before a time is confirmed, even to
/// a requester who might already know it through other means.
pub fn visible_location(tx: &Transaction) -> VisibleLocation {
    let district = || match &tx.location_district {
        Some(d) => VisibleLocation::District(d.clone()),
        None => VisibleLocation::None,
    };

    match tx.status {
        TransactionStatus::TimeConfirmed | TransactionStatus::Completed => {
            match &tx.exact_address {
                Some(addr) => VisibleLocation::Exact(addr.clone()),
                None => district(),
            }
        }
        _ => district(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use handover_core::{OfferRef, Party};

    fn make_tx(district: Option<&str>, address: Option<&str>) -> Transaction {
        let mut tx = Transaction::new(
            "txn-001",
            Party::new("user-p", "Paula"),
            Party::new("user-r", "Rami"),
            OfferRef::new("offer-1", "Drill", "used"),
            district.map(|d| d.to_string()),
            Utc::now(),
        );
        tx.exact_address = address.map(|a| a.to_string());
        tx
    }

    #[test]
    fn test_pending_hides_exact_address() {
        let tx = make_tx(Some("Kreuzberg"), Some("Oranienstr. 12"));
        assert_eq!(
            visible_location(&tx),
            VisibleLocation::District("Kreuzberg".to_string())
        );
    }

    #[test]
    fn test_pending_without_district() {
        let tx = make_tx(None, Some("Oranienstr. 12"));
        assert_eq!(visible_location(&tx), VisibleLocation::None);
    }

    #[test]
    fn test_time_confirmed_reveals_exact() {
        let mut tx = make_tx(Some("Kreuzberg"), Some("Oranienstr. 12"));
        tx.status = TransactionStatus::TimeConfirmed;
        assert_eq!(
            visible_location(&tx),
            VisibleLocation::Exact("Oranienstr. 12".to_string())
        );
    }

    #[test]
    fn test_time_confirmed_falls_back_to_district() {
        let mut tx = make_tx(Some("Kreuzberg"), None);
        tx.status = TransactionStatus::TimeConfirmed;
        assert_eq!(
            visible_location(&tx),
            VisibleLocation::District("Kreuzberg".to_string())
        );
    }

    #[test]
    fn test_completed_keeps_exact() {
        let mut tx = make_tx(Some("Kreuzberg"), Some("Oranienstr. 12"));
        tx.status = TransactionStatus::Completed;
        assert!(visible_location(&tx).is_exact());
    }

    #[test]
    fn test_cancelled_from_pending_stays_coarse() {
        let mut tx = make_tx(Some("Kreuzberg"), Some("Oranienstr. 12"));
        tx.status = TransactionStatus::Cancelled;
        assert_eq!(
            visible_location(&tx),
            VisibleLocation::District("Kreuzberg".to_string())
        );
    }

    #[test]
    fn test_serialized_shape() {
        let loc = VisibleLocation::District("Kreuzberg".to_string());
        let json = serde_json::to_value(&loc).unwrap();
        assert_eq!(json["kind"], "district");
        assert_eq!(json["value"], "Kreuzberg");
    }
}
