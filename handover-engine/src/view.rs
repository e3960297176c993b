//! Caller-facing transaction view.
//!
//! [`TransactionView`] is the only serialized representation the engine
//! hands out. It is rebuilt per caller on every operation: disclosure is
//! applied here (the raw `exact_address` field never crosses this
//! boundary), and the capability flags and expiration result are
//! recomputed so clients never derive authorization on their own.

use chrono::{DateTime, Utc};
use handover_core::{OfferRef, Party, Role, Transaction, TransactionStatus};
use serde::{Deserialize, Serialize};

use crate::policy::{self, Capabilities, ExpirationCheck, VisibleLocation};

/// A transaction as seen by one of its parties at one instant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionView {
    /// Transaction identifier.
    pub transaction_id: String,

    /// Current lifecycle status.
    pub status: TransactionStatus,

    /// The role of the caller this view was built for.
    pub caller_role: Role,

    /// The providing party.
    pub provider: Party,

    /// The requesting party.
    pub requester: Party,

    /// Snapshot of the exchanged item.
    pub offer: OfferRef,

    /// Candidate meeting times still in the future at the view instant.
    /// Past-dated candidates stay on the stored record but are filtered
    /// out of every view, so callers never offer a slot that would be
    /// rejected as stale on selection.
    pub proposed_times: Vec<DateTime<Utc>>,

    /// Which side authored the most recent proposal set.
    pub proposed_by: Option<Role>,

    /// The agreed meeting time, once confirmed.
    pub confirmed_time: Option<DateTime<Utc>>,

    /// Location detail the caller may see, per the disclosure policy.
    pub visible_location: VisibleLocation,

    /// The requester's handover attestation.
    pub requester_confirmed: bool,

    /// The provider's handover attestation.
    pub provider_confirmed: bool,

    /// Reason recorded on cancellation, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancel_reason: Option<String>,

    /// Creation instant.
    pub created_at: DateTime<Utc>,

    /// Pending-phase cutoff.
    pub expires_at: DateTime<Utc>,

    /// Expiration facts as of the view instant, advisory included.
    pub expiration: ExpirationCheck,

    /// Actions available to the caller right now.
    pub capabilities: Capabilities,
}

impl TransactionView {
    /// Build the view of `tx` for a caller acting as `role` at `now`.
    pub fn for_caller(tx: &Transaction, role: Role, now: DateTime<Utc>) -> Self {
        let expiration = policy::expiration::evaluate(tx, now);
        let capabilities = policy::authorization::capabilities(tx, role, &expiration, now);
        let visible_location = policy::disclosure::visible_location(tx);

        Self {
            transaction_id: tx.transaction_id.clone(),
            status: tx.status,
            caller_role: role,
            provider: tx.provider.clone(),
            requester: tx.requester.clone(),
            offer: tx.offer.clone(),
            proposed_times: tx
                .proposed_times
                .iter()
                .copied()
                .filter(|t| *t > now)
                .collect(),
            proposed_by: tx.proposed_by,
            confirmed_time: tx.confirmed_time,
            visible_location,
            requester_confirmed: tx.requester_confirmed,
            provider_confirmed: tx.provider_confirmed,
            cancel_reason: tx.cancel_reason.clone(),
            created_at: tx.created_at,
            expires_at: tx.expires_at,
            expiration,
            capabilities,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn make_tx() -> Transaction {
        let mut tx = Transaction::new(
            "txn-001",
            Party::new("user-p", "Paula"),
            Party::new("user-r", "Rami"),
            OfferRef::new("offer-1", "Drill", "used"),
            Some("Kreuzberg".to_string()),
            Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
        );
        tx.exact_address = Some("Oranienstr. 12".to_string());
        tx
    }

    #[test]
    fn test_serialized_view_never_contains_raw_address_field() {
        let tx = make_tx();
        let view = TransactionView::for_caller(&tx, Role::Requester, tx.created_at);

        let json = serde_json::to_value(&view).unwrap();
        assert!(json.get("exact_address").is_none());
        // Pending: disclosure grants district only, so the address string
        // appears nowhere in the payload.
        assert!(!json.to_string().contains("Oranienstr"));
        assert_eq!(json["visible_location"]["kind"], "district");
    }

    #[test]
    fn test_view_filters_past_dated_proposals() {
        let mut tx = make_tx();
        let past = tx.created_at + chrono::Duration::days(1);
        let future = tx.created_at + chrono::Duration::days(3);
        tx.proposed_times = vec![past, future];

        let now = tx.created_at + chrono::Duration::days(2);
        let view = TransactionView::for_caller(&tx, Role::Requester, now);
        assert_eq!(view.proposed_times, vec![future]);
        // The stored record keeps both; only the view is filtered.
        assert_eq!(tx.proposed_times.len(), 2);

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["proposed_times"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_view_upgrades_to_exact_after_confirmation() {
        let mut tx = make_tx();
        tx.status = TransactionStatus::TimeConfirmed;
        tx.confirmed_time = Some(tx.created_at + chrono::Duration::days(1));

        let view = TransactionView::for_caller(&tx, Role::Requester, tx.created_at);
        assert_eq!(
            view.visible_location,
            VisibleLocation::Exact("Oranienstr. 12".to_string())
        );
    }
}
