//! Authorization gate: which actions a party may take right now.
//!
//! Computed once per engine operation and attached to every response, so
//! no client ever re-derives permission logic on its own. The flags are
//! a pure function of the record, the caller's role, and the expiration
//! result; they are recomputed on every read and never persisted.

use chrono::{DateTime, Utc};
use handover_core::{Role, Transaction, TransactionStatus};
use serde::{Deserialize, Serialize};

use crate::policy::expiration::{ExpirationCheck, ExpirationReason};

/// The set of actions available to a caller on a transaction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    /// May suggest candidate meeting times.
    pub can_propose_time: bool,

    /// May accept one of the proposed times.
    pub can_confirm_time: bool,

    /// May attest that the handover occurred.
    pub can_confirm_handover: bool,

    /// May cancel the transaction unilaterally.
    pub can_cancel: bool,

    /// May set or correct the exact meeting address.
    pub can_edit_address: bool,
}

impl Capabilities {
    /// No actions available. Used for terminal and expired records.
    pub fn none() -> Self {
        Self::default()
    }
}

/// Compute the capability set for `role` on `tx` at `now`.
///
/// `expiration` must come from the same evaluation instant as `now`; the
/// engine computes both together so the flags and the advisory can never
/// disagree.
pub fn capabilities(
    tx: &Transaction,
    role: Role,
    expiration: &ExpirationCheck,
    now: DateTime<Utc>,
) -> Capabilities {
    let live = !expiration.is_expired;
    let pending = tx.status == TransactionStatus::Pending;
    let time_confirmed = tx.status == TransactionStatus::TimeConfirmed;

    // A proposal can only be accepted by the side that did not author it,
    // and only if at least one candidate is still in the future.
    let has_future_candidate = tx.proposed_times.iter().any(|t| *t > now);
    let counterpart_proposed = tx
        .proposed_by
        .map(|author| author != role)
        .unwrap_or(false);

    Capabilities {
        can_propose_time: pending && live,
        can_confirm_time: pending
            && live
            && !tx.proposed_times.is_empty()
            && counterpart_proposed
            && has_future_candidate,
        can_confirm_handover: time_confirmed
            && !tx.confirmed(role)
            && expiration.reason != ExpirationReason::MeetingExpired,
        can_cancel: (pending || time_confirmed) && live,
        // The flag tracks what the engine would accept: mutations on an
        // expired record fail, so the flag drops with expiration too.
        can_edit_address: role == Role::Provider
            && (pending || time_confirmed)
            && !tx.both_confirmed()
            && live,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::expiration;
    use chrono::{Duration, TimeZone};
    use handover_core::{OfferRef, Party};

    fn base_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    fn make_tx(status: TransactionStatus) -> Transaction {
        let mut tx = Transaction::new(
            "txn-001",
            Party::new("user-p", "Paula"),
            Party::new("user-r", "Rami"),
            OfferRef::new("offer-1", "Drill", "used"),
            None,
            base_time(),
        );
        tx.status = status;
        // Requester proposed one future time; provider is the confirmer.
        tx.proposed_times = vec![base_time() + Duration::days(2)];
        tx.proposed_by = Some(Role::Requester);
        if !matches!(status, TransactionStatus::Pending) {
            tx.confirmed_time = Some(base_time() + Duration::days(2));
        }
        tx
    }

    fn caps(tx: &Transaction, role: Role) -> Capabilities {
        let now = base_time() + Duration::hours(1);
        let check = expiration::evaluate(tx, now);
        capabilities(tx, role, &check, now)
    }

    /// Hand-enumerated truth table over the full (status, role) product,
    /// with a live record, a future proposal authored by the requester,
    /// and no handover confirmations.
    #[test]
    fn test_capability_truth_table() {
        use Role::*;
        use TransactionStatus::*;

        // (status, role, propose, confirm_time, confirm_handover, cancel, edit_address)
        let table = [
            (Pending, Provider, true, true, false, true, true),
            (Pending, Requester, true, false, false, true, false),
            (TimeConfirmed, Provider, false, false, true, true, true),
            (TimeConfirmed, Requester, false, false, true, true, false),
            (Completed, Provider, false, false, false, false, false),
            (Completed, Requester, false, false, false, false, false),
            (Cancelled, Provider, false, false, false, false, false),
            (Cancelled, Requester, false, false, false, false, false),
            (Expired, Provider, false, false, false, false, false),
            (Expired, Requester, false, false, false, false, false),
        ];

        for (status, role, propose, confirm_time, confirm_handover, cancel, edit) in table {
            let tx = make_tx(status);
            let got = caps(&tx, role);
            let want = Capabilities {
                can_propose_time: propose,
                can_confirm_time: confirm_time,
                can_confirm_handover: confirm_handover,
                can_cancel: cancel,
                can_edit_address: edit,
            };
            assert_eq!(got, want, "mismatch for ({}, {})", status, role);
        }
    }

    #[test]
    fn test_proposer_cannot_self_confirm() {
        let mut tx = make_tx(TransactionStatus::Pending);
        tx.proposed_by = Some(Role::Provider);
        assert!(!caps(&tx, Role::Provider).can_confirm_time);
        assert!(caps(&tx, Role::Requester).can_confirm_time);
    }

    #[test]
    fn test_no_future_candidate_blocks_confirm() {
        let mut tx = make_tx(TransactionStatus::Pending);
        tx.proposed_times = vec![base_time() - Duration::hours(1)];
        assert!(!caps(&tx, Role::Provider).can_confirm_time);
    }

    #[test]
    fn test_empty_proposals_block_confirm() {
        let mut tx = make_tx(TransactionStatus::Pending);
        tx.proposed_times.clear();
        tx.proposed_by = None;
        assert!(!caps(&tx, Role::Provider).can_confirm_time);
        assert!(caps(&tx, Role::Provider).can_propose_time);
    }

    #[test]
    fn test_own_flag_blocks_repeat_handover_confirm() {
        let mut tx = make_tx(TransactionStatus::TimeConfirmed);
        tx.provider_confirmed = true;
        assert!(!caps(&tx, Role::Provider).can_confirm_handover);
        assert!(caps(&tx, Role::Requester).can_confirm_handover);
    }

    #[test]
    fn test_meeting_expired_blocks_handover_confirm() {
        let mut tx = make_tx(TransactionStatus::TimeConfirmed);
        tx.confirmed_time = Some(base_time() - Duration::days(3));
        let now = base_time();
        let check = expiration::evaluate(&tx, now);
        let got = capabilities(&tx, Role::Requester, &check, now);
        assert!(!got.can_confirm_handover);
        assert!(!got.can_cancel);
    }

    #[test]
    fn test_pending_expired_drops_all_mutating_flags() {
        let tx = make_tx(TransactionStatus::Pending);
        let now = base_time() + Duration::days(8);
        let check = expiration::evaluate(&tx, now);
        let got = capabilities(&tx, Role::Provider, &check, now);
        assert_eq!(got, Capabilities::none());
    }

    #[test]
    fn test_both_confirmed_freezes_address() {
        let mut tx = make_tx(TransactionStatus::TimeConfirmed);
        tx.provider_confirmed = true;
        tx.requester_confirmed = true;
        assert!(!caps(&tx, Role::Provider).can_edit_address);
    }
}
