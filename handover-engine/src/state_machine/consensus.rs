//! Handover consensus tracking.
//!
//! Both parties attest independently that the physical handover occurred.
//! The tracker flips the caller's flag and signals settlement-readiness
//! exactly once, at the transition where the second flag becomes true.
//! A repeated confirmation from a party whose flag is already set is a
//! no-op rather than an error, so at-least-once transports can replay
//! safely without double-settling.

use handover_core::{Role, Transaction};
use serde::{Deserialize, Serialize};

/// Outbound settlement signal, consumed by the external credit ledger.
/// The engine emits it; it never executes the ledger write itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementEvent {
    /// The completed transaction.
    pub transaction_id: String,

    /// Catalog reference of the exchanged item.
    pub item_reference: String,

    /// User id of the party receiving the credit. Always the provider.
    pub credited_party: String,
}

impl SettlementEvent {
    /// Build the settlement payload for a transaction.
    pub fn for_transaction(tx: &Transaction) -> Self {
        Self {
            transaction_id: tx.transaction_id.clone(),
            item_reference: tx.offer.offer_id.clone(),
            credited_party: tx.provider.user_id.clone(),
        }
    }
}

/// Result of recording one party's handover confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsensusOutcome {
    /// The caller's flag was already true; nothing changed.
    AlreadyConfirmed,

    /// The caller's flag is now true; waiting for the counterpart.
    AwaitingCounterpart,

    /// Both flags are now true; settlement should be signalled.
    SettlementReady,
}

/// Record `role`'s confirmation on the transaction.
///
/// Flags move forward only; no call path ever resets one.
pub fn record_confirmation(tx: &mut Transaction, role: Role) -> ConsensusOutcome {
    if tx.confirmed(role) {
        return ConsensusOutcome::AlreadyConfirmed;
    }

    match role {
        Role::Provider => tx.provider_confirmed = true,
        Role::Requester => tx.requester_confirmed = true,
    }

    if tx.both_confirmed() {
        ConsensusOutcome::SettlementReady
    } else {
        ConsensusOutcome::AwaitingCounterpart
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use handover_core::{OfferRef, Party};

    fn make_tx() -> Transaction {
        Transaction::new(
            "txn-001",
            Party::new("user-p", "Paula"),
            Party::new("user-r", "Rami"),
            OfferRef::new("offer-1", "Drill", "used"),
            None,
            Utc::now(),
        )
    }

    #[test]
    fn test_second_confirmation_reaches_consensus_either_order() {
        for (first, second) in [
            (Role::Provider, Role::Requester),
            (Role::Requester, Role::Provider),
        ] {
            let mut tx = make_tx();
            assert_eq!(
                record_confirmation(&mut tx, first),
                ConsensusOutcome::AwaitingCounterpart
            );
            assert_eq!(
                record_confirmation(&mut tx, second),
                ConsensusOutcome::SettlementReady
            );
            assert!(tx.both_confirmed());
        }
    }

    #[test]
    fn test_replay_is_noop() {
        let mut tx = make_tx();
        record_confirmation(&mut tx, Role::Requester);
        assert_eq!(
            record_confirmation(&mut tx, Role::Requester),
            ConsensusOutcome::AlreadyConfirmed
        );
        assert!(!tx.provider_confirmed);
        assert!(tx.requester_confirmed);
    }

    #[test]
    fn test_settlement_payload() {
        let tx = make_tx();
        let event = SettlementEvent::for_transaction(&tx);
        assert_eq!(event.transaction_id, "txn-001");
        assert_eq!(event.item_reference, "offer-1");
        assert_eq!(event.credited_party, "user-p");
    }
}
