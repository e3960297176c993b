//! The transaction record: the unit of handover coordination.
//!
//! A [`Transaction`] tracks the negotiation between a provider and a
//! requester from initial interest through meeting-time agreement,
//! mutual handover confirmation, and settlement. The record itself is
//! plain data; all transition rules live in the engine crate.
//!
//! Note that this struct is the *stored* representation and includes the
//! confidential `exact_address` field. It must never be serialized
//! directly to a caller; the engine's view type applies the disclosure
//! policy first.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;
use crate::offer::OfferRef;
use crate::party::{Party, Role};

/// Maximum number of candidate meeting times kept on a transaction.
/// Older unselected entries are dropped first when the cap is hit.
pub const MAX_PROPOSED_TIMES: usize = 5;

/// How long a transaction may sit in `pending` before it expires.
pub const PENDING_TTL_DAYS: i64 = 7;

/// Width of the "expiring soon" warning window before the pending cutoff.
pub const EXPIRY_WARNING_HOURS: i64 = 24;

/// Grace period after the confirmed meeting time during which the parties
/// may still confirm the handover.
pub const HANDOVER_GRACE_HOURS: i64 = 24;

/// Lifecycle status of a transaction.
///
/// Terminal statuses (`completed`, `cancelled`, `expired`) accept no
/// further transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    /// Created, meeting time not yet agreed. Expires 7 days after
    /// creation if no time is confirmed.
    Pending,

    /// Both sides agreed on a meeting time. The exact address becomes
    /// visible to the requester. Expires 24 hours after the confirmed
    /// time if the handover is not confirmed by both sides.
    TimeConfirmed,

    /// Both parties attested the handover occurred. Terminal; settlement
    /// has been signalled.
    Completed,

    /// Either party cancelled before completion. Terminal.
    Cancelled,

    /// Timed out per the expiration policy. Terminal.
    Expired,
}

impl TransactionStatus {
    /// Returns true if this is a terminal status (no further transitions).
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TransactionStatus::Completed | TransactionStatus::Cancelled | TransactionStatus::Expired
        )
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionStatus::Pending => write!(f, "pending"),
            TransactionStatus::TimeConfirmed => write!(f, "time_confirmed"),
            TransactionStatus::Completed => write!(f, "completed"),
            TransactionStatus::Cancelled => write!(f, "cancelled"),
            TransactionStatus::Expired => write!(f, "expired"),
        }
    }
}

impl FromStr for TransactionStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TransactionStatus::Pending),
            "time_confirmed" => Ok(TransactionStatus::TimeConfirmed),
            "completed" => Ok(TransactionStatus::Completed),
            "cancelled" => Ok(TransactionStatus::Cancelled),
            "expired" => Ok(TransactionStatus::Expired),
            other => Err(Error::ParseError(format!(
                "unknown transaction status: {}",
                other
            ))),
        }
    }
}

/// Stored state of a single handover transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    /// Opaque unique identifier.
    pub transaction_id: String,

    /// Current lifecycle status.
    pub status: TransactionStatus,

    /// The party handing the item over. Fixed at creation.
    pub provider: Party,

    /// The party receiving the item. Fixed at creation.
    pub requester: Party,

    /// Snapshot of the item being exchanged.
    pub offer: OfferRef,

    /// Candidate meeting times, chronologically ordered, capped at
    /// [`MAX_PROPOSED_TIMES`]. Immutable once a time is confirmed.
    pub proposed_times: Vec<DateTime<Utc>>,

    /// Which side authored the most recent proposal set. A party may not
    /// confirm a time it proposed itself.
    pub proposed_by: Option<Role>,

    /// The agreed meeting time. Set exactly once, on time confirmation.
    pub confirmed_time: Option<DateTime<Utc>>,

    /// Coarse location, visible from creation onwards.
    pub location_district: Option<String>,

    /// Fine-grained location. Editable only by the provider, disclosed
    /// only once a time is confirmed. Never serialized to callers as-is.
    pub exact_address: Option<String>,

    /// The requester's attestation that the handover occurred.
    /// Forward-only: once true it is never reset.
    pub requester_confirmed: bool,

    /// The provider's attestation that the handover occurred.
    /// Forward-only: once true it is never reset.
    pub provider_confirmed: bool,

    /// Optional reason recorded on cancellation, kept for history.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancel_reason: Option<String>,

    /// Creation instant.
    pub created_at: DateTime<Utc>,

    /// Pending-phase cutoff, fixed at creation to `created_at + 7d`.
    pub expires_at: DateTime<Utc>,
}

impl Transaction {
    /// Create a new transaction in `pending` status.
    pub fn new(
        transaction_id: &str,
        provider: Party,
        requester: Party,
        offer: OfferRef,
        location_district: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            transaction_id: transaction_id.to_string(),
            status: TransactionStatus::Pending,
            provider,
            requester,
            offer,
            proposed_times: Vec::new(),
            proposed_by: None,
            confirmed_time: None,
            location_district,
            exact_address: None,
            requester_confirmed: false,
            provider_confirmed: false,
            cancel_reason: None,
            created_at,
            expires_at: created_at + Duration::days(PENDING_TTL_DAYS),
        }
    }

    /// The role a user plays in this transaction, if any.
    pub fn role_of(&self, user_id: &str) -> Option<Role> {
        if self.provider.user_id == user_id {
            Some(Role::Provider)
        } else if self.requester.user_id == user_id {
            Some(Role::Requester)
        } else {
            None
        }
    }

    /// The party record for a role.
    pub fn party(&self, role: Role) -> &Party {
        match role {
            Role::Provider => &self.provider,
            Role::Requester => &self.requester,
        }
    }

    /// Whether the given role has confirmed the handover.
    pub fn confirmed(&self, role: Role) -> bool {
        match role {
            Role::Provider => self.provider_confirmed,
            Role::Requester => self.requester_confirmed,
        }
    }

    /// Whether both sides have confirmed the handover.
    pub fn both_confirmed(&self) -> bool {
        self.provider_confirmed && self.requester_confirmed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn make_transaction() -> Transaction {
        Transaction::new(
            "txn-001",
            Party::new("user-p", "Paula"),
            Party::new("user-r", "Rami"),
            OfferRef::new("offer-9", "The Dispossessed", "good"),
            Some("Kreuzberg".to_string()),
            Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
        )
    }

    #[test]
    fn test_new_transaction_defaults() {
        let tx = make_transaction();
        assert_eq!(tx.status, TransactionStatus::Pending);
        assert!(tx.proposed_times.is_empty());
        assert!(tx.confirmed_time.is_none());
        assert!(!tx.both_confirmed());
        assert_eq!(tx.expires_at - tx.created_at, Duration::days(7));
    }

    #[test]
    fn test_role_of() {
        let tx = make_transaction();
        assert_eq!(tx.role_of("user-p"), Some(Role::Provider));
        assert_eq!(tx.role_of("user-r"), Some(Role::Requester));
        assert_eq!(tx.role_of("user-x"), None);
    }

    #[test]
    fn test_status_round_trip() {
        for status in [
            TransactionStatus::Pending,
            TransactionStatus::TimeConfirmed,
            TransactionStatus::Completed,
            TransactionStatus::Cancelled,
            TransactionStatus::Expired,
        ] {
            assert_eq!(
                status.to_string().parse::<TransactionStatus>().unwrap(),
                status
            );
        }
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let json = serde_json::to_value(TransactionStatus::TimeConfirmed).unwrap();
        assert_eq!(json, serde_json::json!("time_confirmed"));
        let back: TransactionStatus = serde_json::from_value(json).unwrap();
        assert_eq!(back, TransactionStatus::TimeConfirmed);
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(!TransactionStatus::Pending.is_terminal());
        assert!(!TransactionStatus::TimeConfirmed.is_terminal());
        assert!(TransactionStatus::Completed.is_terminal());
        assert!(TransactionStatus::Cancelled.is_terminal());
        assert!(TransactionStatus::Expired.is_terminal());
    }
}
