//! Expiration policy: decides whether a transaction has timed out.
//!
//! Two clocks govern a transaction's life. A `pending` transaction must
//! reach time confirmation within 7 days of creation. Once a meeting time
//! is confirmed, both parties have a 24-hour grace window after that time
//! to confirm the handover. The same rule is applied on every read and by
//! the background sweep, so client-observed and sweep-applied expiration
//! never disagree.

use chrono::{DateTime, Duration, Utc};
use handover_core::transaction::{EXPIRY_WARNING_HOURS, HANDOVER_GRACE_HOURS};
use handover_core::{Transaction, TransactionStatus};
use serde::{Deserialize, Serialize};

/// Why a transaction is considered expired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpirationReason {
    /// Not expired.
    None,

    /// No meeting time was confirmed within 7 days of creation.
    PendingExpired,

    /// The handover was not confirmed by both sides within 24 hours of
    /// the confirmed meeting time.
    MeetingExpired,
}

/// Non-terminal warning, distinct from an actual expiration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Advisory {
    /// Nothing to warn about.
    None,

    /// Inside the final 24 hours before the pending cutoff.
    ExpiringSoon,

    /// The confirmed meeting time has passed but the grace window to
    /// confirm the handover has not.
    MeetingPast,
}

/// Result of evaluating the expiration policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpirationCheck {
    /// Whether the transaction is past a hard cutoff.
    pub is_expired: bool,

    /// Which cutoff was crossed.
    pub reason: ExpirationReason,

    /// Soft warning for callers, never terminal on its own.
    pub advisory: Advisory,
}

impl ExpirationCheck {
    /// A live transaction with nothing to report.
    pub fn live() -> Self {
        Self {
            is_expired: false,
            reason: ExpirationReason::None,
            advisory: Advisory::None,
        }
    }
}

/// Evaluate the expiration policy for a transaction at `now`.
///
/// Pure function of the record and the supplied instant; re-evaluated on
/// every read. An already-`expired` record reports itself expired
/// (idempotent), so repeated sweeps and late reads agree.
pub fn evaluate(tx: &Transaction, now: DateTime<Utc>) -> ExpirationCheck {
    match tx.status {
        TransactionStatus::Expired => ExpirationCheck {
            is_expired: true,
            reason: ExpirationReason::PendingExpired,
            advisory: Advisory::None,
        },

        TransactionStatus::Pending => {
            if now > tx.expires_at {
                ExpirationCheck {
                    is_expired: true,
                    reason: ExpirationReason::PendingExpired,
                    advisory: Advisory::None,
                }
            } else if now > tx.expires_at - Duration::hours(EXPIRY_WARNING_HOURS) {
                ExpirationCheck {
                    is_expired: false,
                    reason: ExpirationReason::None,
                    advisory: Advisory::ExpiringSoon,
                }
            } else {
                ExpirationCheck::live()
            }
        }

        TransactionStatus::TimeConfirmed if !tx.both_confirmed() => {
            // confirmed_time is always set in this status; treat a missing
            // value as the creation instant rather than panicking.
            let meeting = tx.confirmed_time.unwrap_or(tx.created_at);
            if now > meeting + Duration::hours(HANDOVER_GRACE_HOURS) {
                ExpirationCheck {
                    is_expired: true,
                    reason: ExpirationReason::MeetingExpired,
                    advisory: Advisory::None,
                }
            } else if now > meeting {
                ExpirationCheck {
                    is_expired: false,
                    reason: ExpirationReason::None,
                    advisory: Advisory::MeetingPast,
                }
            } else {
                ExpirationCheck::live()
            }
        }

        _ => ExpirationCheck::live(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use handover_core::{OfferRef, Party};

    fn base_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    fn make_tx() -> Transaction {
        Transaction::new(
            "txn-001",
            Party::new("user-p", "Paula"),
            Party::new("user-r", "Rami"),
            OfferRef::new("offer-1", "Drill", "used"),
            None,
            base_time(),
        )
    }

    #[test]
    fn test_fresh_pending_is_live() {
        let tx = make_tx();
        let check = evaluate(&tx, base_time() + Duration::days(1));
        assert_eq!(check, ExpirationCheck::live());
    }

    #[test]
    fn test_pending_boundary() {
        let tx = make_tx();
        let cutoff = base_time() + Duration::days(7);

        let before = evaluate(&tx, cutoff - Duration::seconds(1));
        assert!(!before.is_expired);

        let after = evaluate(&tx, cutoff + Duration::seconds(1));
        assert!(after.is_expired);
        assert_eq!(after.reason, ExpirationReason::PendingExpired);
    }

    #[test]
    fn test_pending_warning_window() {
        let tx = make_tx();
        let check = evaluate(&tx, base_time() + Duration::days(6) + Duration::hours(1));
        assert!(!check.is_expired);
        assert_eq!(check.advisory, Advisory::ExpiringSoon);

        // Just before the window opens there is no advisory.
        let check = evaluate(&tx, base_time() + Duration::days(6) - Duration::hours(1));
        assert_eq!(check.advisory, Advisory::None);
    }

    #[test]
    fn test_meeting_grace_boundary() {
        let mut tx = make_tx();
        let meeting = base_time() + Duration::days(2);
        tx.status = TransactionStatus::TimeConfirmed;
        tx.confirmed_time = Some(meeting);

        let before = evaluate(&tx, meeting + Duration::hours(24) - Duration::seconds(1));
        assert!(!before.is_expired);
        assert_eq!(before.advisory, Advisory::MeetingPast);

        let after = evaluate(&tx, meeting + Duration::hours(24) + Duration::seconds(1));
        assert!(after.is_expired);
        assert_eq!(after.reason, ExpirationReason::MeetingExpired);
    }

    #[test]
    fn test_meeting_not_yet_past() {
        let mut tx = make_tx();
        let meeting = base_time() + Duration::days(2);
        tx.status = TransactionStatus::TimeConfirmed;
        tx.confirmed_time = Some(meeting);

        let check = evaluate(&tx, meeting - Duration::hours(1));
        assert_eq!(check, ExpirationCheck::live());
    }

    #[test]
    fn test_both_confirmed_never_meeting_expires() {
        let mut tx = make_tx();
        tx.status = TransactionStatus::TimeConfirmed;
        tx.confirmed_time = Some(base_time());
        tx.provider_confirmed = true;
        tx.requester_confirmed = true;

        let check = evaluate(&tx, base_time() + Duration::days(30));
        assert!(!check.is_expired);
    }

    #[test]
    fn test_expired_status_is_idempotent() {
        let mut tx = make_tx();
        tx.status = TransactionStatus::Expired;

        let check = evaluate(&tx, base_time());
        assert!(check.is_expired);
        assert_eq!(check.reason, ExpirationReason::PendingExpired);
    }

    #[test]
    fn test_terminal_statuses_are_live() {
        for status in [TransactionStatus::Completed, TransactionStatus::Cancelled] {
            let mut tx = make_tx();
            tx.status = status;
            let check = evaluate(&tx, base_time() + Duration::days(365));
            assert!(!check.is_expired);
        }
    }
}
