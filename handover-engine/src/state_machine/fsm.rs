//! Transaction finite state machine.
//!
//! Formal state machine modeling the lifecycle of a handover transaction
//! from creation through time agreement and mutual handover confirmation
//! to settlement. Each transition is driven by a party action (or the
//! system expiration sweep) and validated against the current status, the
//! caller's role, and the expiration policy before anything is mutated.
//!
//! # States
//!
//! ```text
//!                       propose_time (either side, list capped at 5)
//!                          ┌────┐
//!                          │    │
//!                          ▼    │
//!                     ┌──────────────┐
//!        create ─────▶│   Pending    │────────────┐
//!                     └──────┬───────┘            │
//!                            │ confirm_time       │ cancel /
//!                            │ (counterpart of    │ expire (7d)
//!                            │  last proposer,    │
//!                            │  future slot only) │
//!                            ▼                    ▼
//!                     ┌───────────────┐    ┌─────────────────────┐
//!                     │ TimeConfirmed │───▶│ Cancelled / Expired │
//!                     └──────┬────────┘    └─────────────────────┘
//!                            │ confirm_handover      cancel /
//!                            │ (second flag)         expire (24h grace)
//!                            ▼
//!                     ┌──────────────┐
//!                     │  Completed   │  + SettlementEvent, exactly once
//!                     └──────────────┘
//! ```
//!
//! The FSM is pure logic: it operates on an owned [`Transaction`] copy
//! and either returns a [`Transition`] with the record fully updated, or
//! an error with the record untouched (validation precedes all mutation,
//! so there are no partial writes). Persistence, event publication, and
//! the optimistic-concurrency write are the engine's job.

use chrono::{DateTime, Utc};
use handover_core::transaction::MAX_PROPOSED_TIMES;
use handover_core::{Role, Transaction, TransactionStatus};
use std::fmt;
use tracing::debug;

use crate::error::{Error, Result};
use crate::policy::expiration::ExpirationCheck;
use crate::state_machine::consensus::{self, ConsensusOutcome, SettlementEvent};

/// Who is attempting an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    /// One of the two transaction parties.
    Party(Role),

    /// The expiration sweep. May only apply the `expire` transition.
    System,
}

/// An action that can drive a state transition.
#[derive(Debug, Clone)]
pub enum Action {
    /// Suggest candidate meeting times.
    ProposeTime {
        /// Candidate times to add.
        times: Vec<DateTime<Utc>>,
    },

    /// Accept one of the proposed times.
    ConfirmTime {
        /// The candidate being accepted.
        selected_time: DateTime<Utc>,
    },

    /// Attest that the handover occurred.
    ConfirmHandover,

    /// Abort the transaction.
    Cancel {
        /// Optional reason, kept for history.
        reason: Option<String>,
    },

    /// Set or correct the exact meeting address.
    UpdateAddress {
        /// The new address. Payload validation happens before the FSM.
        address: String,
    },

    /// Terminal timeout, applied by the sweep or lazily on read.
    Expire,
}

impl Action {
    /// Short operation name, used in errors and logs.
    pub fn name(&self) -> &'static str {
        match self {
            Action::ProposeTime { .. } => "propose_time",
            Action::ConfirmTime { .. } => "confirm_time",
            Action::ConfirmHandover => "confirm_handover",
            Action::Cancel { .. } => "cancel",
            Action::UpdateAddress { .. } => "update_address",
            Action::Expire => "expire",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// The outcome of applying an action.
#[derive(Debug, Clone)]
pub struct Transition {
    /// The status before the transition.
    pub from_status: TransactionStatus,

    /// The status after the transition. Equal to `from_status` for
    /// actions that mutate the record without moving it (propose, first
    /// handover confirmation, address edit) and for idempotent replays.
    pub to_status: TransactionStatus,

    /// Settlement signal, present exactly when this transition completed
    /// the transaction.
    pub settlement: Option<SettlementEvent>,
}

impl Transition {
    fn stay(status: TransactionStatus) -> Self {
        Self {
            from_status: status,
            to_status: status,
            settlement: None,
        }
    }
}

/// Pure state machine for handover transactions.
pub struct HandoverFsm;

impl HandoverFsm {
    /// Apply an action to a transaction, producing a state transition.
    ///
    /// `expiration` must be the policy result for the same `now`; the
    /// engine evaluates it immediately before calling in. On error the
    /// transaction is left exactly as it was.
    pub fn apply(
        tx: &mut Transaction,
        actor: Actor,
        action: Action,
        expiration: &ExpirationCheck,
        now: DateTime<Utc>,
    ) -> Result<Transition> {
        let from_status = tx.status;

        // Replay tolerance: a duplicated handover confirmation from a
        // party whose flag is already set is a no-op even after the
        // transaction completed, so at-least-once transports never see an
        // error for a retry that already took effect.
        if let (Action::ConfirmHandover, Actor::Party(role)) = (&action, actor) {
            if from_status == TransactionStatus::Completed && tx.confirmed(role) {
                return Ok(Transition::stay(TransactionStatus::Completed));
            }
        }

        // Terminal statuses accept no further actions, system or party.
        if from_status.is_terminal() {
            return Err(Error::InvalidTransition {
                action: action.name(),
                status: from_status,
            });
        }

        let role = match actor {
            Actor::Party(role) => {
                // A record past its cutoff behaves as expired even before
                // the sweep terminalizes it: every party action is an
                // invalid transition, same as after the sweep.
                if expiration.is_expired {
                    return Err(Error::InvalidTransition {
                        action: action.name(),
                        status: from_status,
                    });
                }
                if matches!(action, Action::Expire) {
                    return Err(Error::Unauthorized(
                        "only the system may expire a transaction".to_string(),
                    ));
                }
                Some(role)
            }
            Actor::System => {
                if !matches!(action, Action::Expire) {
                    return Err(Error::Unauthorized(
                        "system actor may only expire".to_string(),
                    ));
                }
                None
            }
        };

        let transition = match action {
            Action::ProposeTime { times } => Self::propose_time(tx, role, times),
            Action::ConfirmTime { selected_time } => {
                Self::confirm_time(tx, role, selected_time, now)
            }
            Action::ConfirmHandover => Self::confirm_handover(tx, role),
            Action::Cancel { reason } => Self::cancel(tx, reason),
            Action::UpdateAddress { address } => Self::update_address(tx, role, address),
            Action::Expire => {
                // The terminal transition is only valid once the policy
                // says the cutoff is crossed; a live record cannot be
                // expired, not even by the system.
                if !expiration.is_expired {
                    return Err(Error::InvalidTransition {
                        action: "expire",
                        status: from_status,
                    });
                }
                tx.status = TransactionStatus::Expired;
                Ok(Transition {
                    from_status,
                    to_status: TransactionStatus::Expired,
                    settlement: None,
                })
            }
        }?;

        if transition.from_status != transition.to_status {
            debug!(
                transaction_id = %tx.transaction_id,
                from = %transition.from_status,
                to = %transition.to_status,
                "applied {}",
                transition_actor_label(actor),
            );
        }

        Ok(transition)
    }

    fn propose_time(
        tx: &mut Transaction,
        role: Option<Role>,
        times: Vec<DateTime<Utc>>,
    ) -> Result<Transition> {
        if tx.status != TransactionStatus::Pending {
            return Err(Error::InvalidTransition {
                action: "propose_time",
                status: tx.status,
            });
        }

        // Either side may propose. The merged list is normalized:
        // deduplicated, chronologically sorted, capped at 5 with the
        // oldest unselected entries dropped first.
        tx.proposed_times.extend(times);
        tx.proposed_times.sort_unstable();
        tx.proposed_times.dedup();
        let overflow = tx.proposed_times.len().saturating_sub(MAX_PROPOSED_TIMES);
        if overflow > 0 {
            tx.proposed_times.drain(..overflow);
        }
        tx.proposed_by = role;

        Ok(Transition::stay(TransactionStatus::Pending))
    }

    fn confirm_time(
        tx: &mut Transaction,
        role: Option<Role>,
        selected_time: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<Transition> {
        if tx.status != TransactionStatus::Pending || tx.proposed_times.is_empty() {
            return Err(Error::InvalidTransition {
                action: "confirm_time",
                status: tx.status,
            });
        }

        // A side may not confirm its own proposal; agreement requires the
        // counterpart to accept.
        if tx.proposed_by == role {
            return Err(Error::Unauthorized(
                "cannot confirm a time proposed by yourself".to_string(),
            ));
        }

        if !tx.proposed_times.contains(&selected_time) {
            return Err(Error::InvalidTransition {
                action: "confirm_time",
                status: tx.status,
            });
        }

        // Proposal latency: the slot may have slipped into the past since
        // it was suggested.
        if selected_time <= now {
            return Err(Error::StaleProposal);
        }

        tx.confirmed_time = Some(selected_time);
        tx.status = TransactionStatus::TimeConfirmed;

        Ok(Transition {
            from_status: TransactionStatus::Pending,
            to_status: TransactionStatus::TimeConfirmed,
            settlement: None,
        })
    }

    fn confirm_handover(tx: &mut Transaction, role: Option<Role>) -> Result<Transition> {
        if tx.status != TransactionStatus::TimeConfirmed {
            return Err(Error::InvalidTransition {
                action: "confirm_handover",
                status: tx.status,
            });
        }

        let role = role.ok_or_else(|| {
            Error::Unauthorized("handover confirmation requires a party".to_string())
        })?;

        match consensus::record_confirmation(tx, role) {
            ConsensusOutcome::AlreadyConfirmed | ConsensusOutcome::AwaitingCounterpart => {
                Ok(Transition::stay(TransactionStatus::TimeConfirmed))
            }
            ConsensusOutcome::SettlementReady => {
                tx.status = TransactionStatus::Completed;
                Ok(Transition {
                    from_status: TransactionStatus::TimeConfirmed,
                    to_status: TransactionStatus::Completed,
                    settlement: Some(SettlementEvent::for_transaction(tx)),
                })
            }
        }
    }

    fn cancel(tx: &mut Transaction, reason: Option<String>) -> Result<Transition> {
        // Any non-terminal status may be cancelled unilaterally.
        let from_status = tx.status;
        tx.status = TransactionStatus::Cancelled;
        tx.cancel_reason = reason;

        Ok(Transition {
            from_status,
            to_status: TransactionStatus::Cancelled,
            settlement: None,
        })
    }

    fn update_address(
        tx: &mut Transaction,
        role: Option<Role>,
        address: String,
    ) -> Result<Transition> {
        if role != Some(Role::Provider) {
            return Err(Error::Unauthorized(
                "only the provider may edit the address".to_string(),
            ));
        }

        // Once both confirmations are in, the record is immutable apart
        // from the completion transition itself.
        if tx.both_confirmed() {
            return Err(Error::InvalidTransition {
                action: "update_address",
                status: tx.status,
            });
        }

        tx.exact_address = Some(address);
        Ok(Transition::stay(tx.status))
    }

    /// Names of the actions a party could validly attempt in a status.
    /// Informational, for diagnostics and UI affordances; the
    /// authorization gate is the authoritative per-caller answer.
    pub fn valid_actions(status: TransactionStatus) -> Vec<&'static str> {
        match status {
            TransactionStatus::Pending => vec![
                "propose_time",
                "confirm_time",
                "cancel",
                "update_address",
                "expire",
            ],
            TransactionStatus::TimeConfirmed => {
                vec!["confirm_handover", "cancel", "update_address", "expire"]
            }
            TransactionStatus::Completed
            | TransactionStatus::Cancelled
            | TransactionStatus::Expired => vec![],
        }
    }
}

fn transition_actor_label(actor: Actor) -> &'static str {
    match actor {
        Actor::Party(Role::Provider) => "provider action",
        Actor::Party(Role::Requester) => "requester action",
        Actor::System => "system action",
    }
}
