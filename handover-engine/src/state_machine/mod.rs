//! Transaction state machine and the engine operation surface.
//!
//! ## Sub-modules
//!
//! - [`fsm`]: the pure state machine with explicit statuses, transition
//!   rules, and the error taxonomy for rejected actions.
//! - [`consensus`]: the two-sided handover confirmation tracker that
//!   signals settlement exactly once.
//!
//! [`CoordinationEngine`] is the caller-facing surface. Every operation
//! is synchronous per action: load the record, evaluate expiration,
//! validate and apply the transition, write back with an optimistic
//! compare-and-swap, publish events, and return the recomputed
//! [`TransactionView`].

pub mod consensus;
pub mod fsm;

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use handover_core::request::{
    Cancel, ConfirmHandover, ConfirmTime, CreateTransaction, HandoverRequest, ProposeTime,
    UpdateAddress, Validate,
};
use handover_core::{Role, Transaction};

use crate::error::{Error, Result};
use crate::event::EventBus;
use crate::policy::expiration;
use crate::store::{InMemoryStore, TransactionStore};
use crate::view::TransactionView;
use fsm::{Action, Actor, HandoverFsm};

/// The coordination engine: single source of truth for handover
/// transactions.
///
/// Clones share the same store and event bus.
#[derive(Clone)]
pub struct CoordinationEngine {
    store: Arc<dyn TransactionStore>,
    events: Arc<EventBus>,
}

impl CoordinationEngine {
    /// Create an engine on an existing store and event bus.
    pub fn new(store: Arc<dyn TransactionStore>, events: Arc<EventBus>) -> Self {
        Self { store, events }
    }

    /// Create a self-contained engine on the in-memory store. Suitable
    /// for tests and single-process deployments.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryStore::new()), Arc::new(EventBus::new()))
    }

    /// The engine's event bus, for attaching subscribers.
    pub fn events(&self) -> &Arc<EventBus> {
        &self.events
    }

    /// The underlying store. Used by the expiration sweep.
    pub fn store(&self) -> &Arc<dyn TransactionStore> {
        &self.store
    }

    /// Open a new transaction in `pending` status. The returned view is
    /// built for the requester, whose interest action creates the record.
    pub async fn create_transaction(
        &self,
        request: CreateTransaction,
        now: DateTime<Utc>,
    ) -> Result<TransactionView> {
        request.validate()?;

        let transaction_id = Uuid::new_v4().to_string();
        let tx = Transaction::new(
            &transaction_id,
            request.provider,
            request.requester,
            request.offer,
            request.location_district,
            now,
        );

        self.store.insert(tx.clone()).await?;
        self.events.publish_created(transaction_id).await;

        Ok(TransactionView::for_caller(&tx, Role::Requester, now))
    }

    /// Propose candidate meeting times. Either party may propose while
    /// the transaction is `pending`.
    pub async fn propose_time(
        &self,
        request: ProposeTime,
        caller_id: &str,
        now: DateTime<Utc>,
    ) -> Result<TransactionView> {
        request.validate()?;
        self.mutate(
            &request.transaction_id,
            caller_id,
            Action::ProposeTime {
                times: request.times,
            },
            now,
        )
        .await
    }

    /// Accept one of the proposed times, moving the transaction to
    /// `time_confirmed` and disclosing the exact address.
    pub async fn confirm_time(
        &self,
        request: ConfirmTime,
        caller_id: &str,
        now: DateTime<Utc>,
    ) -> Result<TransactionView> {
        request.validate()?;
        self.mutate(
            &request.transaction_id,
            caller_id,
            Action::ConfirmTime {
                selected_time: request.selected_time,
            },
            now,
        )
        .await
    }

    /// Attest that the handover occurred. Completes the transaction and
    /// signals settlement when the second flag lands.
    pub async fn confirm_handover(
        &self,
        request: ConfirmHandover,
        caller_id: &str,
        now: DateTime<Utc>,
    ) -> Result<TransactionView> {
        request.validate()?;
        self.mutate(&request.transaction_id, caller_id, Action::ConfirmHandover, now)
            .await
    }

    /// Cancel the transaction unilaterally.
    pub async fn cancel_transaction(
        &self,
        request: Cancel,
        caller_id: &str,
        now: DateTime<Utc>,
    ) -> Result<TransactionView> {
        request.validate()?;
        self.mutate(
            &request.transaction_id,
            caller_id,
            Action::Cancel {
                reason: request.reason,
            },
            now,
        )
        .await
    }

    /// Set or correct the exact meeting address. Provider only.
    pub async fn update_address(
        &self,
        request: UpdateAddress,
        caller_id: &str,
        now: DateTime<Utc>,
    ) -> Result<TransactionView> {
        request.validate()?;
        self.mutate(
            &request.transaction_id,
            caller_id,
            Action::UpdateAddress {
                address: request.address,
            },
            now,
        )
        .await
    }

    /// Route a tagged request to the matching operation. Transports that
    /// expose a single endpoint deserialize into [`HandoverRequest`] and
    /// call this instead of the typed methods.
    ///
    /// Creation is only accepted from the requester, whose interest
    /// action opens the record.
    pub async fn dispatch(
        &self,
        request: HandoverRequest,
        caller_id: &str,
        now: DateTime<Utc>,
    ) -> Result<TransactionView> {
        match request {
            HandoverRequest::Create(r) => {
                if r.requester.user_id != caller_id {
                    return Err(Error::Unauthorized(
                        "a transaction is created by its requester".to_string(),
                    ));
                }
                self.create_transaction(r, now).await
            }
            HandoverRequest::ProposeTime(r) => self.propose_time(r, caller_id, now).await,
            HandoverRequest::ConfirmTime(r) => self.confirm_time(r, caller_id, now).await,
            HandoverRequest::ConfirmHandover(r) => self.confirm_handover(r, caller_id, now).await,
            HandoverRequest::Cancel(r) => self.cancel_transaction(r, caller_id, now).await,
            HandoverRequest::UpdateAddress(r) => self.update_address(r, caller_id, now).await,
        }
    }

    /// Read a transaction as the calling party. Pure: recomputes
    /// disclosure, capabilities, and expiration without writing.
    pub async fn get_transaction(
        &self,
        transaction_id: &str,
        caller_id: &str,
        now: DateTime<Utc>,
    ) -> Result<TransactionView> {
        let loaded = self.store.fetch(transaction_id).await?;
        let role = Self::role_for(&loaded.transaction, caller_id)?;
        Ok(TransactionView::for_caller(&loaded.transaction, role, now))
    }

    /// Apply the terminal `expired` transition if the expiration policy
    /// says the record is past its cutoff. Returns whether a transition
    /// was applied. Used by the sweep; callers racing a party action lose
    /// the compare-and-swap and may simply retry on the next pass.
    pub async fn expire_transaction(
        &self,
        transaction_id: &str,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        let loaded = self.store.fetch(transaction_id).await?;
        let mut tx = loaded.transaction;

        if tx.status.is_terminal() {
            return Ok(false);
        }

        let check = expiration::evaluate(&tx, now);
        if !check.is_expired {
            return Ok(false);
        }

        let transition = HandoverFsm::apply(&mut tx, Actor::System, Action::Expire, &check, now)?;
        self.store.update(loaded.version, tx.clone()).await?;

        self.events
            .publish_status_changed(
                tx.transaction_id.clone(),
                transition.from_status,
                transition.to_status,
                None,
            )
            .await;

        Ok(true)
    }

    fn role_for(tx: &Transaction, caller_id: &str) -> Result<Role> {
        tx.role_of(caller_id).ok_or_else(|| {
            Error::Unauthorized(format!("user {} is not a party to this transaction", caller_id))
        })
    }

    /// Shared mutation path: load, validate against the loaded state,
    /// apply, compare-and-swap, publish.
    async fn mutate(
        &self,
        transaction_id: &str,
        caller_id: &str,
        action: Action,
        now: DateTime<Utc>,
    ) -> Result<TransactionView> {
        let loaded = self.store.fetch(transaction_id).await?;
        let mut tx = loaded.transaction;
        let role = Self::role_for(&tx, caller_id)?;

        let check = expiration::evaluate(&tx, now);
        let transition = HandoverFsm::apply(&mut tx, Actor::Party(role), action, &check, now)?;

        self.store.update(loaded.version, tx.clone()).await?;

        if transition.from_status != transition.to_status {
            self.events
                .publish_status_changed(
                    tx.transaction_id.clone(),
                    transition.from_status,
                    transition.to_status,
                    Some(caller_id.to_string()),
                )
                .await;
        } else {
            debug!(
                transaction_id = %tx.transaction_id,
                status = %tx.status,
                "transaction updated in place"
            );
        }

        if let Some(settlement) = transition.settlement {
            self.events.publish_settlement_ready(settlement).await;
        }

        Ok(TransactionView::for_caller(&tx, role, now))
    }
}
