//! Event handling for the coordination engine.
//!
//! The engine publishes every observable state change on an event bus so
//! collaborators (notification delivery, the credit ledger consumer, the
//! conversation thread) can react without the engine knowing about them.
//! Settlement in particular is only ever *signalled* here; the ledger
//! write happens outside the engine.

pub mod logger;

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};

use crate::state_machine::consensus::SettlementEvent;
use handover_core::TransactionStatus;

/// Events emitted by the coordination engine.
#[derive(Debug, Clone)]
pub enum EngineEvent {
    /// A transaction was created.
    TransactionCreated {
        /// The new transaction's id.
        transaction_id: String,
    },

    /// A transaction moved to a new status.
    StatusChanged {
        /// The transaction that moved.
        transaction_id: String,
        /// Status before the transition.
        old_status: TransactionStatus,
        /// Status after the transition.
        new_status: TransactionStatus,
        /// User id of the acting party, `None` for the sweep.
        by: Option<String>,
    },

    /// Both parties confirmed the handover; the credit ledger should
    /// settle. Emitted exactly once per transaction.
    SettlementReady(SettlementEvent),

    /// The sweep expired a batch of transactions.
    SweepExpired {
        /// How many records were moved to `expired`.
        count: usize,
    },
}

/// Subscriber trait for engine events.
#[async_trait]
pub trait EventSubscriber: Send + Sync {
    /// Handle an engine event.
    async fn handle_event(&self, event: EngineEvent);
}

/// Event bus for publishing and subscribing to engine events.
pub struct EventBus {
    /// Sender for events.
    sender: broadcast::Sender<EngineEvent>,
    /// Subscribers.
    subscribers: RwLock<Vec<Arc<dyn EventSubscriber>>>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    /// Create a new event bus.
    pub fn new() -> Self {
        // Capacity for 100 in-flight events before laggy receivers drop.
        let (sender, _) = broadcast::channel(100);

        Self {
            sender,
            subscribers: RwLock::new(Vec::new()),
        }
    }

    /// Subscribe with a handler.
    pub async fn subscribe(&self, subscriber: Arc<dyn EventSubscriber>) {
        let mut subscribers = self.subscribers.write().await;
        subscribers.push(subscriber);
    }

    /// Get a raw receiver for engine events.
    pub fn subscribe_channel(&self) -> broadcast::Receiver<EngineEvent> {
        self.sender.subscribe()
    }

    /// Publish a transaction-created event.
    pub async fn publish_created(&self, transaction_id: String) {
        self.publish_event(EngineEvent::TransactionCreated { transaction_id })
            .await;
    }

    /// Publish a status-change event.
    pub async fn publish_status_changed(
        &self,
        transaction_id: String,
        old_status: TransactionStatus,
        new_status: TransactionStatus,
        by: Option<String>,
    ) {
        self.publish_event(EngineEvent::StatusChanged {
            transaction_id,
            old_status,
            new_status,
            by,
        })
        .await;
    }

    /// Publish a settlement-ready signal.
    pub async fn publish_settlement_ready(&self, settlement: SettlementEvent) {
        self.publish_event(EngineEvent::SettlementReady(settlement))
            .await;
    }

    /// Publish a sweep summary.
    pub async fn publish_sweep_expired(&self, count: usize) {
        self.publish_event(EngineEvent::SweepExpired { count }).await;
    }

    /// Publish an event to the channel and all subscribers.
    async fn publish_event(&self, event: EngineEvent) {
        // A send error only means there are no channel receivers.
        let _ = self.sender.send(event.clone());

        for subscriber in self.subscribers.read().await.iter() {
            subscriber.handle_event(event.clone()).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counter(AtomicUsize);

    #[async_trait]
    impl EventSubscriber for Counter {
        async fn handle_event(&self, _event: EngineEvent) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn test_subscribers_receive_events() {
        let bus = EventBus::new();
        let counter = Arc::new(Counter(AtomicUsize::new(0)));
        bus.subscribe(counter.clone()).await;

        bus.publish_created("txn-1".to_string()).await;
        bus.publish_sweep_expired(3).await;

        assert_eq!(counter.0.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_channel_receives_events() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe_channel();

        bus.publish_created("txn-1".to_string()).await;

        let event = rx.recv().await.unwrap();
        assert!(matches!(
            event,
            EngineEvent::TransactionCreated { transaction_id } if transaction_id == "txn-1"
        ));
    }
}
