//! Logging subscriber that writes engine events through `tracing`.

use async_trait::async_trait;
use tracing::info;

use super::{EngineEvent, EventSubscriber};

/// Subscriber that logs every engine event. Attach it for observability
/// in deployments that have no other event consumer.
#[derive(Debug, Default)]
pub struct EventLogger;

impl EventLogger {
    /// Create a new event logger.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EventSubscriber for EventLogger {
    async fn handle_event(&self, event: EngineEvent) {
        match event {
            EngineEvent::TransactionCreated { transaction_id } => {
                info!(%transaction_id, "transaction created");
            }
            EngineEvent::StatusChanged {
                transaction_id,
                old_status,
                new_status,
                by,
            } => {
                info!(
                    %transaction_id,
                    %old_status,
                    %new_status,
                    by = by.as_deref().unwrap_or("system"),
                    "transaction status changed"
                );
            }
            EngineEvent::SettlementReady(settlement) => {
                info!(
                    transaction_id = %settlement.transaction_id,
                    credited_party = %settlement.credited_party,
                    "settlement ready"
                );
            }
            EngineEvent::SweepExpired { count } => {
                info!(count, "expiration sweep finished");
            }
        }
    }
}
