//! Background expiration sweep.
//!
//! Expiration is data-driven: timeouts are stored timestamps compared to
//! "now" at evaluation time, never scheduled callbacks. Reads re-derive
//! the expiration facts on every call; the sweep is the out-of-band pass
//! that applies the terminal `expired` status so records terminate even
//! if no party ever interacts again. Both paths use the same policy
//! function, so client-observed and sweep-applied expiration never
//! disagree.
//!
//! The scheduler that invokes [`ExpirationSweep::run_once`] is external
//! to the engine.

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::state_machine::CoordinationEngine;

/// One-shot sweep over all non-terminal transactions.
pub struct ExpirationSweep {
    engine: CoordinationEngine,
}

impl ExpirationSweep {
    /// Create a sweep bound to an engine.
    pub fn new(engine: CoordinationEngine) -> Self {
        Self { engine }
    }

    /// Expire every transaction past its cutoff at `now`. Returns the
    /// number of records moved to `expired`.
    ///
    /// Records that lose the compare-and-swap against a concurrent party
    /// action are skipped; if they are still past their cutoff the next
    /// pass picks them up.
    pub async fn run_once(&self, now: DateTime<Utc>) -> Result<usize> {
        let ids = self.engine.store().active_ids().await?;
        let mut expired = 0usize;

        for id in ids {
            match self.engine.expire_transaction(&id, now).await {
                Ok(true) => expired += 1,
                Ok(false) => {}
                Err(Error::ConcurrentModification(_)) | Err(Error::NotFound(_)) => {
                    debug!(transaction_id = %id, "sweep skipped contended record");
                }
                Err(e) => {
                    warn!(transaction_id = %id, error = %e, "sweep failed on record");
                    return Err(e);
                }
            }
        }

        if expired > 0 {
            self.engine.events().publish_sweep_expired(expired).await;
        }

        Ok(expired)
    }
}
