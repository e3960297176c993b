//! # Handover Coordination Engine
//!
//! The coordination engine governs how two users of a physical-item
//! exchange negotiate a meeting, progressively disclose location
//! information, confirm that the handover happened, and settle a credit.
//! It is the single source of truth for transaction state: callers submit
//! actions, the engine validates and applies them, and every response
//! carries the recomputed authorization flags so no client re-derives
//! permission logic on its own.
//!
//! ## Architecture
//!
//! - **Policies** ([`policy`]): pure functions of committed state plus
//!   an explicit `now`, covering expiration, location disclosure, and
//!   the per-caller capability set.
//! - **State machine** ([`state_machine`]): the transition rules from
//!   `pending` through `time_confirmed` to the terminal statuses, with
//!   the two-sided handover consensus tracker that signals settlement
//!   exactly once.
//! - **Store** ([`store`]): versioned records behind a compare-and-swap
//!   seam; concurrent mutations surface as conflicts instead of merging.
//! - **Events** ([`event`]): bus for status changes and the outbound
//!   settlement signal consumed by the external credit ledger.
//! - **Sweep** ([`sweep`]): out-of-band pass applying terminal expiration
//!   with the same policy the reads use.
//!
//! ## Usage
//!
//! ```rust
//! use chrono::{Duration, Utc};
//! use handover_core::request::{CreateTransaction, ProposeTime};
//! use handover_core::{OfferRef, Party};
//! use handover_engine::CoordinationEngine;
//!
//! # async fn example() -> handover_engine::Result<()> {
//! let engine = CoordinationEngine::in_memory();
//! let now = Utc::now();
//!
//! let view = engine
//!     .create_transaction(
//!         CreateTransaction::new(
//!             Party::new("user-p", "Paula"),
//!             Party::new("user-r", "Rami"),
//!             OfferRef::new("offer-1", "Drill", "used"),
//!         ),
//!         now,
//!     )
//!     .await?;
//!
//! let view = engine
//!     .propose_time(
//!         ProposeTime::new(&view.transaction_id, vec![now + Duration::days(2)]),
//!         "user-r",
//!         now,
//!     )
//!     .await?;
//! assert!(view.capabilities.can_cancel);
//! # Ok(())
//! # }
//! ```
//!
//! The engine never reads the wall clock: `now` is threaded through every
//! operation, so behavior is deterministic and testable with fixed
//! timestamps. There are no internal timers; timeouts are stored
//! timestamps compared to `now` at evaluation time.

pub mod error;
pub mod event;
pub mod policy;
pub mod state_machine;
pub mod store;
pub mod sweep;
pub mod view;

pub use error::{Error, Result};
pub use event::{EngineEvent, EventBus, EventSubscriber};
pub use policy::{Advisory, Capabilities, ExpirationCheck, ExpirationReason, VisibleLocation};
pub use state_machine::consensus::SettlementEvent;
pub use state_machine::CoordinationEngine;
pub use store::{InMemoryStore, TransactionStore};
pub use sweep::ExpirationSweep;
pub use view::TransactionView;
