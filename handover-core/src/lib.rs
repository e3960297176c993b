//! Core data model for the peer-to-peer handover coordination engine.
//!
//! This crate defines the types exchanged between the coordination engine
//! and its callers: the [`Transaction`] record, the two fixed
//! [`party::Role`]s, the embedded catalog [`offer::OfferRef`], and one
//! request body per engine operation, each carrying its own payload
//! validation.
//!
//! The crate is deliberately free of I/O and clock access. Requests are
//! validated against their own contents only; everything that depends on
//! stored state or on the current time belongs to the engine crate.

pub mod error;
pub mod offer;
pub mod party;
pub mod request;
pub mod transaction;

pub use error::{Error, Result};
pub use offer::OfferRef;
pub use party::{Party, Role};
pub use request::{
    Cancel, ConfirmHandover, ConfirmTime, CreateTransaction, HandoverRequest, ProposeTime,
    UpdateAddress, Validate,
};
pub use transaction::{Transaction, TransactionStatus};
