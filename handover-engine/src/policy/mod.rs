//! Pure decision policies consulted by the state machine.
//!
//! Each policy is a function of already-committed state plus an explicit
//! `now`; none of them touch storage or the wall clock, so they can be
//! re-evaluated on every read without locking and tested with fixed
//! timestamps.
//!
//! - [`expiration`]: has the transaction timed out, and why.
//! - [`disclosure`]: what location detail the caller may see.
//! - [`authorization`]: which actions the caller may take.

pub mod authorization;
pub mod disclosure;
pub mod expiration;

pub use authorization::Capabilities;
pub use disclosure::VisibleLocation;
pub use expiration::{Advisory, ExpirationCheck, ExpirationReason};
