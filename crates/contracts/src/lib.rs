//! # Contracts
//!
//! Frozen interface contracts shared by every tracking crate: event model,
//! attribution callback payloads, sink and backend client traits, host flag
//! store and the tracker blueprint.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.

mod attribution;
mod blueprint;
mod error;
mod event;
mod flags;
mod sink;

pub use attribution::*;
pub use blueprint::*;
pub use error::*;
pub use event::*;
pub use flags::FlagStore;
pub use sink::*;
