//! Command implementations.

mod hash;
mod info;
mod replay;
mod validate;

pub use hash::run_hash;
pub use info::run_info;
pub use replay::run_replay;
pub use validate::run_validate;
