//! # Session
//!
//! Session facade used by the host application.
//!
//! Owns the identity-bound dispatcher and the attribution classifier, runs
//! the launch and sign-up flows against the host's flag store, and receives
//! attribution SDK callbacks.

mod flags;
mod tracking;

pub use attribution::{AttributionListener, ConversionOutcome, InstallAttribution};
pub use dispatcher::{DispatchReport, SinkOutcome};
pub use flags::{FileFlagStore, MemoryFlagStore, FIRST_LAUNCH_KEY, USER_SIGNED_UP_KEY};
pub use tracking::TrackingSession;
