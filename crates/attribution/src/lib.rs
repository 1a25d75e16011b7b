//! # Attribution
//!
//! Classifies attribution SDK callbacks.
//!
//! - Install conversion: `Unknown -> Organic | NonOrganic`, once per install
//! - Deep links: `FOUND` becomes `deep_link_opened` or `deferred_deep_link`,
//!   with no memory between callbacks
//!
//! The deferred flag is taken verbatim from the SDK.

mod classifier;
mod listener;

pub use classifier::{AttributionClassifier, ConversionOutcome, InstallAttribution};
pub use listener::AttributionListener;
