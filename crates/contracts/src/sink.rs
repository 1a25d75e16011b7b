//! Sink and backend client traits - Dispatcher output interface
//!
//! `EventSink` is what the dispatcher drives; the client traits are the call
//! contract of the external analytics SDKs that sinks adapt.

use std::future::Future;

use crate::{ContractError, EventParams, TrackedEvent};

/// Event output trait
///
/// All sink implementations must implement this trait.
#[trait_variant::make(EventSink: Send)]
pub trait LocalEventSink {
    /// Sink name (used for logging/metrics and dispatch reports)
    fn name(&self) -> &str;

    /// Deliver one event
    ///
    /// # Errors
    /// Returns delivery error (should include context)
    async fn write(&mut self, event: &TrackedEvent) -> Result<(), ContractError>;

    /// Flush buffer (if any)
    async fn flush(&mut self) -> Result<(), ContractError>;

    /// Close sink
    async fn close(&mut self) -> Result<(), ContractError>;
}

/// Generic `logEvent(name, params)` backend (Meta, attribution platform)
pub trait EventClient: Send + Sync {
    /// Backend label used in logs
    fn backend(&self) -> &str;

    fn log_event(
        &self,
        name: &str,
        params: &EventParams,
    ) -> impl Future<Output = Result<(), ContractError>> + Send;
}

/// Firebase-style backend with a dedicated screen view call
pub trait FirebaseClient: Send + Sync {
    fn log_event(
        &self,
        name: &str,
        params: &EventParams,
    ) -> impl Future<Output = Result<(), ContractError>> + Send;

    fn log_screen_view(
        &self,
        screen_name: &str,
        screen_class: &str,
    ) -> impl Future<Output = Result<(), ContractError>> + Send;
}
