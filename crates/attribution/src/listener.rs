//! Callback surface registered with the host's attribution SDK wrapper

use std::future::Future;

use contracts::{ConversionCallback, DeepLinkCallback};
use dispatcher::DispatchReport;

use crate::classifier::ConversionOutcome;

/// Receiver for attribution SDK callbacks
///
/// The host owns the SDK and calls these; implementors never fail.
pub trait AttributionListener: Send {
    /// Install conversion data arrived (at most once per install)
    fn on_conversion_data(
        &mut self,
        payload: ConversionCallback,
    ) -> impl Future<Output = ConversionOutcome> + Send;

    /// Deep link resolved; returns the dispatch report if an event was sent
    fn on_deep_link(
        &mut self,
        payload: DeepLinkCallback,
    ) -> impl Future<Output = Option<DispatchReport>> + Send;
}
