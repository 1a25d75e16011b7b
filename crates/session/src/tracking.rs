//! TrackingSession - identity, dispatch and attribution for one app session

use std::time::Instant;

use attribution::{AttributionClassifier, AttributionListener, ConversionOutcome, InstallAttribution};
use contracts::{
    AnalyticsEvent, AttributionConfig, ConversionCallback, DeepLinkCallback, EventParams,
    FlagStore, TrackerBlueprint,
};
use dispatcher::{create_dispatcher, DispatchReport, DispatcherError, EventDispatcher};
use identity::{Identity, IdentityError};
use observability::metrics::{
    record_deep_link, record_dispatch_latency_ms, record_event_dispatched,
    record_identity_change, record_install_attribution,
};
use observability::{DispatchMetricsAggregator, DispatchSummary};
use tracing::{debug, info, instrument, warn};

/// One app session
///
/// `&mut self` on every identity change keeps a single writer; each change
/// rebinds the dispatcher instead of mutating shared state.
pub struct TrackingSession {
    dispatcher: EventDispatcher,
    classifier: AttributionClassifier,
    stats: DispatchMetricsAggregator,
}

impl TrackingSession {
    pub fn new(dispatcher: EventDispatcher, attribution: AttributionConfig) -> Self {
        Self {
            dispatcher,
            classifier: AttributionClassifier::new(attribution),
            stats: DispatchMetricsAggregator::new(),
        }
    }

    /// Build sinks from a blueprint and start an anonymous session
    #[instrument(name = "session_from_blueprint", skip(blueprint), fields(app = %blueprint.app.name))]
    pub async fn from_blueprint(blueprint: &TrackerBlueprint) -> Result<Self, DispatcherError> {
        let dispatcher = create_dispatcher(blueprint.sinks.clone()).await?;
        info!(sinks = ?dispatcher.sink_names(), "Tracking session started");
        Ok(Self::new(dispatcher, blueprint.attribution.clone()))
    }

    pub fn identity(&self) -> &Identity {
        self.dispatcher.identity()
    }

    pub fn dispatcher(&self) -> &EventDispatcher {
        &self.dispatcher
    }

    pub fn install_attribution(&self) -> &InstallAttribution {
        self.classifier.install_attribution()
    }

    pub fn stats(&self) -> DispatchSummary {
        self.stats.summary()
    }

    /// Hash `email` and bind it to all later dispatches
    ///
    /// On failure the previous identity is kept.
    pub fn set_identity(&mut self, email: &str) -> Result<(), IdentityError> {
        let identity = Identity::from_email(email)?;
        self.dispatcher = self.dispatcher.with_identity(identity);
        record_identity_change("set");
        Ok(())
    }

    /// Drop the identity (logout)
    pub fn clear_identity(&mut self) {
        self.dispatcher = self.dispatcher.with_identity(Identity::anonymous());
        record_identity_change("clear");
    }

    pub async fn track(&mut self, event: AnalyticsEvent) -> DispatchReport {
        let name = event.name();
        self.dispatch(name, event.into_params()).await
    }

    /// Dispatch an arbitrary event and record its outcome
    pub async fn dispatch(&mut self, name: &str, params: EventParams) -> DispatchReport {
        let started = Instant::now();
        let report = self.dispatcher.dispatch(name, params).await;
        let latency_ms = started.elapsed().as_secs_f64() * 1000.0;

        for (sink, outcome) in &report.outcomes {
            record_event_dispatched(&report.event, sink, outcome.status());
        }
        record_dispatch_latency_ms(&report.event, latency_ms);
        self.stats.update(
            &report.event,
            report
                .outcomes
                .iter()
                .map(|(sink, outcome)| (sink.as_str(), outcome.status())),
            latency_ms,
        );
        report
    }

    /// Fire `app_install` on the first launch only
    #[instrument(name = "session_app_launched", skip(self, store))]
    pub async fn app_launched(&mut self, store: &mut impl FlagStore) -> Option<DispatchReport> {
        let first = store.is_first_launch().unwrap_or_else(|e| {
            warn!(error = %e, "Cannot read first launch flag");
            false
        });
        if !first {
            debug!("Not a first launch");
            return None;
        }

        let report = self.track(AnalyticsEvent::AppInstall).await;
        if let Err(e) = store.mark_app_launched() {
            warn!(error = %e, "Cannot mark app launched");
        }
        Some(report)
    }

    /// Set identity, fire `user_sign_up`, remember the sign-up
    ///
    /// A hashing failure rejects the whole call before anything is sent.
    #[instrument(name = "session_sign_up", skip(self, email, store))]
    pub async fn sign_up(
        &mut self,
        email: &str,
        store: &mut impl FlagStore,
    ) -> Result<DispatchReport, IdentityError> {
        self.set_identity(email)?;
        let report = self.track(AnalyticsEvent::UserSignUp).await;
        if let Err(e) = store.mark_user_signed_up() {
            warn!(error = %e, "Cannot mark user signed up");
        }
        Ok(report)
    }

    /// Clear identity and the host flags
    pub fn reset(&mut self, store: &mut impl FlagStore) {
        self.clear_identity();
        if let Err(e) = store.clear_all() {
            warn!(error = %e, "Cannot clear flag store");
        }
    }

    pub async fn deposit(&mut self, value: f64, currency: &str) -> DispatchReport {
        self.track(AnalyticsEvent::Deposit {
            value,
            currency: currency.to_string(),
        })
        .await
    }

    pub async fn create_instance(&mut self, product_id: &str) -> DispatchReport {
        self.track(AnalyticsEvent::CreateInstance {
            product_id: product_id.to_string(),
        })
        .await
    }

    pub async fn screen_view(&mut self, screen_name: &str) -> DispatchReport {
        self.track(AnalyticsEvent::ScreenView {
            screen_name: screen_name.to_string(),
        })
        .await
    }

    /// Stop every sink worker
    pub async fn shutdown(self) {
        self.dispatcher.shutdown().await;
    }
}

impl AttributionListener for TrackingSession {
    async fn on_conversion_data(&mut self, payload: ConversionCallback) -> ConversionOutcome {
        let outcome = self.classifier.on_conversion_data(&payload);
        if let ConversionOutcome::Classified(attribution) = &outcome {
            record_install_attribution(attribution.kind());
            if let InstallAttribution::NonOrganic {
                media_source,
                campaign,
            } = attribution
            {
                info!(
                    media_source = ?media_source,
                    campaign = ?campaign,
                    "Paid install channel available for personalization"
                );
            }
        }
        outcome
    }

    async fn on_deep_link(&mut self, payload: DeepLinkCallback) -> Option<DispatchReport> {
        let event = self.classifier.classify_deep_link(&payload)?;
        record_deep_link(event.name());
        Some(self.track(event).await)
    }
}
