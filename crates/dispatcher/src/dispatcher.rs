//! EventDispatcher - identity-bound fan-out to sinks

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use contracts::{
    AnalyticsEvent, EventParams, ParamValue, SinkConfig, SinkType, TrackedEvent,
    HASHED_EMAIL_KEY,
};
use identity::Identity;

use crate::error::DispatcherError;
use crate::handle::SinkHandle;
use crate::metrics::MetricsSnapshot;
use crate::outcome::{DispatchReport, SinkOutcome};
use crate::sinks::{
    AttributionPlatformSink, FileSink, FirebaseSink, LogSink, MetaSink, NetworkSink, TracingClient,
};

/// Dispatcher configuration
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    pub sinks: Vec<SinkConfig>,
}

/// Builder for creating an EventDispatcher
pub struct DispatcherBuilder {
    config: DispatcherConfig,
    identity: Identity,
}

impl DispatcherBuilder {
    pub fn new(config: DispatcherConfig) -> Self {
        Self {
            config,
            identity: Identity::anonymous(),
        }
    }

    /// Bind an initial identity
    pub fn identity(mut self, identity: Identity) -> Self {
        self.identity = identity;
        self
    }

    /// Build sinks and start their workers
    #[instrument(
        name = "dispatcher_builder_build",
        skip(self),
        fields(sink_count = self.config.sinks.len())
    )]
    pub async fn build(self) -> Result<EventDispatcher, DispatcherError> {
        let mut handles = Vec::with_capacity(self.config.sinks.len());
        for sink_config in &self.config.sinks {
            handles.push(create_sink_handle(sink_config).await?);
        }
        Ok(EventDispatcher::with_handles(handles).with_identity(self.identity))
    }
}

/// Create a SinkHandle from configuration
///
/// Backend sinks built here use `TracingClient`; embedders with real SDK
/// bindings spawn their sinks directly.
#[instrument(
    name = "dispatcher_create_sink_handle",
    skip(config),
    fields(sink = %config.name, sink_type = ?config.sink_type)
)]
async fn create_sink_handle(config: &SinkConfig) -> Result<SinkHandle, DispatcherError> {
    let capacity = config.queue_capacity;
    match config.sink_type {
        SinkType::Firebase => {
            let sink = FirebaseSink::new(&config.name, TracingClient::new("Firebase"));
            Ok(SinkHandle::spawn(sink, capacity))
        }
        SinkType::Meta => {
            let sink = MetaSink::new(&config.name, TracingClient::new("Meta"));
            Ok(SinkHandle::spawn(sink, capacity))
        }
        SinkType::AttributionPlatform => {
            let sink = AttributionPlatformSink::new(&config.name, TracingClient::new("AppsFlyer"));
            Ok(SinkHandle::spawn(sink, capacity))
        }
        SinkType::Log => Ok(SinkHandle::spawn(LogSink::new(&config.name), capacity)),
        SinkType::File => {
            let sink = FileSink::from_params(&config.name, &config.params)
                .map_err(|e| DispatcherError::sink_creation(&config.name, e.to_string()))?;
            Ok(SinkHandle::spawn(sink, capacity))
        }
        SinkType::Network => {
            let sink = NetworkSink::from_params(&config.name, &config.params)
                .await
                .map_err(|e| DispatcherError::sink_creation(&config.name, e.to_string()))?;
            Ok(SinkHandle::spawn(sink, capacity))
        }
    }
}

/// Fans events out to every sink, bound to one identity
///
/// Clones share the same sink workers. Changing identity returns a new
/// dispatcher; the original keeps its own binding.
#[derive(Clone)]
pub struct EventDispatcher {
    handles: Arc<Vec<SinkHandle>>,
    identity: Identity,
}

impl EventDispatcher {
    /// Create a dispatcher over already spawned sink handles
    pub fn with_handles(handles: Vec<SinkHandle>) -> Self {
        Self {
            handles: Arc::new(handles),
            identity: Identity::anonymous(),
        }
    }

    /// Same sinks, bound to `identity`
    pub fn with_identity(&self, identity: Identity) -> Self {
        Self {
            handles: Arc::clone(&self.handles),
            identity,
        }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn sink_names(&self) -> Vec<String> {
        self.handles.iter().map(|h| h.name().to_string()).collect()
    }

    /// Get metrics for all sinks
    pub fn metrics(&self) -> Vec<(String, MetricsSnapshot)> {
        self.handles
            .iter()
            .map(|h| (h.name().to_string(), h.metrics().snapshot()))
            .collect()
    }

    /// Dispatch a catalog event
    pub async fn track(&self, event: AnalyticsEvent) -> DispatchReport {
        let name = event.name();
        self.dispatch(name, event.into_params()).await
    }

    /// Dispatch `name` with `params` to every sink
    ///
    /// Returns once every sink has delivered, failed or refused the event.
    /// Never fails; per-sink results are in the report.
    #[instrument(
        name = "dispatcher_dispatch",
        skip(self, params),
        fields(event = %name, sinks = self.handles.len())
    )]
    pub async fn dispatch(&self, name: &str, params: EventParams) -> DispatchReport {
        let event = Arc::new(self.merge_identity(name, params));

        // Enqueue everywhere first so sinks run concurrently
        let submissions: Vec<_> = self
            .handles
            .iter()
            .map(|h| (h.name().to_string(), h.submit(Arc::clone(&event))))
            .collect();

        let mut report = DispatchReport::new(name);
        for (sink, submission) in submissions {
            let outcome = submission.outcome().await;
            if let SinkOutcome::Failed { reason } = &outcome {
                warn!(sink = %sink, event = %name, reason = %reason, "Sink delivery failed");
            }
            report.record(sink, outcome);
        }

        debug!(
            event = %name,
            delivered = report.delivered_count(),
            total = report.outcomes.len(),
            "Dispatch complete"
        );
        report
    }

    /// The bound identity is the only source of `hashed_email`
    fn merge_identity(&self, name: &str, mut params: EventParams) -> TrackedEvent {
        match self.identity.hashed_email() {
            Some(hashed) => {
                params.insert(
                    HASHED_EMAIL_KEY.to_string(),
                    ParamValue::Str(hashed.to_string()),
                );
            }
            None => {
                params.remove(HASHED_EMAIL_KEY);
            }
        }
        TrackedEvent::new(name, params)
    }

    /// Drain every sink queue, then flush and close the sinks
    ///
    /// Only the last clone can shut workers down; earlier clones just
    /// release their reference.
    #[instrument(name = "dispatcher_shutdown", skip(self))]
    pub async fn shutdown(self) {
        match Arc::try_unwrap(self.handles) {
            Ok(handles) => {
                for handle in handles {
                    handle.shutdown().await;
                }
                info!("Dispatcher shutdown complete");
            }
            Err(shared) => {
                debug!(
                    clones = Arc::strong_count(&shared) - 1,
                    "Dispatcher still shared, skipping worker shutdown"
                );
            }
        }
    }
}

/// Convenience function to create a dispatcher from sink configs
#[instrument(name = "dispatcher_create", skip(sink_configs))]
pub async fn create_dispatcher(
    sink_configs: Vec<SinkConfig>,
) -> Result<EventDispatcher, DispatcherError> {
    DispatcherBuilder::new(DispatcherConfig {
        sinks: sink_configs,
    })
    .build()
    .await
}
