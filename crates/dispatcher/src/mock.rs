//! Mock sink
//!
//! Records delivered events in memory; failures, delays and panics can be
//! injected. Used by tests across the workspace and by embedders wiring up
//! a session without real backends.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use contracts::{ContractError, EventSink, TrackedEvent};
use tracing::instrument;

/// Mock sink configuration
#[derive(Debug, Clone, Default)]
pub struct MockSinkConfig {
    /// Fail every write
    pub fail: bool,
    /// Fail writes for these event names only
    pub fail_events: Vec<String>,
    /// Panic while writing this event name
    pub panic_on: Option<String>,
    /// Delay before each write completes
    pub delay: Duration,
}

/// Shared view of what a mock sink received
#[derive(Debug, Clone, Default)]
pub struct MockSinkProbe {
    events: Arc<Mutex<Vec<TrackedEvent>>>,
    attempts: Arc<AtomicU64>,
    closed: Arc<AtomicBool>,
}

impl MockSinkProbe {
    /// Events delivered successfully, in arrival order
    pub fn events(&self) -> Vec<TrackedEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn event_names(&self) -> Vec<String> {
        self.events().into_iter().map(|e| e.name).collect()
    }

    /// Write calls, successful or not
    pub fn attempts(&self) -> u64 {
        self.attempts.load(Ordering::Relaxed)
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Relaxed)
    }

    fn push(&self, event: TrackedEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}

/// In-memory sink with injectable failures
pub struct MockSink {
    name: String,
    config: MockSinkConfig,
    probe: MockSinkProbe,
}

impl MockSink {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_config(name, MockSinkConfig::default())
    }

    pub fn with_config(name: impl Into<String>, config: MockSinkConfig) -> Self {
        Self {
            name: name.into(),
            config,
            probe: MockSinkProbe::default(),
        }
    }

    /// Sink whose every write fails
    pub fn failing(name: impl Into<String>) -> Self {
        Self::with_config(
            name,
            MockSinkConfig {
                fail: true,
                ..Default::default()
            },
        )
    }

    pub fn probe(&self) -> MockSinkProbe {
        self.probe.clone()
    }
}

impl EventSink for MockSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "mock_sink_write",
        skip(self, event),
        fields(sink = %self.name, event = %event.name)
    )]
    async fn write(&mut self, event: &TrackedEvent) -> Result<(), ContractError> {
        self.probe.attempts.fetch_add(1, Ordering::Relaxed);

        if !self.config.delay.is_zero() {
            tokio::time::sleep(self.config.delay).await;
        }
        if self.config.panic_on.as_deref() == Some(event.name.as_str()) {
            panic!("mock sink '{}' panicked on '{}'", self.name, event.name);
        }
        if self.config.fail || self.config.fail_events.contains(&event.name) {
            return Err(ContractError::sink_write(&self.name, "mock failure"));
        }

        self.probe.push(event.clone());
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), ContractError> {
        Ok(())
    }

    async fn close(&mut self) -> Result<(), ContractError> {
        self.probe.closed.store(true, Ordering::Relaxed);
        Ok(())
    }
}
