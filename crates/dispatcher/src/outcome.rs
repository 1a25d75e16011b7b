//! Per-sink dispatch outcomes

use std::collections::BTreeMap;

use serde::Serialize;

/// Result of delivering one event to one sink
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SinkOutcome {
    /// Sink accepted the event
    Delivered,
    /// Sink returned an error or its worker died mid-delivery
    Failed { reason: String },
    /// Queue full; the event never reached the sink
    Dropped,
}

impl SinkOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered)
    }

    /// Metrics label
    pub fn status(&self) -> &'static str {
        match self {
            Self::Delivered => "delivered",
            Self::Failed { .. } => "failed",
            Self::Dropped => "dropped",
        }
    }
}

/// Outcome of one dispatch call, keyed by sink name
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchReport {
    pub event: String,
    pub outcomes: BTreeMap<String, SinkOutcome>,
}

impl DispatchReport {
    pub fn new(event: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            outcomes: BTreeMap::new(),
        }
    }

    pub fn record(&mut self, sink: impl Into<String>, outcome: SinkOutcome) {
        self.outcomes.insert(sink.into(), outcome);
    }

    pub fn outcome(&self, sink: &str) -> Option<&SinkOutcome> {
        self.outcomes.get(sink)
    }

    /// True when every sink delivered (vacuously true with no sinks)
    pub fn all_delivered(&self) -> bool {
        self.outcomes.values().all(SinkOutcome::is_delivered)
    }

    pub fn delivered_count(&self) -> usize {
        self.outcomes.values().filter(|o| o.is_delivered()).count()
    }

    /// Sinks that did not deliver
    pub fn failures(&self) -> impl Iterator<Item = (&str, &SinkOutcome)> {
        self.outcomes
            .iter()
            .filter(|(_, o)| !o.is_delivered())
            .map(|(name, o)| (name.as_str(), o))
    }
}
