//! # Dispatcher
//!
//! Event fan-out module.
//!
//! Responsibilities:
//! - Merge the bound identity into each event
//! - Fan out to every sink through its own worker queue
//! - Isolate slow or failing sinks; never fail the caller
//! - Report the outcome per sink

pub mod dispatcher;
pub mod error;
pub mod handle;
pub mod metrics;
pub mod mock;
pub mod outcome;
pub mod sinks;

pub use contracts::{EventSink, TrackedEvent};
pub use dispatcher::{create_dispatcher, DispatcherBuilder, DispatcherConfig, EventDispatcher};
pub use error::DispatcherError;
pub use handle::{SinkHandle, Submission};
pub use metrics::{MetricsSnapshot, SinkMetrics};
pub use mock::{MockSink, MockSinkConfig, MockSinkProbe};
pub use outcome::{DispatchReport, SinkOutcome};
pub use sinks::{
    AttributionPlatformSink, FileSink, FirebaseSink, LogSink, MetaSink, NetworkSink, TracingClient,
};
