//! Sink implementations
//!
//! Backend adapters (Firebase, Meta, attribution platform) plus LogSink,
//! FileSink and NetworkSink.

mod attribution_platform;
mod file;
mod firebase;
mod log;
mod meta;
mod network;
mod tracing_client;

pub use self::attribution_platform::AttributionPlatformSink;
pub use self::file::{FileSink, FileSinkConfig};
pub use self::firebase::FirebaseSink;
pub use self::log::LogSink;
pub use self::meta::MetaSink;
pub use self::network::{NetworkFormat, NetworkSink, NetworkSinkConfig};
pub use self::tracing_client::TracingClient;
