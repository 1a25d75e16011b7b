//! LogSink - logs event summary via tracing

use contracts::{ContractError, EventSink, TrackedEvent, HASHED_EMAIL_KEY};
use tracing::{info, instrument};

/// Sink that logs event summaries for debugging
pub struct LogSink {
    name: String,
}

impl LogSink {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    fn log_event_summary(&self, event: &TrackedEvent) {
        info!(
            sink = %self.name,
            event = %event.name,
            params = event.params.len(),
            identified = event.params.contains_key(HASHED_EMAIL_KEY),
            "TrackedEvent received"
        );
    }
}

impl EventSink for LogSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "log_sink_write",
        skip(self, event),
        fields(sink = %self.name, event = %event.name)
    )]
    async fn write(&mut self, event: &TrackedEvent) -> Result<(), ContractError> {
        self.log_event_summary(event);
        Ok(())
    }

    #[instrument(name = "log_sink_flush", skip(self))]
    async fn flush(&mut self) -> Result<(), ContractError> {
        // Nothing to flush for log sink
        Ok(())
    }

    #[instrument(name = "log_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        info!(sink = %self.name, "LogSink closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::EventParams;

    #[tokio::test]
    async fn test_log_sink_write() {
        let mut sink = LogSink::new("test_log");
        let event = TrackedEvent::new("app_install", EventParams::new());
        assert!(sink.write(&event).await.is_ok());
    }

    #[tokio::test]
    async fn test_log_sink_name() {
        let sink = LogSink::new("my_logger");
        assert_eq!(sink.name(), "my_logger");
    }
}
