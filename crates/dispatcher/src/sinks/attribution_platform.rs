//! AttributionPlatformSink - in-app events for the attribution platform

use contracts::{ContractError, EventClient, EventSink, TrackedEvent};
use tracing::{debug, instrument};

pub struct AttributionPlatformSink<C> {
    name: String,
    client: C,
}

impl<C: EventClient> AttributionPlatformSink<C> {
    pub fn new(name: impl Into<String>, client: C) -> Self {
        Self {
            name: name.into(),
            client,
        }
    }
}

impl<C: EventClient> EventSink for AttributionPlatformSink<C> {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "attribution_platform_sink_write",
        skip(self, event),
        fields(sink = %self.name, event = %event.name, backend = %self.client.backend())
    )]
    async fn write(&mut self, event: &TrackedEvent) -> Result<(), ContractError> {
        self.client.log_event(&event.name, &event.params).await?;
        debug!(sink = %self.name, event = %event.name, "Delivered");
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), ContractError> {
        Ok(())
    }

    async fn close(&mut self) -> Result<(), ContractError> {
        Ok(())
    }
}
