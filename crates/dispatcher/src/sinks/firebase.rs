//! FirebaseSink - Firebase-style analytics adapter
//!
//! `screen_view` goes through the dedicated screen view call with
//! `screen_class = screen_name`; every other event through `log_event`.

use contracts::{AnalyticsEvent, ContractError, EventSink, FirebaseClient, TrackedEvent};
use tracing::{debug, instrument};

pub struct FirebaseSink<C> {
    name: String,
    client: C,
}

impl<C: FirebaseClient> FirebaseSink<C> {
    pub fn new(name: impl Into<String>, client: C) -> Self {
        Self {
            name: name.into(),
            client,
        }
    }
}

impl<C: FirebaseClient> EventSink for FirebaseSink<C> {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "firebase_sink_write",
        skip(self, event),
        fields(sink = %self.name, event = %event.name)
    )]
    async fn write(&mut self, event: &TrackedEvent) -> Result<(), ContractError> {
        if event.name == AnalyticsEvent::SCREEN_VIEW {
            let screen = event.str_param("screen_name").ok_or_else(|| {
                ContractError::sink_write(&self.name, "screen_view without screen_name")
            })?;
            self.client.log_screen_view(screen, screen).await?;
        } else {
            self.client.log_event(&event.name, &event.params).await?;
        }
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
