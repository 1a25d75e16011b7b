//! MetaSink - Meta app events adapter

use contracts::{ContractError, EventClient, EventSink, TrackedEvent};
use tracing::{debug, instrument};

pub struct MetaSink<C> {
    name: String,
    client: C,
}

impl<C: EventClient> MetaSink<C> {
    pub fn new(name: impl Into<String>, client: C) -> Self {
        Self {
            name: name.into(),
            client,
        }
    }
}

impl<C: EventClient> EventSink for MetaSink<C> {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "meta_sink_write",
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sinks::TracingClient;
    use crate::{EventDispatcher, SinkHandle, SinkOutcome};
    use contracts::{EventParams, ParamValue, HASHED_EMAIL_KEY};
    use identity::{hash_email, Identity};
    use std::sync::{Arc, Mutex};

    #[derive(Default, Clone)]
    struct RecordingClient {
        calls: Arc<Mutex<Vec<(String, EventParams)>>>,
        reject: bool,
    }

    impl EventClient for RecordingClient {
        fn backend(&self) -> &str {
            "recording"
        }

        async fn log_event(&self, name: &str, params: &EventParams) -> Result<(), ContractError> {
            if self.reject {
                return Err(ContractError::backend("recording", "rejected"));
            }
            self.calls
                .lock()
                .unwrap()
                .push((name.to_string(), params.clone()));
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_meta_receives_event_with_hashed_email() {
        let client = RecordingClient::default();
        let sink = MetaSink::new("meta", client.clone());
        let dispatcher = EventDispatcher::with_handles(vec![SinkHandle::spawn(sink, 8)])
            .with_identity(Identity::from_email("Meta@User.io").unwrap());

        let mut params = EventParams::new();
        params.insert("screen_name".into(), ParamValue::from("Profile"));
        let report = dispatcher.dispatch("screen_view", params).await;
        assert_eq!(report.outcome("meta"), Some(&SinkOutcome::Delivered));

        let calls = client.calls.lock().unwrap().clone();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "screen_view");
        assert_eq!(calls[0].1["screen_name"], ParamValue::from("Profile"));
        assert_eq!(
            calls[0].1[HASHED_EMAIL_KEY],
            ParamValue::from(hash_email("meta@user.io").unwrap().to_string())
        );
    }

    #[tokio::test]
    async fn test_client_error_surfaces_from_write() {
        let mut sink = MetaSink::new(
            "meta",
            RecordingClient {
                reject: true,
                ..Default::default()
            },
        );
        let err = sink
            .write(&TrackedEvent::new("deposit", EventParams::new()))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("rejected"));
    }

    #[tokio::test]
    async fn test_tracing_client_accepts_everything() {
        let mut sink = MetaSink::new("meta", TracingClient::new("Meta"));
        assert!(sink
            .write(&TrackedEvent::new("app_install", EventParams::new()))
            .await
            .is_ok());
    }
}
