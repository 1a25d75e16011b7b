//! TracingClient - stand-in backend client that only logs

use contracts::{ContractError, EventClient, EventParams, FirebaseClient};
use tracing::info;

/// Backend client that logs each call instead of reaching a network SDK
#[derive(Debug, Clone)]
pub struct TracingClient {
    backend: String,
}

impl TracingClient {
    pub fn new(backend: impl Into<String>) -> Self {
        Self {
            backend: backend.into(),
        }
    }
}

impl EventClient for TracingClient {
    fn backend(&self) -> &str {
        &self.backend
    }

    async fn log_event(&self, name: &str, params: &EventParams) -> Result<(), ContractError> {
        info!(
            backend = %self.backend,
            event = %name,
            params = ?params,
            "[{}] {} event fired",
            self.backend,
            name
        );
        Ok(())
    }
}

impl FirebaseClient for TracingClient {
    async fn log_event(&self, name: &str, params: &EventParams) -> Result<(), ContractError> {
        EventClient::log_event(self, name, params).await
    }

    async fn log_screen_view(
        &self,
        screen_name: &str,
        screen_class: &str,
    ) -> Result<(), ContractError> {
        info!(
            backend = %self.backend,
            screen_name = %screen_name,
            screen_class = %screen_class,
            "[{}] Screen view: {}",
            self.backend,
            screen_name
        );
        Ok(())
    }
}
