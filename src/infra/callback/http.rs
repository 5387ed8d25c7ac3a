//! HTTP callback transport backed by `reqwest`.

use std::time::Duration;

use async_trait::async_trait;

use crate::core::{CallbackPayload, CallbackTransport, EngineError};

/// POSTs callback payloads as JSON. Any non-2xx status is a failure.
#[derive(Clone)]
pub struct HttpCallbackTransport {
    client: reqwest::Client,
}

impl HttpCallbackTransport {
    /// Create a transport whose requests time out after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, EngineError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| EngineError::Backend(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// Wrap an existing client.
    pub const fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CallbackTransport for HttpCallbackTransport {
    async fn send(&self, endpoint: &str, payload: &CallbackPayload) -> Result<(), EngineError> {
        let response = self
            .client
            .post(endpoint)
            .json(payload)
            .send()
            .await
            .map_err(|e| EngineError::DeliveryFailure(e.to_string()))?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(EngineError::DeliveryFailure(format!(
                "endpoint returned {status}"
            )))
        }
    }
}
