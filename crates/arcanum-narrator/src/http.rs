//! HTTP narrator client.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::client::{NarrationRequest, NarrationResponse, NarratorClient, NarratorError};

/// Posts narration requests as JSON to a configured collaborator
/// endpoint.
#[derive(Debug, Clone)]
pub struct HttpNarrator {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpNarrator {
    /// Builds a client for `endpoint` with a per-request `timeout`.
    ///
    /// # Errors
    ///
    /// Returns `NarratorError::Http` if the underlying client cannot be
    /// constructed.
    pub fn new(endpoint: String, timeout: Duration) -> Result<Self, NarratorError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| NarratorError::Http(e.to_string()))?;
        Ok(Self { client, endpoint })
    }
}

#[async_trait]
impl NarratorClient for HttpNarrator {
    async fn narrate(&self, request: &NarrationRequest) -> Result<NarrationResponse, NarratorError> {
        debug!(round = request.round_index, "posting narration request");
        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| NarratorError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(NarratorError::Http(format!(
                "collaborator answered {status}"
            )));
        }

        response
            .json::<NarrationResponse>()
            .await
            .map_err(|e| NarratorError::Malformed(e.to_string()))
    }
}
