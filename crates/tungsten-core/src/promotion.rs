//! Promotion boundary: hands the winning model to the serving system.

use crate::error::{PipelineError, PipelineResult};
use std::time::Duration;
use tracing::info;

/// Downstream destination for an approved model artifact.
///
/// Send failures are the caller's to log; the controller never retries a
/// publish and never rolls back the reset that follows it.
pub trait ModelPublisher: Send {
    fn publish(&self, model: &[u8]) -> PipelineResult<()>;
}

/// POSTs the model blob to the serving system's intake URL.
pub struct HttpModelPublisher {
    url: String,
    client: reqwest::blocking::Client,
}

impl HttpModelPublisher {
    pub fn new(url: String) -> PipelineResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(20))
            .build()
            .map_err(|e| PipelineError::Promotion(format!("failed to build http client: {e}")))?;
        Ok(Self { url, client })
    }
}

impl ModelPublisher for HttpModelPublisher {
    fn publish(&self, model: &[u8]) -> PipelineResult<()> {
        let response = self
            .client
            .post(&self.url)
            .body(model.to_vec())
            .send()
            .map_err(|e| PipelineError::Promotion(format!("failed to send model: {e}")))?;
        if !response.status().is_success() {
            return Err(PipelineError::Promotion(format!(
                "serving system rejected model: {}",
                response.status()
            )));
        }
        info!(url = %self.url, bytes = model.len(), "model sent to serving system");
        Ok(())
    }
}

/// Publisher for deployments without a serving system configured; logs the
/// promotion and drops the artifact.
#[derive(Debug, Default)]
pub struct NullModelPublisher;

impl ModelPublisher for NullModelPublisher {
    fn publish(&self, model: &[u8]) -> PipelineResult<()> {
        info!(bytes = model.len(), "no promotion url configured, model kept locally");
        Ok(())
    }
}
