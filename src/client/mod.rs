//! Client side of the serving example: one HTTP request per classification.

use reqwest::Client;
use tracing::{debug, info};

use crate::error::{PipelineError, Result};
use crate::labels::Prediction;
use crate::server::{ApiResponse, ClassifyRequest};

/// Talks to a running `senti serve` endpoint
#[derive(Debug, Clone)]
pub struct ServingClient {
    client: Client,
    base_url: String,
}

impl ServingClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Posts `text` to the classify endpoint and returns the served prediction
    pub async fn classify(&self, text: &str) -> Result<Prediction> {
        let url = format!("{}/api/v1/classify", self.base_url);
        info!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .json(&ClassifyRequest { text: text.to_string() })
            .send()
            .await
            .map_err(|e| PipelineError::Network(format!("Failed to reach {}: {}", url, e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| PipelineError::Network(format!("Failed to read response: {}", e)))?;
        debug!("Response {}: {}", status, body);

        // Error bodies carry the server's message; surface it verbatim
        let parsed: Option<ApiResponse<Prediction>> = serde_json::from_str(&body).ok();
        if !status.is_success() {
            let message = parsed
                .and_then(|r| r.message)
                .unwrap_or(body);
            return Err(PipelineError::Network(format!("HTTP {}: {}", status, message)));
        }

        let parsed = parsed.ok_or_else(|| {
            PipelineError::Network(format!("Unexpected response body: {}", body))
        })?;
        parsed.data.ok_or_else(|| {
            PipelineError::Network(
                parsed.message.unwrap_or_else(|| "response carried no prediction".to_string()),
            )
        })
    }

    /// True when the server answers its health check
    pub async fn is_healthy(&self) -> bool {
        let url = format!("{}/api/v1/health", self.base_url);
        match self.client.get(&url).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }
}
