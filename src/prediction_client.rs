use crate::config::Config;
use crate::errors::PredictionError;
use crate::models::{HealthStatus, PredictionRequest, PredictionResponse};
use anyhow::Context;
use async_trait::async_trait;
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

/// Fallback used when an error body carries no usable message.
const GENERIC_FAILURE: &str = "Prediction failed";

/// Anything that can turn a request into a prediction.
///
/// The lifecycle controller only talks to this trait, which keeps it
/// testable without a network.
#[async_trait]
pub trait PredictionTransport: Send + Sync {
    /// Sends exactly one request. Implementations must not retry.
    async fn predict(
        &self,
        request: &PredictionRequest,
    ) -> Result<PredictionResponse, PredictionError>;
}

/// HTTP client for the churn prediction service.
#[derive(Clone)]
pub struct PredictionClient {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl PredictionClient {
    /// Creates a new `PredictionClient`.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Service root, without trailing slash.
    /// * `timeout` - Bound on a whole exchange, body included. Must be long
    ///   enough for a sleeping service to boot.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create prediction HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        })
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Self::new(config.base_url.clone(), config.request_timeout)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Requests a churn prediction via `POST /predict`.
    ///
    /// # Returns
    ///
    /// * `Result<PredictionResponse, PredictionError>` - The prediction, or the
    ///   classified failure. No retry is attempted.
    pub async fn submit(
        &self,
        request: &PredictionRequest,
    ) -> Result<PredictionResponse, PredictionError> {
        let url = format!("{}/predict", self.base_url);
        tracing::info!(
            "Requesting churn prediction from {} (channel: {})",
            url,
            request.channel
        );

        let result: Result<PredictionResponse, PredictionError> =
            self.exchange(self.client.post(&url).json(request)).await;
        match &result {
            Ok(prediction) => tracing::info!(
                "✓ Prediction received: probability={:.4}, risk={}, actions={}",
                prediction.churn_probability,
                prediction.risk_level,
                prediction.actions.len()
            ),
            Err(e) => tracing::warn!("Prediction request failed: {}", e),
        }
        result
    }

    /// Liveness check via `GET /health`.
    pub async fn health(&self) -> Result<HealthStatus, PredictionError> {
        let url = format!("{}/health", self.base_url);
        tracing::debug!("Checking service health: {}", url);

        let result: Result<HealthStatus, PredictionError> =
            self.exchange(self.client.get(&url)).await;
        if let Err(e) = &result {
            tracing::warn!("Health check failed: {}", e);
        }
        result
    }

    async fn exchange<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<T, PredictionError> {
        let response = builder
            .send()
            .await
            .map_err(|e| self.classify_transport(e))?;

        if !response.status().is_success() {
            return Err(server_error(response).await);
        }

        let body = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                PredictionError::Timeout(self.timeout)
            } else {
                PredictionError::MalformedResponse(format!("Failed to read response body: {}", e))
            }
        })?;

        serde_json::from_slice(&body).map_err(|e| {
            tracing::error!(
                "Unexpected response shape ({} bytes): {}",
                body.len(),
                e
            );
            PredictionError::MalformedResponse(e.to_string())
        })
    }

    fn classify_transport(&self, err: reqwest::Error) -> PredictionError {
        if err.is_timeout() {
            PredictionError::Timeout(self.timeout)
        } else {
            PredictionError::NetworkUnreachable(err.to_string())
        }
    }
}

#[async_trait]
impl PredictionTransport for PredictionClient {
    async fn predict(
        &self,
        request: &PredictionRequest,
    ) -> Result<PredictionResponse, PredictionError> {
        self.submit(request).await
    }
}

async fn server_error(response: Response) -> PredictionError {
    let status = response.status().as_u16();
    let message = match response.text().await {
        Ok(body) => extract_error_message(&body),
        Err(_) => None,
    }
    .unwrap_or_else(|| GENERIC_FAILURE.to_string());

    tracing::error!("Prediction service returned {}: {}", status, message);
    PredictionError::ServerError { status, message }
}

/// Pulls the human-readable message out of an error body.
///
/// Looks at `detail` first (a string, or a list of validation records with a
/// `msg` each), then `message`.
pub fn extract_error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;

    let from_detail = match value.get("detail") {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
        Some(Value::Array(items)) => {
            let parts: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(Value::as_str))
                .collect();
            (!parts.is_empty()).then(|| parts.join("; "))
        }
        _ => None,
    };

    from_detail.or_else(|| {
        value
            .get("message")
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
            .map(str::to_string)
    })
}
