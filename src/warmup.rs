use crate::errors::PredictionError;
use crate::models::HealthStatus;
use crate::prediction_client::PredictionClient;
use failsafe::backoff;
use std::time::Duration;

/// How long to keep polling a sleeping service before giving up.
///
/// Nothing in the prediction path retries on its own; a caller that wants to
/// ride out a cold start runs [`wait_until_healthy`] first.
#[derive(Debug, Clone)]
pub struct WarmupPolicy {
    /// Total health checks, including the first.
    pub max_attempts: usize,
    pub initial_delay: Duration,
    pub max_delay: Duration,
}

impl WarmupPolicy {
    /// Delays the backoff actually uses: whole seconds, at least one, and
    /// `max >= initial`. The backoff counts in seconds and rejects anything
    /// smaller or inverted.
    pub fn backoff_bounds(&self) -> (Duration, Duration) {
        let initial = whole_seconds(self.initial_delay).max(Duration::from_secs(1));
        let max = whole_seconds(self.max_delay).max(initial);
        (initial, max)
    }
}

fn whole_seconds(delay: Duration) -> Duration {
    Duration::from_secs(delay.as_secs() + u64::from(delay.subsec_nanos() > 0))
}

impl Default for WarmupPolicy {
    /// Six checks, 2s doubling up to 20s: roughly a minute of waiting on top
    /// of the checks themselves.
    fn default() -> Self {
        Self {
            max_attempts: 6,
            initial_delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(20),
        }
    }
}

/// Polls `GET /health` until the service reports a loaded model.
///
/// Transient failures (unreachable, timeout, 5xx) and a not-ready status are
/// retried on exponential backoff. Anything else is returned immediately.
///
/// # Returns
///
/// * `Result<HealthStatus, PredictionError>` - The ready status, or the last
///   failure once `max_attempts` checks have been spent.
pub async fn wait_until_healthy(
    client: &PredictionClient,
    policy: &WarmupPolicy,
) -> Result<HealthStatus, PredictionError> {
    let (initial_delay, max_delay) = policy.backoff_bounds();
    let mut delays = backoff::exponential(initial_delay, max_delay);
    let attempts = policy.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;
        let failure = match client.health().await {
            Ok(status) if status.is_ready() => {
                tracing::info!("✓ Prediction service ready after {} check(s)", attempt);
                return Ok(status);
            }
            Ok(status) => PredictionError::ServerError {
                status: 503,
                message: format!(
                    "Service is up but not ready (status: {}, model loaded: {})",
                    status.status, status.model_loaded
                ),
            },
            Err(e) if e.is_transient() => e,
            Err(e) => return Err(e),
        };

        if attempt == attempts {
            tracing::error!(
                "Prediction service still unavailable after {} checks: {}",
                attempts,
                failure
            );
            return Err(failure);
        }

        let delay = delays.next().unwrap_or(max_delay);
        tracing::info!(
            "Service not ready ({}), check {}/{}; retrying in {:?}",
            failure,
            attempt,
            attempts,
            delay
        );
        tokio::time::sleep(delay).await;
    }
}
