//! Startup gate: block until the database accepts connections.
//!
//! Containers are routinely started before the database behind them is ready.
//! [`wait_for_database`] keeps probing with increasing delays until a probe
//! succeeds, the overall timeout elapses, or the [`CancellationToken`] fires.
//! Nothing that serves requests is constructed before it returns `Ok`.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::config::StartupGateConfig;
use crate::DbPool;

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(
        "Database unavailable after {attempts} attempt(s) within {}s: {last_error}",
        .timeout.as_secs()
    )]
    DependencyUnavailable {
        attempts: u32,
        timeout: Duration,
        last_error: String,
    },

    #[error("Shutdown requested while waiting for the database")]
    Cancelled,
}

/// Calculate the next backoff delay from the current delay and config.
///
/// The result is clamped to [`StartupGateConfig::max_delay`].
pub fn next_delay(current: Duration, config: &StartupGateConfig) -> Duration {
    let next_ms = (current.as_millis() as f64 * config.multiplier) as u64;
    Duration::from_millis(next_ms).min(config.max_delay)
}

/// Probe the pool's database until it answers.
///
/// Returns the number of probes made, the last one being the success.
pub async fn wait_for_pool(
    pool: &DbPool,
    config: &StartupGateConfig,
    cancel: &CancellationToken,
) -> Result<u32, StartupError> {
    wait_for_database(|| crate::health_check(pool), config, cancel).await
}

/// Call `probe` until it succeeds, backing off between failures.
///
/// At least one probe is always made. Each probe is bounded by the time left
/// before `config.timeout`.
pub async fn wait_for_database<P, Fut, E>(
    mut probe: P,
    config: &StartupGateConfig,
    cancel: &CancellationToken,
) -> Result<u32, StartupError>
where
    P: FnMut() -> Fut,
    Fut: Future<Output = Result<(), E>>,
    E: std::fmt::Display,
{
    let deadline = Instant::now() + config.timeout;
    let mut delay = config.initial_delay;
    let mut attempt = 0u32;
    let mut last_error = String::new();

    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if attempt > 0 && remaining.is_zero() {
            tracing::error!(
                attempts = attempt,
                error = %last_error,
                "Database did not become available",
            );
            return Err(StartupError::DependencyUnavailable {
                attempts: attempt,
                timeout: config.timeout,
                last_error,
            });
        }

        attempt += 1;
        tracing::info!(attempt, "Probing database");

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::info!(attempt, "Database probe cancelled");
                return Err(StartupError::Cancelled);
            }
            result = tokio::time::timeout(remaining, probe()) => {
                match result {
                    Ok(Ok(())) => {
                        tracing::info!(attempt, "Database is reachable");
                        return Ok(attempt);
                    }
                    Ok(Err(e)) => {
                        last_error = e.to_string();
                        tracing::warn!(
                            attempt,
                            delay_ms = delay.as_millis() as u64,
                            error = %last_error,
                            "Database probe failed",
                        );
                    }
                    Err(_) => {
                        last_error = format!("probe timed out after {}ms", remaining.as_millis());
                        tracing::warn!(attempt, "Database probe timed out");
                    }
                }
            }
        }

        let remaining = deadline.saturating_duration_since(Instant::now());
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(StartupError::Cancelled),
            _ = tokio::time::sleep(delay.min(remaining)) => {}
        }

        delay = next_delay(delay, config);
    }
}
