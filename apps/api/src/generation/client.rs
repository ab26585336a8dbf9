//! Generation Client: One generation request against the configured backend.
//!
//! Owns the retry loop: transient backend failures are retried with
//! exponential backoff up to a fixed number of attempts, fatal ones fail at
//! once. A shared semaphore bounds in-flight backend calls across all
//! requests; callers beyond the bound queue. The client holds no per-request
//! state, so one instance serves every pipeline run.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::time::{sleep, timeout, Instant};
use tracing::{debug, warn};

use crate::config::GenerationSettings;
use crate::llm_client::{BackendError, CompletionBackend, Prompt};
use crate::repair::RepairError;

/// Backoff never waits longer than this between attempts.
const MAX_BACKOFF: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    /// Non-transient backend failure. Not retried.
    #[error("generation backend failed: {0}")]
    Backend(BackendError),

    #[error("generation failed after {attempts} attempts: {last}")]
    RetriesExhausted { attempts: u32, last: BackendError },

    /// The response could not be recovered into a profile.
    #[error("generation produced unusable output: {0}")]
    Repair(#[from] RepairError),
}

/// Retry bound and exponential backoff: base × 2^retry, capped at 30 s.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff_base: Duration,
    pub call_timeout: Duration,
}

impl RetryPolicy {
    /// Delay before retry number `retry` (0-indexed).
    pub fn delay_for_retry(&self, retry: u32) -> Duration {
        let millis = (self.backoff_base.as_millis() as u64).saturating_mul(2u64.saturating_pow(retry));
        Duration::from_millis(millis).min(MAX_BACKOFF)
    }
}

pub struct GenerationClient {
    backend: Arc<dyn CompletionBackend>,
    permits: Arc<Semaphore>,
    policy: RetryPolicy,
    max_output_tokens: u32,
}

impl GenerationClient {
    pub fn new(
        backend: Arc<dyn CompletionBackend>,
        settings: &GenerationSettings,
        call_timeout: Duration,
    ) -> Self {
        Self {
            backend,
            permits: Arc::new(Semaphore::new(settings.max_concurrent)),
            policy: RetryPolicy {
                max_attempts: settings.max_attempts.max(1),
                backoff_base: settings.backoff_base,
                call_timeout,
            },
            max_output_tokens: settings.max_output_tokens,
        }
    }

    pub fn model(&self) -> &str {
        self.backend.model()
    }

    /// Issues the prompt, retrying transient failures. Returns raw text.
    ///
    /// Dropping the returned future cancels the outstanding backend call and
    /// releases its permit.
    pub async fn generate(&self, prompt: &Prompt) -> Result<String, GenerationError> {
        let max_attempts = self.policy.max_attempts;

        for attempt in 1..=max_attempts {
            let started = Instant::now();
            match self.call_once(prompt).await {
                Ok(text) => {
                    debug!(
                        "generation succeeded on attempt {attempt} in {}ms ({} chars)",
                        started.elapsed().as_millis(),
                        text.len()
                    );
                    return Ok(text);
                }
                Err(e) if !e.is_transient() => return Err(GenerationError::Backend(e)),
                Err(e) if attempt == max_attempts => {
                    return Err(GenerationError::RetriesExhausted {
                        attempts: attempt,
                        last: e,
                    })
                }
                Err(e) => {
                    let delay = self.policy.delay_for_retry(attempt - 1);
                    warn!(
                        "generation attempt {attempt}/{max_attempts} failed ({e}), retrying after {}ms",
                        delay.as_millis()
                    );
                    sleep(delay).await;
                }
            }
        }

        unreachable!("max_attempts is at least 1 and the final attempt always returns")
    }

    /// One backend call under a concurrency permit and the per-call timeout.
    async fn call_once(&self, prompt: &Prompt) -> Result<String, BackendError> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| BackendError::fatal(self.backend.name(), "concurrency limiter closed"))?;

        match timeout(
            self.policy.call_timeout,
            self.backend.complete(prompt, self.max_output_tokens),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(BackendError::transient(
                self.backend.name(),
                format!("no response within {}s", self.policy.call_timeout.as_secs_f32()),
            )),
        }
    }
}
