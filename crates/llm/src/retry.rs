//! Bounded retries around a single completion call

use std::time::Duration;

use tokio_retry::{
    strategy::{jitter, ExponentialBackoff},
    RetryIf,
};

use crate::{CompletionRequest, CompletionResponse, LlmError, LlmService};

/// Call `service` once, then up to `max_retries` more times while the error
/// is retryable. Backoff starts at 200ms with jitter and is capped at 2s.
pub async fn complete_with_retries(
    service: &dyn LlmService,
    request: CompletionRequest,
    max_retries: usize,
) -> Result<CompletionResponse, LlmError> {
    let strategy = ExponentialBackoff::from_millis(2)
        .factor(100)
        .max_delay(Duration::from_secs(2))
        .map(jitter)
        .take(max_retries);

    RetryIf::start(
        strategy,
        || {
            let attempt = request.clone();
            async move {
                service.complete(attempt).await.map_err(|e| {
                    tracing::debug!(error = %e, retryable = e.is_retryable(), "Completion attempt failed");
                    e
                })
            }
        },
        LlmError::is_retryable,
    )
    .await
}
