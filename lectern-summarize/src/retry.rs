//! Bounded retry with exponential backoff around a single summarization call.

use std::sync::Arc;
use std::time::Duration;

use lectern_core::{SlideSummarizer, SummarizeError, SummarizedSlide};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Retry policy for summarization requests.
///
/// Only transient failures are retried; the delay before retry `k` is
/// `base_delay * 2^(k-1)`. With the defaults that is two retries at 500ms
/// and 1000ms.
#[derive(Debug, Clone, Copy)]
pub struct RetryConfig {
    /// Retries after the initial attempt.
    pub max_retries: u32,
    /// Delay before the first retry; doubles on each subsequent retry.
    pub base_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay: Duration::from_millis(500),
        }
    }
}

/// Why a wrapped summarization call did not produce a summary.
#[derive(Debug, Error)]
pub enum RetryError {
    /// The run was cancelled. Callers must not record this as a slide
    /// failure.
    #[error("summarization cancelled")]
    Cancelled,

    /// The endpoint failed permanently, or retries were exhausted.
    #[error(transparent)]
    Upstream(#[from] SummarizeError),
}

/// Executes one summarization call with resilience to transient failure.
///
/// Cancellation is observed before each attempt, during the request itself,
/// and during backoff sleeps; a cancelled call is abandoned immediately and
/// reported as [`RetryError::Cancelled`].
#[derive(Clone)]
pub struct RetryingSummarizer {
    client: Arc<dyn SlideSummarizer>,
    config: RetryConfig,
}

impl RetryingSummarizer {
    pub fn new(client: Arc<dyn SlideSummarizer>, config: RetryConfig) -> Self {
        Self { client, config }
    }

    #[tracing::instrument(skip(self, slide_text, cancel))]
    pub async fn summarize(
        &self,
        document_id: &str,
        slide_number: u32,
        slide_text: &str,
        cancel: &CancellationToken,
    ) -> Result<SummarizedSlide, RetryError> {
        let mut attempt = 0u32;

        loop {
            if cancel.is_cancelled() {
                return Err(RetryError::Cancelled);
            }

            let result = tokio::select! {
                () = cancel.cancelled() => return Err(RetryError::Cancelled),
                result = self.client.summarize(document_id, slide_number, slide_text) => result,
            };

            match result {
                Ok(summarized) => return Ok(summarized),
                Err(err @ SummarizeError::Permanent(_)) => {
                    tracing::debug!(attempt, error = %err, "permanent failure, not retrying");
                    return Err(err.into());
                }
                Err(err) if attempt >= self.config.max_retries => {
                    tracing::debug!(attempt, error = %err, "retries exhausted");
                    return Err(err.into());
                }
                Err(err) => {
                    let delay = self.config.base_delay * 2u32.pow(attempt);
                    tracing::debug!(
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "transient failure, backing off"
                    );
                    tokio::select! {
                        () = cancel.cancelled() => return Err(RetryError::Cancelled),
                        () = tokio::time::sleep(delay) => {}
                    }
                    attempt += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use lectern_core::SlideSummary;
    use tokio::sync::Mutex;
    use tokio::time::Instant;

    #[derive(Debug, Clone, Copy)]
    enum FailureKind {
        Transient,
        Permanent,
    }

    /// Fails the first `fail_count` calls, then succeeds. Records the
    /// (virtual) time of every attempt.
    struct FlakySummarizer {
        call_count: AtomicUsize,
        fail_count: usize,
        failure: FailureKind,
        attempt_times: Mutex<Vec<Instant>>,
    }

    impl FlakySummarizer {
        fn new(fail_count: usize, failure: FailureKind) -> Self {
            Self {
                call_count: AtomicUsize::new(0),
                fail_count,
                failure,
                attempt_times: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> usize {
            self.call_count.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl SlideSummarizer for FlakySummarizer {
        async fn summarize(
            &self,
            _document_id: &str,
            slide_number: u32,
            _slide_text: &str,
        ) -> Result<SummarizedSlide, SummarizeError> {
            self.attempt_times.lock().await.push(Instant::now());
            let count = self.call_count.fetch_add(1, Ordering::SeqCst);

            if count < self.fail_count {
                return Err(match self.failure {
                    FailureKind::Transient => SummarizeError::transient("HTTP 429"),
                    FailureKind::Permanent => SummarizeError::permanent("HTTP 400"),
                });
            }

            Ok(SummarizedSlide {
                summary: SlideSummary::new(format!("Slide {slide_number}"), vec![]),
                cached: false,
                latency: Duration::ZERO,
            })
        }
    }

    fn executor(client: Arc<dyn SlideSummarizer>) -> RetryingSummarizer {
        RetryingSummarizer::new(client, RetryConfig::default())
    }

    #[test_log::test(tokio::test(start_paused = true))]
    async fn test_retries_transient_failures_with_doubling_backoff() {
        let client = Arc::new(FlakySummarizer::new(2, FailureKind::Transient));
        let cancel = CancellationToken::new();

        let result = executor(client.clone())
            .summarize("doc-1", 3, "text", &cancel)
            .await;

        assert!(result.is_ok());
        assert_eq!(client.calls(), 3);

        // Backoff before retry 1 is 500ms, before retry 2 is 1000ms.
        let times = client.attempt_times.lock().await;
        assert!(times[1] - times[0] >= Duration::from_millis(500));
        assert!(times[2] - times[1] >= Duration::from_millis(1000));
    }

    #[test_log::test(tokio::test)]
    async fn test_permanent_failures_are_not_retried() {
        let client = Arc::new(FlakySummarizer::new(1, FailureKind::Permanent));
        let cancel = CancellationToken::new();

        let result = executor(client.clone())
            .summarize("doc-1", 3, "text", &cancel)
            .await;

        assert_eq!(client.calls(), 1);
        match result {
            Err(RetryError::Upstream(SummarizeError::Permanent(_))) => {}
            other => panic!("expected permanent upstream error, got {other:?}"),
        }
    }

    #[test_log::test(tokio::test(start_paused = true))]
    async fn test_exhausted_retries_return_the_last_failure() {
        let client = Arc::new(FlakySummarizer::new(5, FailureKind::Transient));
        let cancel = CancellationToken::new();

        let result = executor(client.clone())
            .summarize("doc-1", 3, "text", &cancel)
            .await;

        // 1 attempt + 2 retries, then give up.
        assert_eq!(client.calls(), 3);
        match result {
            Err(RetryError::Upstream(SummarizeError::Transient(_))) => {}
            other => panic!("expected transient upstream error, got {other:?}"),
        }
    }

    #[test_log::test(tokio::test(start_paused = true))]
    async fn test_cancellation_during_backoff_is_not_a_failure() {
        let client = Arc::new(FlakySummarizer::new(5, FailureKind::Transient));
        let cancel = CancellationToken::new();

        let canceller = cancel.clone();
        tokio::spawn(async move {
            // First attempt fails immediately; cancel mid-backoff.
            tokio::time::sleep(Duration::from_millis(100)).await;
            canceller.cancel();
        });

        let result = executor(client.clone())
            .summarize("doc-1", 3, "text", &cancel)
            .await;

        assert_eq!(client.calls(), 1);
        assert!(matches!(result, Err(RetryError::Cancelled)));
    }

    #[test_log::test(tokio::test)]
    async fn test_cancellation_before_the_first_attempt() {
        let client = Arc::new(FlakySummarizer::new(0, FailureKind::Transient));
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = executor(client.clone())
            .summarize("doc-1", 3, "text", &cancel)
            .await;

        assert_eq!(client.calls(), 0);
        assert!(matches!(result, Err(RetryError::Cancelled)));
    }
}
