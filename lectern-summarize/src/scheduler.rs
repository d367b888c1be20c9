//! Progressive, bounded-concurrency summarization over a slide deck.
//!
//! The scheduler maximizes perceived responsiveness: each slide's summary is
//! delivered the moment it settles, in whatever order slides happen to
//! finish, while a fixed-size pool of workers bounds the number of
//! simultaneous requests against the upstream endpoint.

use std::sync::{
    Arc,
    atomic::{AtomicBool, AtomicUsize, Ordering},
};
use std::time::Instant;

use derive_builder::Builder;
use lectern_core::{ExtractionError, PageText, PageTextSource, SlideSummarizer, SummaryEvents};
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::retry::{RetryConfig, RetryError, RetryingSummarizer};

/// Default bound on simultaneous summarize calls per run.
pub const DEFAULT_CONCURRENCY: usize = 5;

/// Outcome counts for one full run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunStats {
    pub done: usize,
    pub failed: usize,
    pub total: usize,
}

impl RunStats {
    /// True when every claimable slide settled (no cancellation cut the run
    /// short).
    pub fn is_complete(&self) -> bool {
        self.done + self.failed == self.total
    }
}

/// Drives one document's pages through the summarization endpoint.
///
/// Page texts are fetched once and delivered via
/// [`SummaryEvents::on_page_texts_ready`] before any worker starts. Workers
/// pull un-started page indices from a shared cursor, so each index is
/// claimed by exactly one worker and at most one request per slide is ever
/// outstanding.
#[derive(Clone, Builder)]
#[builder(pattern = "owned", setter(into, strip_option))]
pub struct ProgressiveSummarizer {
    #[builder(setter(custom))]
    pub(crate) source: Arc<dyn PageTextSource>,
    #[builder(setter(custom))]
    pub(crate) summarizer: Arc<dyn SlideSummarizer>,
    pub(crate) document_id: String,
    /// Number of pages the paired viewer reports; indices beyond the
    /// extracted page list are never claimed.
    pub(crate) page_count: usize,
    #[builder(default = "DEFAULT_CONCURRENCY")]
    pub(crate) concurrency: usize,
    #[builder(default)]
    pub(crate) retry: RetryConfig,
}

impl ProgressiveSummarizerBuilder {
    pub fn source(mut self, source: Arc<dyn PageTextSource>) -> Self {
        self.source = Some(source);
        self
    }

    pub fn summarizer(mut self, summarizer: Arc<dyn SlideSummarizer>) -> Self {
        self.summarizer = Some(summarizer);
        self
    }
}

/// Everything a worker needs, shared across the pool.
struct RunContext {
    document_id: String,
    pages: Vec<PageText>,
    /// Next unclaimed page index. The only mutable state shared between
    /// workers.
    cursor: AtomicUsize,
    claimable: usize,
    executor: RetryingSummarizer,
    cancel: CancellationToken,
    events: Arc<dyn SummaryEvents>,
    started: Instant,
    first_result_seen: AtomicBool,
}

impl ProgressiveSummarizer {
    pub fn builder() -> ProgressiveSummarizerBuilder {
        ProgressiveSummarizerBuilder::default()
    }

    /// Runs one full progressive pass over the document.
    ///
    /// Returns only after every worker has exited — all indices claimed, or
    /// cancellation observed. An empty page list completes immediately with
    /// no slide events. Results that settle after cancellation are
    /// discarded, never delivered.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractionError`] if page texts cannot be obtained; no
    /// slide events are fired in that case.
    #[tracing::instrument(skip_all, name = "summarize.run", fields(document_id = %self.document_id, page_count = self.page_count))]
    pub async fn run(
        &self,
        cancel: CancellationToken,
        events: Arc<dyn SummaryEvents>,
    ) -> Result<RunStats, ExtractionError> {
        let started = Instant::now();

        let pages = self.source.fetch_page_texts().await?;
        events.on_page_texts_ready(&pages).await;

        let claimable = self.page_count.min(pages.len());
        let mut stats = RunStats {
            total: claimable,
            ..RunStats::default()
        };
        if claimable == 0 {
            tracing::debug!("no pages to summarize");
            return Ok(stats);
        }

        let ctx = Arc::new(RunContext {
            document_id: self.document_id.clone(),
            pages,
            cursor: AtomicUsize::new(0),
            claimable,
            executor: RetryingSummarizer::new(Arc::clone(&self.summarizer), self.retry),
            cancel,
            events,
            started,
            first_result_seen: AtomicBool::new(false),
        });

        let worker_count = self.concurrency.min(claimable);
        tracing::debug!(worker_count, claimable, "dispatching summarize workers");

        let mut workers = Vec::with_capacity(worker_count);
        for worker in 0..worker_count {
            let ctx = Arc::clone(&ctx);
            let span = tracing::debug_span!("summarize.worker", worker);
            workers.push(tokio::spawn(
                async move { worker_loop(&ctx).await }.instrument(span.or_current()),
            ));
        }

        for outcome in futures_util::future::join_all(workers).await {
            match outcome {
                Ok((done, failed)) => {
                    stats.done += done;
                    stats.failed += failed;
                }
                Err(err) => tracing::error!(error = %err, "summarize worker panicked"),
            }
        }

        tracing::info!(
            done = stats.done,
            failed = stats.failed,
            total = stats.total,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "progressive summarization finished"
        );
        Ok(stats)
    }
}

/// Claims indices from the shared cursor until none remain or the run is
/// cancelled. Returns this worker's (done, failed) counts.
async fn worker_loop(ctx: &RunContext) -> (usize, usize) {
    let mut done = 0;
    let mut failed = 0;

    loop {
        if ctx.cancel.is_cancelled() {
            break;
        }

        // Claim-and-increment; each index is handed to exactly one worker.
        let index = ctx.cursor.fetch_add(1, Ordering::SeqCst);
        if index >= ctx.claimable {
            break;
        }
        let page = &ctx.pages[index];

        match ctx
            .executor
            .summarize(&ctx.document_id, page.slide_number, &page.text, &ctx.cancel)
            .await
        {
            Ok(summarized) => {
                if ctx.cancel.is_cancelled() {
                    break;
                }
                if !ctx.first_result_seen.swap(true, Ordering::SeqCst) {
                    tracing::debug!(
                        ttfr_ms = ctx.started.elapsed().as_millis() as u64,
                        slide_number = page.slide_number,
                        "first slide summary ready"
                    );
                }
                tracing::debug!(
                    slide_number = page.slide_number,
                    cached = summarized.cached,
                    latency_ms = summarized.latency.as_millis() as u64,
                    "slide summarized"
                );
                ctx.events
                    .on_slide_done(page.slide_number, summarized.summary)
                    .await;
                done += 1;
            }
            Err(RetryError::Cancelled) => break,
            Err(RetryError::Upstream(err)) => {
                if ctx.cancel.is_cancelled() {
                    break;
                }
                tracing::error!(
                    slide_number = page.slide_number,
                    error = %err,
                    "slide summarization failed"
                );
                ctx.events
                    .on_slide_error(page.slide_number, err.to_string())
                    .await;
                failed += 1;
            }
        }
    }

    (done, failed)
}
