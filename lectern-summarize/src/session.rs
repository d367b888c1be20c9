//! Client-visible per-slide state for one document.
//!
//! A [`SummarySession`] is the long-lived object a UI holds onto: it owns
//! one slot per slide, runs the progressive pipeline over them, and offers
//! the two corrective operations (retry one slide, regenerate everything).
//! Every run is tagged with a monotonically increasing run id; results
//! arriving from a superseded run are discarded instead of clobbering the
//! slots of the run that replaced it.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use lectern_core::{
    ExtractionError, PageText, PageTextSource, Progress, SlideSummarizer, SlideSummary,
    SlideSummarySlot, SlotStatus, SummaryEvents, SummaryStore,
};
use tokio::sync::{Mutex, RwLock};
use tokio_util::sync::CancellationToken;

use crate::retry::{RetryConfig, RetryError, RetryingSummarizer};
use crate::scheduler::{DEFAULT_CONCURRENCY, ProgressiveSummarizer, RunStats};

/// One document's summarization lifecycle.
pub struct SummarySession {
    document_id: String,
    page_count: usize,
    source: Arc<dyn PageTextSource>,
    summarizer: Arc<dyn SlideSummarizer>,
    store: Arc<dyn SummaryStore>,
    concurrency: usize,
    retry: RetryConfig,
    state: Arc<SessionState>,
}

struct SessionState {
    slots: RwLock<Vec<SlideSummarySlot>>,
    /// Page texts cached by the most recent run, reused by single-slide
    /// retries so they do not re-extract the whole document.
    page_texts: RwLock<Option<Arc<Vec<PageText>>>>,
    /// Id of the run currently allowed to write to the slots.
    run_id: AtomicU64,
    cancel: Mutex<CancellationToken>,
}

impl SessionState {
    fn new(page_count: usize) -> Self {
        let slots = (1..=u32::try_from(page_count).unwrap_or(u32::MAX))
            .map(SlideSummarySlot::pending)
            .collect();
        Self {
            slots: RwLock::new(slots),
            page_texts: RwLock::new(None),
            run_id: AtomicU64::new(0),
            cancel: Mutex::new(CancellationToken::new()),
        }
    }

    async fn set_in_flight(&self, slide_number: u32) {
        let mut slots = self.slots.write().await;
        if let Some(slot) = slots.get_mut(slide_number as usize - 1) {
            *slot = SlideSummarySlot::in_flight(slide_number);
        }
    }
}

/// Applies one run's events to the session, dropping them when the run has
/// been superseded.
struct RunEvents {
    state: Arc<SessionState>,
    run_id: u64,
}

impl RunEvents {
    fn is_current(&self) -> bool {
        self.state.run_id.load(Ordering::SeqCst) == self.run_id
    }

    async fn apply_done(&self, slide_number: u32, summary: SlideSummary) {
        let mut slots = self.state.slots.write().await;
        // Staleness must be checked while holding the slots lock: a new run
        // bumps the id before it resets the slots, so an event from a
        // superseded run that loses the race sees the mismatch here.
        if !self.is_current() {
            tracing::debug!(slide_number, run_id = self.run_id, "discarding stale result");
            return;
        }
        if let Some(slot) = slots.get_mut(slide_number as usize - 1) {
            slot.status = SlotStatus::Done;
            slot.summary = Some(summary);
            slot.error = None;
        }
    }

    async fn apply_error(&self, slide_number: u32, message: String) {
        let mut slots = self.state.slots.write().await;
        if !self.is_current() {
            tracing::debug!(slide_number, run_id = self.run_id, "discarding stale error");
            return;
        }
        if let Some(slot) = slots.get_mut(slide_number as usize - 1) {
            slot.status = SlotStatus::Failed;
            slot.summary = None;
            slot.error = Some(message);
        }
    }
}

#[async_trait]
impl SummaryEvents for RunEvents {
    async fn on_page_texts_ready(&self, pages: &[PageText]) {
        let mut cached = self.state.page_texts.write().await;
        if !self.is_current() {
            return;
        }
        *cached = Some(Arc::new(pages.to_vec()));
    }

    async fn on_slide_done(&self, slide_number: u32, summary: SlideSummary) {
        self.apply_done(slide_number, summary).await;
    }

    async fn on_slide_error(&self, slide_number: u32, message: String) {
        self.apply_error(slide_number, message).await;
    }
}

impl SummarySession {
    pub fn new(
        document_id: impl Into<String>,
        page_count: usize,
        source: Arc<dyn PageTextSource>,
        summarizer: Arc<dyn SlideSummarizer>,
        store: Arc<dyn SummaryStore>,
    ) -> Self {
        Self {
            document_id: document_id.into(),
            page_count,
            source,
            summarizer,
            store,
            concurrency: DEFAULT_CONCURRENCY,
            retry: RetryConfig::default(),
            state: Arc::new(SessionState::new(page_count)),
        }
    }

    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    #[must_use]
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Summarizes every slide, updating the slots as results arrive.
    ///
    /// Starting a run supersedes and cancels any run still in flight for
    /// this session.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractionError`] when page texts cannot be obtained; the
    /// slots are left as they were marked at run start.
    #[tracing::instrument(skip_all, name = "session.generate", fields(document_id = %self.document_id))]
    pub async fn generate(&self) -> Result<RunStats, ExtractionError> {
        let (run_id, cancel) = self.begin_run().await;
        let events = Arc::new(RunEvents {
            state: Arc::clone(&self.state),
            run_id,
        });

        let scheduler = ProgressiveSummarizer {
            source: Arc::clone(&self.source),
            summarizer: Arc::clone(&self.summarizer),
            document_id: self.document_id.clone(),
            page_count: self.page_count,
            concurrency: self.concurrency,
            retry: self.retry,
        };
        scheduler.run(cancel, events).await
    }

    /// Re-summarizes a single slide, reusing page texts cached by an
    /// earlier run when available.
    ///
    /// The outcome lands on the slide's slot. A cancelled retry leaves the
    /// slot in flight for the run that superseded it.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractionError::MissingSlide`] when the slide number is
    /// outside the document, or the underlying extraction error when page
    /// texts had to be refetched and could not be.
    #[tracing::instrument(skip(self), name = "session.retry_slide", fields(document_id = %self.document_id))]
    pub async fn retry_slide(&self, slide_number: u32) -> Result<(), ExtractionError> {
        let text = self.slide_text(slide_number).await?;

        let (run_id, cancel) = {
            let guard = self.state.cancel.lock().await;
            (self.state.run_id.load(Ordering::SeqCst), guard.clone())
        };
        self.state.set_in_flight(slide_number).await;

        let events = RunEvents {
            state: Arc::clone(&self.state),
            run_id,
        };
        let executor = RetryingSummarizer::new(Arc::clone(&self.summarizer), self.retry);
        match executor
            .summarize(&self.document_id, slide_number, &text, &cancel)
            .await
        {
            Ok(summarized) => events.apply_done(slide_number, summarized.summary).await,
            Err(RetryError::Cancelled) => {
                tracing::debug!(slide_number, "slide retry cancelled");
            }
            Err(RetryError::Upstream(err)) => {
                events.apply_error(slide_number, err.to_string()).await;
            }
        }
        Ok(())
    }

    /// Clears every persisted summary for the document and runs a fresh
    /// full pass, so nothing is served from the endpoint's cache.
    ///
    /// # Errors
    ///
    /// Returns an error when clearing the store fails or when the fresh run
    /// cannot obtain page texts.
    #[tracing::instrument(skip_all, name = "session.regenerate_all", fields(document_id = %self.document_id))]
    pub async fn regenerate_all(&self) -> anyhow::Result<RunStats> {
        self.store.clear_summaries(&self.document_id).await?;
        Ok(self.generate().await?)
    }

    /// Cancels the run in flight, if any. Slots keep whatever state they
    /// had; results still in flight are discarded.
    pub async fn cancel(&self) {
        let mut guard = self.state.cancel.lock().await;
        guard.cancel();
        *guard = CancellationToken::new();
    }

    /// Snapshot of every slide's slot, in slide order.
    pub async fn slots(&self) -> Vec<SlideSummarySlot> {
        self.state.slots.read().await.clone()
    }

    pub async fn progress(&self) -> Progress {
        let slots = self.state.slots.read().await;
        Progress {
            settled: slots.iter().filter(|slot| slot.is_settled()).count(),
            total: slots.len(),
        }
    }

    /// Installs a fresh cancellation token and marks every slot in flight.
    ///
    /// The token swap and the run id bump happen under the same mutex that
    /// `retry_slide` reads them through, so a retry can never pair the new
    /// token with the old run id. The id is bumped before the slots are
    /// reset, which is what makes the under-lock staleness check in
    /// [`RunEvents`] sound.
    async fn begin_run(&self) -> (u64, CancellationToken) {
        let (run_id, token) = {
            let mut guard = self.state.cancel.lock().await;
            guard.cancel();
            *guard = CancellationToken::new();
            let run_id = self.state.run_id.fetch_add(1, Ordering::SeqCst) + 1;
            (run_id, guard.clone())
        };

        let mut slots = self.state.slots.write().await;
        *slots = (1..=u32::try_from(self.page_count).unwrap_or(u32::MAX))
            .map(SlideSummarySlot::in_flight)
            .collect();
        (run_id, token)
    }

    async fn slide_text(&self, slide_number: u32) -> Result<String, ExtractionError> {
        if slide_number == 0 || slide_number as usize > self.page_count {
            return Err(ExtractionError::MissingSlide(slide_number));
        }

        if let Some(pages) = self.state.page_texts.read().await.as_ref() {
            if let Some(page) = pages.iter().find(|page| page.slide_number == slide_number) {
                return Ok(page.text.clone());
            }
        }

        let pages = Arc::new(self.source.fetch_page_texts().await?);
        let text = pages
            .iter()
            .find(|page| page.slide_number == slide_number)
            .map(|page| page.text.clone())
            .ok_or(ExtractionError::MissingSlide(slide_number))?;

        let mut cached = self.state.page_texts.write().await;
        *cached = Some(pages);
        Ok(text)
    }
}
