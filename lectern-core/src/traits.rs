//! Traits implemented by the pipeline's collaborators.
//!
//! The pipeline itself never talks to a PDF parser, an HTTP endpoint, or a
//! database; it talks to these traits. Bring your own collaborators by
//! implementing them — everything here is mockable under tests via the
//! `test-utils` feature.

use anyhow::Result;
use async_trait::async_trait;
#[cfg(feature = "test-utils")]
#[doc(hidden)]
use mockall::automock;

use crate::{ExtractionError, PageText, SlideSummary, SummarizeError, SummarizedSlide};

/// Ordered per-page text for one document.
///
/// An implementation is constructed per document locator. Pages must be
/// returned in viewer order with 1-indexed, contiguous slide numbers —
/// reordering or dropping pages breaks the join between text and summaries.
/// Fetching has no side effects and is safe to repeat, but callers should
/// cache the result for the duration of a session.
#[cfg_attr(feature = "test-utils", automock)]
#[async_trait]
pub trait PageTextSource: Send + Sync {
    async fn fetch_page_texts(&self) -> Result<Vec<PageText>, ExtractionError>;
}

/// Summarizes a single slide's text.
///
/// Must be idempotent per `(document_id, slide_number)`: calling twice for
/// the same key may return a cached result but never inconsistent state.
#[cfg_attr(feature = "test-utils", automock)]
#[async_trait]
pub trait SlideSummarizer: Send + Sync {
    async fn summarize(
        &self,
        document_id: &str,
        slide_number: u32,
        slide_text: &str,
    ) -> Result<SummarizedSlide, SummarizeError>;
}

#[async_trait]
/// Use a closure as a summarizer
impl<F> SlideSummarizer for F
where
    F: Fn(&str, u32, &str) -> Result<SummarizedSlide, SummarizeError> + Send + Sync,
{
    async fn summarize(
        &self,
        document_id: &str,
        slide_number: u32,
        slide_text: &str,
    ) -> Result<SummarizedSlide, SummarizeError> {
        self(document_id, slide_number, slide_text)
    }
}

/// Persisted summaries for a document.
#[cfg_attr(feature = "test-utils", automock)]
#[async_trait]
pub trait SummaryStore: Send + Sync {
    /// Deletes every persisted summary for the document. Called before a
    /// full regeneration so the endpoint's cache cannot serve stale results.
    async fn clear_summaries(&self, document_id: &str) -> Result<()>;
}

/// Consumer of per-slide progress during a run.
///
/// `on_page_texts_ready` fires once, before any summarization starts.
/// Completion events arrive in no particular slide order — whichever slide
/// finishes first is delivered first.
#[cfg_attr(feature = "test-utils", automock)]
#[async_trait]
pub trait SummaryEvents: Send + Sync {
    async fn on_page_texts_ready(&self, pages: &[PageText]);
    async fn on_slide_done(&self, slide_number: u32, summary: SlideSummary);
    async fn on_slide_error(&self, slide_number: u32, message: String);
}
