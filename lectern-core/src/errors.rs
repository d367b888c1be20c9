//! Error taxonomy shared by the pipeline and its collaborators.
//!
//! The split between [`SummarizeError::Transient`] and
//! [`SummarizeError::Permanent`] drives retry classification: transient
//! failures (rate limits, flaky upstreams, network errors) are retried with
//! backoff, permanent ones are surfaced immediately. Cancellation is *not*
//! an error in this taxonomy; it is reported separately by the pipeline and
//! must never be recorded as a slide failure.

use thiserror::Error;

pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Page text could not be obtained for a document.
///
/// Fatal to a whole run: without page texts no slide can be summarized, so
/// this is surfaced once at the document level, never per slide.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("document could not be loaded: {0}")]
    DocumentUnavailable(String),

    #[error("failed to extract page text: {0}")]
    Parse(#[source] BoxedError),

    #[error("no text available for slide {0}")]
    MissingSlide(u32),
}

impl ExtractionError {
    pub fn parse(err: impl Into<BoxedError>) -> Self {
        Self::Parse(err.into())
    }
}

/// A summarization call failed.
#[derive(Debug, Error)]
pub enum SummarizeError {
    /// Rate limit, transient upstream failure, or network error. Retryable.
    #[error("transient error from summary endpoint: {0}")]
    Transient(#[source] BoxedError),

    /// Bad request, malformed response, or persistent failure. Not retryable.
    #[error("permanent error from summary endpoint: {0}")]
    Permanent(#[source] BoxedError),
}

impl SummarizeError {
    pub fn transient(err: impl Into<BoxedError>) -> Self {
        Self::Transient(err.into())
    }

    pub fn permanent(err: impl Into<BoxedError>) -> Self {
        Self::Permanent(err.into())
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}
