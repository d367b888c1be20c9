//! # Lectern
//!
//! Lectern turns lecture slide decks into per-slide AI summaries,
//! progressively. Instead of blocking until a whole deck is summarized, it
//! extracts every page's text up front, fans the pages out over a bounded
//! pool of concurrent requests, and delivers each slide's summary the moment
//! it is ready. Slow or failed slides never hold up the rest of the deck.
//!
//! - Bounded concurrency against the summarization endpoint
//! - Transient failures (rate limits, 5xx, network errors) retried with
//!   exponential backoff
//! - Cooperative cancellation: a superseded or abandoned run stops claiming
//!   slides and its late results are discarded
//! - Per-slide state with single-slide retry and full regeneration
//! - `tracing` supported for logging throughout
//!
//! ## Example
//!
//! ```no_run
//! # use std::sync::Arc;
//! # use lectern::integrations::pdf::PdfPageSource;
//! # use lectern::integrations::summary_api::SummaryApi;
//! # use lectern::summarize::SummarySession;
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let api = Arc::new(SummaryApi::new("https://notes.example.com/api"));
//! let session = SummarySession::new(
//!     "doc-42",
//!     30,
//!     Arc::new(PdfPageSource::from_path("deck.pdf")),
//!     api.clone(),
//!     api,
//! );
//!
//! session.generate().await?;
//! for slot in session.slots().await {
//!     println!("slide {}: {:?}", slot.slide_number, slot.status);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Feature flags
//!
//! Each integration has a similarly named feature flag; `pdf` and
//! `summary-api` are enabled by default.

#[doc(inline)]
pub use lectern_core::*;

/// The progressive summarization pipeline.
pub mod summarize {
    #[doc(inline)]
    pub use lectern_summarize::*;
}

/// Integrations with concrete document sources and summary endpoints.
pub mod integrations {
    #[doc(inline)]
    pub use lectern_integrations::*;
}
