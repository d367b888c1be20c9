//! Concrete collaborators for the Lectern pipeline.
//!
//! Each integration lives behind its own feature flag:
//!
//! - `pdf`: [`pdf::PdfPageSource`], a [`lectern_core::PageTextSource`]
//!   backed by `lopdf`.
//! - `summary-api`: [`summary_api::SummaryApi`], a
//!   [`lectern_core::SlideSummarizer`] and [`lectern_core::SummaryStore`]
//!   backed by an HTTP summarization endpoint.

#[cfg(feature = "pdf")]
pub mod pdf;

#[cfg(feature = "summary-api")]
pub mod summary_api;
