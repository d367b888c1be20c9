//! The progressive summarization pipeline.
//!
//! Three layers, leaf to root:
//!
//! - [`RetryingSummarizer`] executes one summarization call with bounded
//!   retry, exponential backoff, and cooperative cancellation.
//! - [`ProgressiveSummarizer`] fans a document's pages out over a bounded
//!   pool of workers and delivers each slide's result as soon as it settles.
//! - [`SummarySession`] owns the client-visible per-slide state for one
//!   document and the corrective operations on it (single-slide retry, full
//!   regeneration).

mod retry;
mod scheduler;
mod session;

pub use retry::{RetryConfig, RetryError, RetryingSummarizer};
pub use scheduler::{DEFAULT_CONCURRENCY, ProgressiveSummarizer, RunStats};
pub use session::SummarySession;

#[cfg(test)]
mod test_support;
