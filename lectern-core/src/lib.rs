//! Core types and traits for Lectern.
//!
//! Everything the summarization pipeline depends on lives here: the domain
//! types exchanged between the pipeline and its collaborators, the traits the
//! collaborators implement, and the error taxonomy that drives retry
//! classification.
//!
//! All traits are easily mockable under tests via the `test-utils` feature.

pub mod errors;
mod page_text;
mod slot;
mod summary;
pub mod traits;

pub use errors::{BoxedError, ExtractionError, SummarizeError};
pub use page_text::PageText;
pub use slot::{Progress, SlideSummarySlot, SlotStatus};
pub use summary::{SlideSummary, SummarizedSlide};
pub use traits::*;
