use serde::{Deserialize, Serialize};

/// Plain text extracted from a single page of a document.
///
/// Slide numbers are 1-indexed, contiguous, and match the page numbering of
/// the paired viewer exactly; they are the join key between extracted text
/// and every downstream summary. A sequence of `PageText` is produced once
/// per document per session and is immutable after the fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageText {
    pub slide_number: u32,
    pub text: String,
}

impl PageText {
    pub fn new(slide_number: u32, text: impl Into<String>) -> Self {
        Self {
            slide_number,
            text: text.into(),
        }
    }
}
