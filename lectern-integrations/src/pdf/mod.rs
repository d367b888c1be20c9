//! Slide deck text extraction from PDF files.
//!
//! [`PdfPageSource`] reads a PDF from disk and exposes one cleaned-up text
//! blob per page, in viewer order, as a [`lectern_core::PageTextSource`].
//!
//! # Example
//!
//! ```no_run
//! # use lectern_integrations::pdf::PdfPageSource;
//! let source = PdfPageSource::from_path("deck.pdf");
//! ```

use std::{
    fmt,
    path::{Path, PathBuf},
};

use derive_builder::Builder;

mod source;

/// Extracts per-page text from a PDF slide deck.
///
/// Pages are numbered 1..N in viewer order regardless of how the PDF
/// numbers them internally, so the extracted texts line up with the slide
/// numbers the rest of the pipeline uses. Blank pages (images, scanned
/// content) are kept as empty texts rather than dropped, preserving the
/// page-to-slide alignment.
#[derive(Debug, Clone, Builder)]
#[builder(setter(into, strip_option))]
pub struct PdfPageSource {
    /// Path to the PDF file to extract from.
    path: PathBuf,
}

impl PdfPageSource {
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn builder() -> PdfPageSourceBuilder {
        PdfPageSourceBuilder::default()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl fmt::Display for PdfPageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PdfPageSource({})", self.path.display())
    }
}
