use std::path::Path;

use async_trait::async_trait;
use itertools::Itertools;
use lectern_core::{ExtractionError, PageText, PageTextSource};
use lopdf::Document;
use tracing::{debug, instrument};

use super::PdfPageSource;

#[async_trait]
impl PageTextSource for PdfPageSource {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn fetch_page_texts(&self) -> Result<Vec<PageText>, ExtractionError> {
        debug!("extracting page texts from PDF");

        let path = self.path.clone();
        tokio::task::spawn_blocking(move || extract_page_texts(&path))
            .await
            .map_err(ExtractionError::parse)?
    }
}

/// Extracts one cleaned text per page, numbered 1..N in viewer order.
fn extract_page_texts(path: &Path) -> Result<Vec<PageText>, ExtractionError> {
    if !path.exists() {
        return Err(ExtractionError::DocumentUnavailable(format!(
            "no such file: {}",
            path.display()
        )));
    }

    let doc = match Document::load(path) {
        Ok(doc) => doc,
        Err(e) if e.to_string().to_lowercase().contains("encrypted") => {
            return Err(ExtractionError::DocumentUnavailable(format!(
                "PDF is encrypted: {}",
                path.display()
            )));
        }
        Err(e) => return Err(ExtractionError::parse(e)),
    };

    // Internal page numbers can be sparse; viewer order with contiguous
    // 1-based slide numbers is what the pipeline joins on.
    let page_numbers = doc.get_pages().keys().copied().sorted().collect::<Vec<_>>();

    let mut pages = Vec::with_capacity(page_numbers.len());
    for (index, page_number) in page_numbers.into_iter().enumerate() {
        let text = doc
            .extract_text(&[page_number])
            .map_err(ExtractionError::parse)?;
        let cleaned = normalize_whitespace(&text);

        debug!(
            page = page_number,
            text_length = cleaned.len(),
            "extracted text from PDF page"
        );

        pages.push(PageText::new(index as u32 + 1, cleaned));
    }

    Ok(pages)
}

/// Collapses runs of whitespace (including line breaks inserted by the text
/// extractor) into single spaces.
fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().join(" ")
}
