//! Shared fixtures for pipeline tests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use lectern_core::{PageText, SlideSummary, SummarizedSlide, SummaryEvents};
use tokio::sync::Mutex;

/// Builds `count` pages numbered 1..=count with distinct text.
pub fn pages(count: u32) -> Vec<PageText> {
    (1..=count)
        .map(|n| PageText::new(n, format!("Text of slide {n}")))
        .collect()
}

/// A successful summarization result for the given slide.
pub fn summarized(slide_number: u32) -> SummarizedSlide {
    SummarizedSlide {
        summary: SlideSummary::new(
            format!("Slide {slide_number}"),
            vec![format!("Point about slide {slide_number}")],
        ),
        cached: false,
        latency: Duration::ZERO,
    }
}

/// Records every event it receives, for assertions after a run.
#[derive(Default)]
pub struct RecordingEvents {
    pages_ready: AtomicBool,
    done: Mutex<Vec<(u32, SlideSummary)>>,
    errors: Mutex<Vec<(u32, String)>>,
}

impl RecordingEvents {
    pub async fn pages_ready(&self) -> bool {
        self.pages_ready.load(Ordering::SeqCst)
    }

    pub async fn done_slides(&self) -> Vec<u32> {
        self.done.lock().await.iter().map(|(n, _)| *n).collect()
    }

    pub async fn error_slides(&self) -> Vec<u32> {
        self.errors.lock().await.iter().map(|(n, _)| *n).collect()
    }

    pub async fn errors(&self) -> Vec<(u32, String)> {
        self.errors.lock().await.clone()
    }
}

#[async_trait]
impl SummaryEvents for RecordingEvents {
    async fn on_page_texts_ready(&self, _pages: &[PageText]) {
        self.pages_ready.store(true, Ordering::SeqCst);
    }

    async fn on_slide_done(&self, slide_number: u32, summary: SlideSummary) {
        self.done.lock().await.push((slide_number, summary));
    }

    async fn on_slide_error(&self, slide_number: u32, message: String) {
        self.errors.lock().await.push((slide_number, message));
    }
}
