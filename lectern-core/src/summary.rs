use std::time::Duration;

use serde::{Deserialize, Serialize};

/// A structured summary of one slide: a short title plus bullet points.
///
/// The pipeline passes this value through unchanged; how it is rendered or
/// persisted is up to the consumer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlideSummary {
    pub title: String,
    pub bullets: Vec<String>,
}

impl SlideSummary {
    pub fn new(title: impl Into<String>, bullets: Vec<String>) -> Self {
        Self {
            title: title.into(),
            bullets,
        }
    }
}

/// Response envelope for a single summarization call.
///
/// `cached` is true when the endpoint answered from its server-side cache for
/// this `(document, slide)` key instead of generating a fresh summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummarizedSlide {
    pub summary: SlideSummary,
    pub cached: bool,
    pub latency: Duration,
}
