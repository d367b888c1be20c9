//! HTTP client for a slide summarization endpoint.
//!
//! [`SummaryApi`] implements [`SlideSummarizer`] against a JSON API with a
//! `POST {base}/slide-summary` operation, and [`SummaryStore`] against its
//! `DELETE {base}/documents/{id}/slide-summaries` operation.
//!
//! Failures are classified for the retry layer: network errors, HTTP 429
//! and HTTP 5xx are transient; everything else is permanent.

use std::time::Duration;

use anyhow::Context as _;
use async_trait::async_trait;
use derive_builder::Builder;
use lectern_core::{
    SlideSummarizer, SlideSummary, SummarizeError, SummarizedSlide, SummaryStore,
};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Client for a remote summarization endpoint.
#[derive(Debug, Clone, Builder)]
#[builder(setter(into, strip_option))]
pub struct SummaryApi {
    #[builder(default = "reqwest::Client::new()")]
    client: reqwest::Client,
    /// Endpoint base URL, without a trailing slash.
    base_url: String,
    /// Sent with every request so the endpoint can version its prompt and
    /// invalidate cached summaries when the prompt changes.
    #[builder(default)]
    prompt_version: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SummarizeRequest<'a> {
    doc_id: &'a str,
    slide_index: u32,
    slide_text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    prompt_version: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummarizeResponse {
    summary: SlideSummary,
    #[serde(default)]
    cached: bool,
    #[serde(default)]
    latency_ms: u64,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
    details: Option<String>,
}

impl SummaryApi {
    pub fn builder() -> SummaryApiBuilder {
        SummaryApiBuilder::default()
    }

    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            prompt_version: None,
        }
    }

    /// Reads the endpoint's error body, falling back to the bare status when
    /// the body is absent or not the expected shape.
    async fn error_message(response: reqwest::Response) -> String {
        let status = response.status();
        match response.json::<ErrorBody>().await {
            Ok(body) => match body.details {
                Some(details) => format!("{}: {details}", body.error),
                None => body.error,
            },
            Err(_) => format!("HTTP {}", status.as_u16()),
        }
    }
}

#[async_trait]
impl SlideSummarizer for SummaryApi {
    #[instrument(skip(self, slide_text), fields(base_url = %self.base_url))]
    async fn summarize(
        &self,
        document_id: &str,
        slide_number: u32,
        slide_text: &str,
    ) -> Result<SummarizedSlide, SummarizeError> {
        let request = SummarizeRequest {
            doc_id: document_id,
            slide_index: slide_number,
            slide_text,
            prompt_version: self.prompt_version.as_deref(),
        };

        let response = self
            .client
            .post(format!("{}/slide-summary", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(SummarizeError::transient)?;

        let status = response.status();
        if status.is_success() {
            let body = response
                .json::<SummarizeResponse>()
                .await
                .map_err(SummarizeError::permanent)?;
            debug!(
                slide_number,
                cached = body.cached,
                latency_ms = body.latency_ms,
                "summary received"
            );
            return Ok(SummarizedSlide {
                summary: body.summary,
                cached: body.cached,
                latency: Duration::from_millis(body.latency_ms),
            });
        }

        let message = Self::error_message(response).await;
        if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
            Err(SummarizeError::transient(message))
        } else {
            Err(SummarizeError::permanent(message))
        }
    }
}

#[async_trait]
impl SummaryStore for SummaryApi {
    #[instrument(skip(self), fields(base_url = %self.base_url))]
    async fn clear_summaries(&self, document_id: &str) -> anyhow::Result<()> {
        self.client
            .delete(format!(
                "{}/documents/{document_id}/slide-summaries",
                self.base_url
            ))
            .send()
            .await
            .context("failed to reach summary endpoint")?
            .error_for_status()
            .context("failed to clear persisted summaries")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mounted(status: u16, body: serde_json::Value) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/slide-summary"))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(&server)
            .await;
        server
    }

    #[test_log::test(tokio::test)]
    async fn test_successful_response_is_decoded() {
        let server = mounted(
            200,
            json!({
                "docId": "doc-1",
                "slideIndex": 4,
                "summary": {"title": "Gradient descent", "bullets": ["Step size matters"]},
                "cached": true,
                "model": "gpt-4o-mini",
                "latencyMs": 321
            }),
        )
        .await;
        let api = SummaryApi::new(server.uri());

        let summarized = api
            .summarize("doc-1", 4, "slide text")
            .await
            .unwrap();

        assert_eq!(summarized.summary.title, "Gradient descent");
        assert_eq!(summarized.summary.bullets, vec!["Step size matters"]);
        assert!(summarized.cached);
        assert_eq!(summarized.latency, Duration::from_millis(321));
    }

    #[test_log::test(tokio::test)]
    async fn test_rate_limit_is_transient_with_the_endpoint_message() {
        let server = mounted(429, json!({"error": "rate limited", "details": "slow down"})).await;
        let api = SummaryApi::new(server.uri());

        let err = api.summarize("doc-1", 1, "text").await.unwrap_err();

        assert!(err.is_retryable());
        assert!(err.to_string().contains("rate limited: slow down"));
    }

    #[test_log::test(tokio::test)]
    async fn test_server_errors_are_transient() {
        let server = mounted(503, json!({"error": "upstream overloaded"})).await;
        let api = SummaryApi::new(server.uri());

        let err = api.summarize("doc-1", 1, "text").await.unwrap_err();

        assert!(err.is_retryable());
    }

    #[test_log::test(tokio::test)]
    async fn test_client_errors_are_permanent_with_a_status_fallback() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/slide-summary"))
            .respond_with(ResponseTemplate::new(400))
            .mount(&server)
            .await;
        let api = SummaryApi::new(server.uri());

        let err = api.summarize("doc-1", 1, "text").await.unwrap_err();

        assert!(!err.is_retryable());
        assert!(err.to_string().contains("HTTP 400"));
    }

    #[test_log::test(tokio::test)]
    async fn test_prompt_version_rides_along_in_the_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/slide-summary"))
            .and(body_partial_json(json!({
                "docId": "doc-1",
                "slideIndex": 2,
                "promptVersion": "v3"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "summary": {"title": "T", "bullets": []},
                "cached": false,
                "latencyMs": 10
            })))
            .expect(1)
            .mount(&server)
            .await;

        let api = SummaryApi::builder()
            .base_url(server.uri())
            .prompt_version("v3")
            .build()
            .unwrap();

        api.summarize("doc-1", 2, "text").await.unwrap();
    }

    #[test_log::test(tokio::test)]
    async fn test_clear_summaries_deletes_the_document_summaries() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/documents/doc-1/slide-summaries"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;
        let api = SummaryApi::new(server.uri());

        api.clear_summaries("doc-1").await.unwrap();
    }

    #[test_log::test(tokio::test)]
    async fn test_clear_summaries_surfaces_server_failure() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/documents/doc-1/slide-summaries"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        let api = SummaryApi::new(server.uri());

        assert!(api.clear_summaries("doc-1").await.is_err());
    }
}
