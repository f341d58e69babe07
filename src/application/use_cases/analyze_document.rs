use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::application::prompts::render_analysis_prompt;
use crate::application::response_parser::parse_classification;
use crate::application::GenerativeClient;
use crate::domain::{ClassificationOutput, DomainError, GenerateRequest, GenerationConfig};

const TEMPERATURE: f32 = 0.2;
const TOP_P: f32 = 0.9;
const TOP_K: u32 = 40;

/// Classifies one document with a single JSON-constrained completion.
///
/// Stateless between calls: every invocation renders a fresh prompt and
/// returns a fresh record.
pub struct AnalyzeDocumentUseCase {
    client: Arc<dyn GenerativeClient>,
    model: String,
}

impl AnalyzeDocumentUseCase {
    pub fn new(client: Arc<dyn GenerativeClient>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    /// Sampling settings used for every analysis request.
    pub fn generation_config() -> GenerationConfig {
        GenerationConfig::new()
            .with_temperature(TEMPERATURE)
            .with_top_p(TOP_P)
            .with_top_k(TOP_K)
            .with_json_response()
    }

    pub async fn execute(&self, document_text: &str) -> Result<ClassificationOutput, DomainError> {
        self.client.ensure_configured()?;

        info!("Analyzing document with model {}", self.model);
        debug!("Document length: {} bytes", document_text.len());
        let start_time = Instant::now();

        let request = GenerateRequest::new(
            self.model.clone(),
            render_analysis_prompt(document_text),
            Self::generation_config(),
        );

        let raw = self.client.generate(request).await?;
        if raw.trim().is_empty() {
            warn!("Model returned an empty payload");
            return Err(DomainError::upstream(
                "Received an empty response from the AI. Please try again.",
            ));
        }

        let output = parse_classification(&raw)?;

        info!(
            "Classified document {}: {} in {:?}",
            output.document_id,
            output.summary(),
            start_time.elapsed()
        );

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connector::MockGenerativeClient;

    const RESPONSE: &str = r#"{"document_id": "abc", "primary_classification": "HR Documents", "confidence_score": "64", "human_review_required": "true"}"#;

    #[tokio::test]
    async fn test_request_uses_template_and_sampling_settings() {
        let client = Arc::new(MockGenerativeClient::new().with_generate_response(Ok(RESPONSE.to_string())));
        let use_case = AnalyzeDocumentUseCase::new(client.clone(), "test-model");

        let output = use_case.execute("Employee handbook v2").await.expect("analysis");
        assert_eq!(output.confidence_score, 64);
        assert!(output.requires_human_review());

        let requests = client.generate_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].model, "test-model");
        assert!(requests[0].prompt.contains("Employee handbook v2"));
        assert_eq!(requests[0].config.temperature, Some(0.2));
        assert_eq!(requests[0].config.top_p, Some(0.9));
        assert_eq!(requests[0].config.top_k, Some(40));
        assert!(requests[0].config.wants_json());
    }

    #[tokio::test]
    async fn test_empty_document_is_still_sent() {
        let client = Arc::new(MockGenerativeClient::new());
        let use_case = AnalyzeDocumentUseCase::new(client.clone(), "test-model");

        use_case.execute("").await.expect("analysis");

        let requests = client.generate_requests();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].prompt.contains("---\n\n---"));
    }

    #[tokio::test]
    async fn test_empty_payload_is_upstream_error() {
        let client = Arc::new(MockGenerativeClient::new().with_generate_response(Ok("  \n".to_string())));
        let use_case = AnalyzeDocumentUseCase::new(client, "test-model");

        let err = use_case.execute("text").await.unwrap_err();
        assert!(err.is_upstream_error());
    }

    #[tokio::test]
    async fn test_upstream_failure_propagates() {
        let client = Arc::new(
            MockGenerativeClient::new()
                .with_generate_response(Err(DomainError::upstream("500 Internal Server Error"))),
        );
        let use_case = AnalyzeDocumentUseCase::new(client, "test-model");

        let err = use_case.execute("text").await.unwrap_err();
        assert!(err.is_upstream_error());
        assert!(err.to_string().contains("500"));
    }

    #[tokio::test]
    async fn test_missing_credential_skips_the_request() {
        let client = Arc::new(MockGenerativeClient::unconfigured());
        let use_case = AnalyzeDocumentUseCase::new(client.clone(), "test-model");

        let err = use_case.execute("some text").await.unwrap_err();
        assert!(err.is_config_error());
        assert!(client.generate_requests().is_empty());
    }
}
