//! The URL context tool.

use super::{build_request, generate, logged, require_contents};
use genai_kit_client::{
    GenAiClient, GenerateContentResponse, GenerationConfig, Tool, UrlContextMetadata,
};
use genai_kit_core::errors::require_params;
use genai_kit_core::{Contents, Result};
use std::sync::Arc;

/// Answer plus per-URL retrieval results.
#[derive(Debug, Clone, PartialEq)]
pub struct UrlContextResponse {
    /// Answer text.
    pub text: String,
    /// Which URLs were fetched and how that went.
    pub url_context_metadata: Option<UrlContextMetadata>,
    /// The full response.
    pub response: GenerateContentResponse,
}

/// Lets the model read URLs mentioned in the prompt.
#[derive(Clone)]
pub struct UrlContextService {
    client: Arc<dyn GenAiClient>,
}

impl UrlContextService {
    /// Create a service.
    pub fn new(client: Arc<dyn GenAiClient>) -> Self {
        Self { client }
    }

    /// Generate with the `urlContext` tool.
    pub async fn generate_with_url_context(
        &self,
        model: &str,
        contents: impl Into<Contents>,
        config: Option<GenerationConfig>,
    ) -> Result<UrlContextResponse> {
        let result = self
            .run(model, contents.into(), config, vec![Tool::url_context()])
            .await;
        logged("url_context.generate_with_url_context", result)
    }

    /// Generate with both `urlContext` and `googleSearch`.
    pub async fn generate_with_url_context_and_search(
        &self,
        model: &str,
        contents: impl Into<Contents>,
        config: Option<GenerationConfig>,
    ) -> Result<UrlContextResponse> {
        let result = self
            .run(
                model,
                contents.into(),
                config,
                vec![Tool::url_context(), Tool::google_search()],
            )
            .await;
        logged("url_context.generate_with_url_context_and_search", result)
    }

    async fn run(
        &self,
        model: &str,
        contents: Contents,
        config: Option<GenerationConfig>,
        tools: Vec<Tool>,
    ) -> Result<UrlContextResponse> {
        require_params(&[("model", model)])?;
        require_contents(&contents)?;

        let mut request = build_request(contents, config);
        request.tools = Some(tools);
        let response = generate(self.client.as_ref(), model, &request).await?;

        Ok(UrlContextResponse {
            text: response.text(),
            url_context_metadata: response
                .first_candidate()
                .and_then(|c| c.url_context_metadata.clone()),
            response,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use genai_kit_client::{Candidate, MockClient, UrlMetadata};
    use genai_kit_core::Content;
    use pretty_assertions::assert_eq;

    fn response() -> GenerateContentResponse {
        GenerateContentResponse {
            candidates: vec![Candidate {
                content: Some(Content::model("Both recipes use flour.")),
                url_context_metadata: Some(UrlContextMetadata {
                    url_metadata: vec![UrlMetadata {
                        retrieved_url: "https://example.com/a".into(),
                        url_retrieval_status: "URL_RETRIEVAL_STATUS_SUCCESS".into(),
                    }],
                }),
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_url_context_metadata_extracted() {
        let mock = MockClient::new().with_response(response());
        let service = UrlContextService::new(Arc::new(mock.clone()));

        let result = service
            .generate_with_url_context("gemini-2.5-flash", "Compare https://example.com/a", None)
            .await
            .unwrap();

        assert_eq!(result.text, "Both recipes use flour.");
        let metadata = result.url_context_metadata.unwrap();
        assert_eq!(metadata.url_metadata[0].retrieved_url, "https://example.com/a");
        assert_eq!(
            mock.last_generate_request().unwrap().tools,
            Some(vec![Tool::url_context()])
        );
    }

    #[tokio::test]
    async fn test_with_search_sends_both_tools() {
        let mock = MockClient::new().with_response(response());
        let service = UrlContextService::new(Arc::new(mock.clone()));

        service
            .generate_with_url_context_and_search("gemini-2.5-flash", "Find and compare", None)
            .await
            .unwrap();

        assert_eq!(
            mock.last_generate_request().unwrap().tools,
            Some(vec![Tool::url_context(), Tool::google_search()])
        );
    }

    #[tokio::test]
    async fn test_empty_contents_is_validation() {
        let mock = MockClient::new();
        let service = UrlContextService::new(Arc::new(mock.clone()));
        let err = service
            .generate_with_url_context("gemini-2.5-flash", Vec::<Content>::new(), None)
            .await
            .unwrap_err();
        assert!(err.is_validation());
        assert!(mock.calls().is_empty());
    }
}
