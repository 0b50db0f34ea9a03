//! Google Search grounding.

use super::{build_request, generate, logged, require_contents};
use genai_kit_client::{GenAiClient, GenerationConfig, GroundingMetadata, Tool};
use genai_kit_core::errors::require_params;
use genai_kit_core::{Contents, Result};
use std::sync::Arc;

/// Text grounded in search results, with the metadata that backs it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroundedResponse {
    /// Answer text.
    pub text: String,
    /// Search queries, sources and supports, when the model searched.
    pub grounding_metadata: Option<GroundingMetadata>,
}

/// Generation with the `googleSearch` tool.
#[derive(Clone)]
pub struct GroundingService {
    client: Arc<dyn GenAiClient>,
}

impl GroundingService {
    /// Create a service.
    pub fn new(client: Arc<dyn GenAiClient>) -> Self {
        Self { client }
    }

    /// Generate with Google Search available to the model.
    pub async fn generate_grounded_content(
        &self,
        model: &str,
        contents: impl Into<Contents>,
        config: Option<GenerationConfig>,
    ) -> Result<GroundedResponse> {
        let contents = contents.into();
        let result: Result<GroundedResponse> = async {
            require_params(&[("model", model)])?;
            require_contents(&contents)?;
            let request = build_request(contents, config).with_tool(Tool::google_search());
            let response = generate(self.client.as_ref(), model, &request).await?;
            Ok(GroundedResponse {
                text: response.text(),
                grounding_metadata: response
                    .first_candidate()
                    .and_then(|c| c.grounding_metadata.clone()),
            })
        }
        .await;
        logged("grounding.generate_grounded_content", result)
    }

    /// Search queries the model ran, for rendering search suggestions.
    pub fn search_suggestions(metadata: Option<&GroundingMetadata>) -> Vec<String> {
        metadata
            .map(|m| m.web_search_queries.clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use genai_kit_client::{Candidate, GenerateContentResponse, MockClient};
    use genai_kit_core::Content;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_grounded_content_returns_metadata() {
        let metadata = GroundingMetadata {
            web_search_queries: vec!["euro 2024 winner".into()],
            ..Default::default()
        };
        let response = GenerateContentResponse {
            candidates: vec![Candidate {
                content: Some(Content::model("Spain won Euro 2024.")),
                grounding_metadata: Some(metadata.clone()),
                ..Default::default()
            }],
            ..Default::default()
        };
        let mock = MockClient::new().with_response(response);
        let service = GroundingService::new(Arc::new(mock.clone()));

        let grounded = service
            .generate_grounded_content("gemini-2.0-flash", "Who won Euro 2024?", None)
            .await
            .unwrap();

        assert_eq!(grounded.text, "Spain won Euro 2024.");
        assert_eq!(grounded.grounding_metadata, Some(metadata));
        assert_eq!(
            GroundingService::search_suggestions(grounded.grounding_metadata.as_ref()),
            vec!["euro 2024 winner"]
        );
        assert_eq!(
            mock.last_generate_request().unwrap().tools,
            Some(vec![Tool::google_search()])
        );
    }

    #[tokio::test]
    async fn test_ungrounded_answer_has_no_suggestions() {
        let mock = MockClient::new().with_text("Hello");
        let service = GroundingService::new(Arc::new(mock));

        let grounded = service
            .generate_grounded_content("gemini-2.0-flash", "Say hello", None)
            .await
            .unwrap();

        assert!(grounded.grounding_metadata.is_none());
        assert!(GroundingService::search_suggestions(None).is_empty());
    }
}
