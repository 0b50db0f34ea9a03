//! Token counting.

use super::logged;
use genai_kit_client::{CountTokensRequest, GenAiClient, GenerateContentResponse, UsageMetadata};
use genai_kit_core::errors::{require_non_empty, require_params};
use genai_kit_core::{Attachment, Content, ContentBuilder, Result};
use std::sync::Arc;

/// Counts tokens before sending, and reads usage after.
#[derive(Clone)]
pub struct TokenService {
    client: Arc<dyn GenAiClient>,
}

impl TokenService {
    /// Create a service.
    pub fn new(client: Arc<dyn GenAiClient>) -> Self {
        Self { client }
    }

    /// Tokens in a single prompt.
    pub async fn count_text_tokens(&self, model: &str, text: &str) -> Result<u32> {
        let result: Result<u32> = async {
            require_params(&[("model", model), ("text", text)])?;
            self.count(model, vec![Content::user(text)]).await
        }
        .await;
        logged("tokens.count_text_tokens", result)
    }

    /// Tokens in a whole conversation.
    pub async fn count_chat_tokens(&self, model: &str, history: Vec<Content>) -> Result<u32> {
        let result: Result<u32> = async {
            require_params(&[("model", model)])?;
            require_non_empty("history", &history)?;
            self.count(model, history).await
        }
        .await;
        logged("tokens.count_chat_tokens", result)
    }

    /// Tokens in a prompt plus attachments, counted as one user turn.
    pub async fn count_multimodal_tokens(
        &self,
        model: &str,
        prompt: &str,
        files: Vec<Attachment>,
    ) -> Result<u32> {
        let result: Result<u32> = async {
            require_params(&[("model", model), ("prompt", prompt)])?;
            let parts = ContentBuilder::multimodal_parts(prompt, files);
            self.count(model, vec![Content::user_parts(parts)]).await
        }
        .await;
        logged("tokens.count_multimodal_tokens", result)
    }

    /// Usage reported on a finished response.
    pub fn usage_metadata(response: &GenerateContentResponse) -> Option<&UsageMetadata> {
        response.usage_metadata.as_ref()
    }

    async fn count(&self, model: &str, contents: Vec<Content>) -> Result<u32> {
        let response = self
            .client
            .count_tokens(model, &CountTokensRequest { contents })
            .await?;
        Ok(response.total_tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use genai_kit_client::{MockClient, RecordedCall};
    use genai_kit_core::Part;
    use pretty_assertions::assert_eq;

    fn service(mock: &MockClient) -> TokenService {
        TokenService::new(Arc::new(mock.clone()))
    }

    #[tokio::test]
    async fn test_count_text() {
        let mock = MockClient::new().with_token_count(7);
        assert_eq!(
            service(&mock)
                .count_text_tokens("gemini-2.0-flash", "The quick brown fox")
                .await
                .unwrap(),
            7
        );
        assert_eq!(
            mock.calls(),
            vec![RecordedCall::CountTokens {
                model: "gemini-2.0-flash".into(),
                request: CountTokensRequest {
                    contents: vec![Content::user("The quick brown fox")],
                },
            }]
        );
    }

    #[tokio::test]
    async fn test_count_chat_requires_history() {
        let mock = MockClient::new();
        let err = service(&mock)
            .count_chat_tokens("gemini-2.0-flash", vec![])
            .await
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[tokio::test]
    async fn test_count_multimodal_puts_prompt_first() {
        let mock = MockClient::new().with_token_count(300);
        let tokens = service(&mock)
            .count_multimodal_tokens(
                "gemini-2.0-flash",
                "Describe",
                vec![Attachment::uri("https://files/img", "image/png")],
            )
            .await
            .unwrap();
        assert_eq!(tokens, 300);

        let RecordedCall::CountTokens { request, .. } = &mock.calls()[0] else {
            panic!("expected countTokens");
        };
        assert_eq!(
            request.contents[0].parts,
            vec![Part::text("Describe"), Part::file_data("image/png", "https://files/img")]
        );
    }

    #[test]
    fn test_usage_metadata() {
        let mut response = GenerateContentResponse::from_text("hi");
        assert!(TokenService::usage_metadata(&response).is_none());
        response.usage_metadata = Some(UsageMetadata {
            total_token_count: 12,
            ..Default::default()
        });
        assert_eq!(TokenService::usage_metadata(&response).unwrap().total_token_count, 12);
    }
}
