//! The code execution tool.

use super::text::ChatSession;
use super::{build_request, generate, logged, require_contents, wrap_api};
use genai_kit_client::{GenAiClient, GenerationConfig, Tool};
use genai_kit_core::errors::require_params;
use genai_kit_core::{classify, ClassifiedParts, Content, Contents, Result};
use std::sync::Arc;

/// Lets the model write and run code, returning what it produced.
#[derive(Clone)]
pub struct CodeExecutionService {
    client: Arc<dyn GenAiClient>,
}

impl CodeExecutionService {
    /// Create a service.
    pub fn new(client: Arc<dyn GenAiClient>) -> Self {
        Self { client }
    }

    /// One-shot generation with code execution enabled.
    pub async fn execute_code(
        &self,
        model: &str,
        contents: impl Into<Contents>,
        config: Option<GenerationConfig>,
    ) -> Result<ClassifiedParts> {
        let contents = contents.into();
        let result: Result<ClassifiedParts> = async {
            require_params(&[("model", model)])?;
            require_contents(&contents)?;
            let request = build_request(contents, config).with_tool(Tool::code_execution());
            let response = generate(self.client.as_ref(), model, &request).await?;
            Ok(classify(response.parts()))
        }
        .await
        .map_err(wrap_api("Failed to execute code"));
        logged("code_execution.execute_code", result)
    }

    /// Continue a conversation with code execution enabled.
    pub async fn execute_code_chat(
        &self,
        model: &str,
        history: Vec<Content>,
        message: &str,
        config: Option<GenerationConfig>,
    ) -> Result<ClassifiedParts> {
        let result: Result<ClassifiedParts> = async {
            require_params(&[("model", model), ("message", message)])?;
            let mut chat = ChatSession::new(Arc::clone(&self.client), model, history)
                .with_tool(Tool::code_execution());
            if let Some(config) = config {
                chat = chat.with_config(config);
            }
            let response = chat.send(message).await?;
            Ok(classify(response.parts()))
        }
        .await
        .map_err(wrap_api("Failed to execute code chat"));
        logged("code_execution.execute_code_chat", result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use genai_kit_client::{GenerateContentResponse, MockClient};
    use genai_kit_core::Part;
    use pretty_assertions::assert_eq;

    fn response() -> GenerateContentResponse {
        GenerateContentResponse::from_parts(vec![
            Part::text("Let me compute that."),
            Part::executable_code("PYTHON", "print(sum(range(10)))"),
            Part::code_execution_result("OUTCOME_OK", "45\n"),
            Part::text("The sum is 45."),
        ])
    }

    #[tokio::test]
    async fn test_execute_code_classifies_parts() {
        let mock = MockClient::new().with_response(response());
        let service = CodeExecutionService::new(Arc::new(mock.clone()));

        let result = service
            .execute_code("gemini-2.0-flash", "Sum 0..10 with code", None)
            .await
            .unwrap();

        assert_eq!(result.text, vec!["Let me compute that.", "The sum is 45."]);
        assert_eq!(result.code, vec!["print(sum(range(10)))"]);
        assert_eq!(result.output, vec!["45\n"]);
        assert_eq!(
            mock.last_generate_request().unwrap().tools,
            Some(vec![Tool::code_execution()])
        );
    }

    #[tokio::test]
    async fn test_chat_sends_history_and_tool() {
        let mock = MockClient::new().with_response(response());
        let service = CodeExecutionService::new(Arc::new(mock.clone()));
        let history = vec![Content::user("Hi"), Content::model("Hello")];

        let result = service
            .execute_code_chat("gemini-2.0-flash", history, "Now sum with code", None)
            .await
            .unwrap();

        assert_eq!(result.output, vec!["45\n"]);
        let request = mock.last_generate_request().unwrap();
        assert_eq!(request.contents.len(), 3);
        assert_eq!(request.tools, Some(vec![Tool::code_execution()]));
    }

    #[tokio::test]
    async fn test_missing_message_is_validation() {
        let mock = MockClient::new();
        let service = CodeExecutionService::new(Arc::new(mock.clone()));
        let err = service
            .execute_code_chat("gemini-2.0-flash", vec![], "", None)
            .await
            .unwrap_err();
        assert!(err.is_validation());
        assert!(mock.calls().is_empty());
    }

    #[tokio::test]
    async fn test_client_failure_is_wrapped() {
        let mock = MockClient::new();
        let service = CodeExecutionService::new(Arc::new(mock));
        let err = service
            .execute_code("gemini-2.0-flash", "run", None)
            .await
            .unwrap_err();
        assert!(err.is_api());
        assert_eq!(err.to_string(), "Failed to execute code");
    }
}
