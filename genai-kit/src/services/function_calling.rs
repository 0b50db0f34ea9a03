//! Function calling.

use super::{build_request, generate, logged, require_contents};
use genai_kit_client::{
    FunctionDeclaration, GenAiClient, GenerateContentRequest, GenerateContentResponse,
    GenerationConfig, Tool, ToolConfig,
};
use genai_kit_core::errors::{require_non_empty, require_params};
use genai_kit_core::{Contents, FunctionCall, Result};
use std::sync::Arc;

/// Offers function declarations to the model and returns its response.
///
/// Executing the calls and sending results back is left to the caller;
/// see [`genai_kit_core::Part::function_response`].
#[derive(Clone)]
pub struct FunctionCallingService {
    client: Arc<dyn GenAiClient>,
}

impl FunctionCallingService {
    /// Create a service.
    pub fn new(client: Arc<dyn GenAiClient>) -> Self {
        Self { client }
    }

    /// Generate with `declarations` available. The model decides whether to
    /// call any.
    pub async fn call_with_functions(
        &self,
        model: &str,
        contents: impl Into<Contents>,
        declarations: Vec<FunctionDeclaration>,
        config: Option<GenerationConfig>,
    ) -> Result<GenerateContentResponse> {
        let contents = contents.into();
        let result: Result<GenerateContentResponse> = async {
            let request = self.request(model, contents, declarations, config)?;
            generate(self.client.as_ref(), model, &request).await
        }
        .await;
        logged("function_calling.call_with_functions", result)
    }

    /// Generate with calling mode `ANY`, so the model must call at least one
    /// function and may call several at once.
    pub async fn call_with_parallel_functions(
        &self,
        model: &str,
        contents: impl Into<Contents>,
        declarations: Vec<FunctionDeclaration>,
        config: Option<GenerationConfig>,
    ) -> Result<GenerateContentResponse> {
        let contents = contents.into();
        let result: Result<GenerateContentResponse> = async {
            let request = self
                .request(model, contents, declarations, config)?
                .with_tool_config(ToolConfig::any());
            generate(self.client.as_ref(), model, &request).await
        }
        .await;
        logged("function_calling.call_with_parallel_functions", result)
    }

    /// Function calls in a response, in order.
    pub fn function_calls(response: &GenerateContentResponse) -> Vec<FunctionCall> {
        response.function_calls().into_iter().cloned().collect()
    }

    fn request(
        &self,
        model: &str,
        contents: Contents,
        declarations: Vec<FunctionDeclaration>,
        config: Option<GenerationConfig>,
    ) -> Result<GenerateContentRequest> {
        require_params(&[("model", model)])?;
        require_contents(&contents)?;
        require_non_empty("function_declarations", &declarations)?;
        Ok(build_request(contents, config).with_tool(Tool::functions(declarations)))
    }
}
