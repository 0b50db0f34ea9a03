//! Schema-constrained output.

use super::{build_request, generate, logged, require_contents};
use genai_kit_client::{GenAiClient, GenerationConfig};
use genai_kit_core::errors::require_params;
use genai_kit_core::{Contents, GenAiError, Result, ValidationError};
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use std::sync::Arc;

const JSON_MIME: &str = "application/json";

/// Generation constrained to a response schema.
#[derive(Clone)]
pub struct StructuredOutputService {
    client: Arc<dyn GenAiClient>,
}

impl StructuredOutputService {
    /// Create a service.
    pub fn new(client: Arc<dyn GenAiClient>) -> Self {
        Self { client }
    }

    /// Generate raw structured text.
    ///
    /// `config` must carry both `response_mime_type` (`application/json` or
    /// `text/x.enum`) and `response_schema`.
    pub async fn generate_structured_output(
        &self,
        model: &str,
        contents: impl Into<Contents>,
        config: GenerationConfig,
    ) -> Result<String> {
        let contents = contents.into();
        let result: Result<String> = async {
            require_params(&[("model", model)])?;
            require_contents(&contents)?;
            let has_mime = config
                .response_mime_type
                .as_deref()
                .is_some_and(|m| !m.trim().is_empty());
            if !has_mime || config.response_schema.is_none() {
                return Err(ValidationError::new(
                    "Structured output requires response_mime_type and response_schema",
                )
                .into());
            }

            let response =
                generate(self.client.as_ref(), model, &build_request(contents, Some(config)))
                    .await?;
            Ok(response.text())
        }
        .await;
        logged("structured_output.generate_structured_output", result)
    }

    /// Generate JSON matching `schema` and deserialize it into `T`.
    pub async fn generate_json<T: DeserializeOwned>(
        &self,
        model: &str,
        contents: impl Into<Contents>,
        schema: JsonValue,
    ) -> Result<T> {
        let config = GenerationConfig::new().with_schema(JSON_MIME, schema);
        let text = self
            .generate_structured_output(model, contents, config)
            .await?;
        let parsed = serde_json::from_str(&text)
            .map_err(|e| GenAiError::api_with_source("Model output did not match the schema", e));
        logged("structured_output.generate_json", parsed)
    }
}
