//! Text generation and multi-turn chat.

use super::{build_request, generate, logged, require_contents};
use futures::stream::{BoxStream, StreamExt};
use genai_kit_client::{
    GenAiClient, GenerateContentRequest, GenerateContentResponse, GenerationConfig, Tool,
};
use genai_kit_core::errors::require_params;
use genai_kit_core::{Content, Contents, GenAiError, Result};
use std::sync::Arc;

/// Stream of response chunks with errors already translated.
pub type TextStream = BoxStream<'static, Result<GenerateContentResponse>>;

/// Plain text generation.
#[derive(Clone)]
pub struct TextService {
    client: Arc<dyn GenAiClient>,
}

impl TextService {
    /// Create a service.
    pub fn new(client: Arc<dyn GenAiClient>) -> Self {
        Self { client }
    }

    /// Generate a response for `contents`.
    pub async fn generate_text(
        &self,
        model: &str,
        contents: impl Into<Contents>,
        config: Option<GenerationConfig>,
    ) -> Result<GenerateContentResponse> {
        let contents = contents.into();
        let result: Result<GenerateContentResponse> = async {
            require_params(&[("model", model)])?;
            require_contents(&contents)?;
            generate(self.client.as_ref(), model, &build_request(contents, config)).await
        }
        .await;
        logged("text.generate_text", result)
    }

    /// Stream a response for `contents`. Chunks arrive in order, once.
    pub async fn generate_text_stream(
        &self,
        model: &str,
        contents: impl Into<Contents>,
        config: Option<GenerationConfig>,
    ) -> Result<TextStream> {
        let contents = contents.into();
        let result: Result<TextStream> = async {
            require_params(&[("model", model)])?;
            require_contents(&contents)?;
            let stream = self
                .client
                .generate_content_stream(model, &build_request(contents, config))
                .await?;
            Ok(stream.map(|chunk| chunk.map_err(GenAiError::from)).boxed())
        }
        .await;
        logged("text.generate_text_stream", result)
    }

    /// Start a chat on `model`, optionally seeded with `history`.
    pub fn chat(&self, model: impl Into<String>, history: Vec<Content>) -> ChatSession {
        ChatSession::new(Arc::clone(&self.client), model, history)
    }
}

/// A multi-turn conversation that keeps its own history.
///
/// A failed turn leaves the history as it was before the call.
#[derive(Clone)]
pub struct ChatSession {
    client: Arc<dyn GenAiClient>,
    model: String,
    history: Vec<Content>,
    config: Option<GenerationConfig>,
    tools: Vec<Tool>,
    system_instruction: Option<String>,
}

impl ChatSession {
    /// Create a session.
    pub fn new(
        client: Arc<dyn GenAiClient>,
        model: impl Into<String>,
        history: Vec<Content>,
    ) -> Self {
        Self {
            client,
            model: model.into(),
            history,
            config: None,
            tools: Vec::new(),
            system_instruction: None,
        }
    }

    /// Set the generation config used for every turn.
    #[must_use]
    pub fn with_config(mut self, config: GenerationConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Offer a tool on every turn.
    #[must_use]
    pub fn with_tool(mut self, tool: Tool) -> Self {
        self.tools.push(tool);
        self
    }

    /// Set the system instruction.
    #[must_use]
    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }

    /// The model in use.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// The conversation so far.
    pub fn history(&self) -> &[Content] {
        &self.history
    }

    /// Send a user message and record the model's reply.
    pub async fn send(&mut self, message: impl Into<String>) -> Result<GenerateContentResponse> {
        let message = message.into();
        let result = self.send_turn(message).await;
        logged("chat.send", result)
    }

    async fn send_turn(&mut self, message: String) -> Result<GenerateContentResponse> {
        require_params(&[("model", self.model.as_str()), ("message", message.as_str())])?;

        let mut contents = self.history.clone();
        contents.push(Content::user(message));
        let request = self.request(contents.clone());

        let response = generate(self.client.as_ref(), &self.model, &request).await?;

        let reply = response
            .first_candidate()
            .and_then(|c| c.content.clone())
            .map(|mut c| {
                c.role.get_or_insert_with(|| "model".to_string());
                c
            });
        self.history = contents;
        if let Some(reply) = reply {
            self.history.push(reply);
        }
        Ok(response)
    }

    fn request(&self, contents: Vec<Content>) -> GenerateContentRequest {
        let mut request = GenerateContentRequest::new(contents);
        request.generation_config = self.config.clone();
        if !self.tools.is_empty() {
            request.tools = Some(self.tools.clone());
        }
        if let Some(instruction) = &self.system_instruction {
            request = request.with_system(instruction.clone());
        }
        request
    }
}
