//! Thinking models: separating thought summaries from the answer.

use super::{build_request, logged, require_contents};
use futures::future;
use futures::stream::{BoxStream, StreamExt};
use genai_kit_client::{
    GenAiClient, GenerateContentResponse, GenerationConfig, ThinkingConfig, UsageMetadata,
};
use genai_kit_core::errors::require_params;
use genai_kit_core::{Contents, GenAiError, Part, Result};
use std::sync::Arc;

/// Thinking settings for one call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ThinkingOptions {
    /// Ask for thought summaries in the response.
    pub include_thoughts: bool,
    /// Token budget for thinking; model default when unset.
    pub thinking_budget: Option<i32>,
}

impl ThinkingOptions {
    /// Request thought summaries.
    #[must_use]
    pub fn with_thoughts(mut self) -> Self {
        self.include_thoughts = true;
        self
    }

    /// Set the thinking budget.
    #[must_use]
    pub fn with_budget(mut self, budget: i32) -> Self {
        self.thinking_budget = Some(budget);
        self
    }

    fn to_config(self) -> ThinkingConfig {
        ThinkingConfig {
            include_thoughts: self.include_thoughts.then_some(true),
            thinking_budget: self.thinking_budget,
        }
    }
}

/// Answer and thoughts of a finished call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ThinkingResult {
    /// Concatenated answer text.
    pub answer: String,
    /// Concatenated thought summaries.
    pub thoughts: String,
    /// Token usage, including thinking tokens.
    pub usage: Option<UsageMetadata>,
}

/// Running totals after one streamed chunk.
#[derive(Debug, Clone, PartialEq)]
pub struct ThinkingUpdate {
    /// Answer text so far.
    pub answer: String,
    /// Thoughts so far.
    pub thoughts: String,
    /// The chunk that produced this update.
    pub chunk: GenerateContentResponse,
}

/// Stream of cumulative thinking updates.
pub type ThinkingStream = BoxStream<'static, Result<ThinkingUpdate>>;

/// Generation with thinking configured.
#[derive(Clone)]
pub struct ThinkingService {
    client: Arc<dyn GenAiClient>,
}

impl ThinkingService {
    /// Create a service.
    pub fn new(client: Arc<dyn GenAiClient>) -> Self {
        Self { client }
    }

    /// Generate and split the response into answer and thoughts.
    pub async fn generate_thinking_content(
        &self,
        model: &str,
        contents: impl Into<Contents>,
        options: ThinkingOptions,
        config: Option<GenerationConfig>,
    ) -> Result<ThinkingResult> {
        let contents = contents.into();
        let result: Result<ThinkingResult> = async {
            require_params(&[("model", model)])?;
            require_contents(&contents)?;
            let config = config.unwrap_or_default().with_thinking(options.to_config());
            let response = self
                .client
                .generate_content(model, &build_request(contents, Some(config)))
                .await?;

            let mut result = ThinkingResult {
                usage: response.usage_metadata.clone(),
                ..Default::default()
            };
            split_text(response.parts(), &mut result.answer, &mut result.thoughts);
            Ok(result)
        }
        .await;
        logged("thinking.generate_thinking_content", result)
    }

    /// Stream the response. Each update carries the totals so far.
    pub async fn generate_thinking_content_stream(
        &self,
        model: &str,
        contents: impl Into<Contents>,
        options: ThinkingOptions,
        config: Option<GenerationConfig>,
    ) -> Result<ThinkingStream> {
        let contents = contents.into();
        let result: Result<ThinkingStream> = async {
            require_params(&[("model", model)])?;
            require_contents(&contents)?;
            let config = config.unwrap_or_default().with_thinking(options.to_config());
            let stream = self
                .client
                .generate_content_stream(model, &build_request(contents, Some(config)))
                .await?;

            let updates = stream.scan(
                (String::new(), String::new()),
                |(answer, thoughts), chunk| {
                    let update = chunk.map_err(GenAiError::from).map(|chunk| {
                        split_text(chunk.parts(), answer, thoughts);
                        ThinkingUpdate {
                            answer: answer.clone(),
                            thoughts: thoughts.clone(),
                            chunk,
                        }
                    });
                    future::ready(Some(update))
                },
            );
            Ok(updates.boxed())
        }
        .await;
        logged("thinking.generate_thinking_content_stream", result)
    }
}

fn split_text(parts: &[Part], answer: &mut String, thoughts: &mut String) {
    for part in parts {
        match part.as_text() {
            Some(text) if !text.is_empty() => {
                if part.is_thought() {
                    thoughts.push_str(text);
                } else {
                    answer.push_str(text);
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use genai_kit_client::MockClient;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_splits_thoughts_from_answer() {
        let mut response = GenerateContentResponse::from_parts(vec![
            Part::thought("Primes below 10 are 2, 3, 5, 7. "),
            Part::text("There are "),
            Part::thought("Count them."),
            Part::text("four."),
        ]);
        response.usage_metadata = Some(UsageMetadata {
            thoughts_token_count: Some(42),
            ..Default::default()
        });
        let mock = MockClient::new().with_response(response);
        let service = ThinkingService::new(Arc::new(mock.clone()));

        let result = service
            .generate_thinking_content(
                "gemini-2.5-flash",
                "How many primes below 10?",
                ThinkingOptions::default().with_thoughts().with_budget(1024),
                None,
            )
            .await
            .unwrap();

        assert_eq!(result.answer, "There are four.");
        assert_eq!(result.thoughts, "Primes below 10 are 2, 3, 5, 7. Count them.");
        assert_eq!(result.usage.unwrap().thoughts_token_count, Some(42));

        let sent = mock.last_generate_request().unwrap().generation_config.unwrap();
        assert_eq!(
            sent.thinking_config,
            Some(ThinkingConfig {
                include_thoughts: Some(true),
                thinking_budget: Some(1024),
            })
        );
    }

    #[tokio::test]
    async fn test_default_options_leave_thoughts_unset() {
        let mock = MockClient::new().with_text("42");
        let service = ThinkingService::new(Arc::new(mock.clone()));

        service
            .generate_thinking_content("gemini-2.5-flash", "q", ThinkingOptions::default(), None)
            .await
            .unwrap();

        let sent = mock.last_generate_request().unwrap().generation_config.unwrap();
        assert_eq!(sent.thinking_config, Some(ThinkingConfig::default()));
    }

    #[tokio::test]
    async fn test_stream_updates_are_cumulative() {
        let mock = MockClient::new().with_stream(vec![
            Ok(GenerateContentResponse::from_parts(vec![Part::thought("Hmm. ")])),
            Ok(GenerateContentResponse::from_parts(vec![Part::text("The answer ")])),
            Ok(GenerateContentResponse::from_parts(vec![
                Part::thought("Sure."),
                Part::text("is 4."),
            ])),
        ]);
        let service = ThinkingService::new(Arc::new(mock));

        let updates: Vec<ThinkingUpdate> = service
            .generate_thinking_content_stream(
                "gemini-2.5-flash",
                "2+2?",
                ThinkingOptions::default().with_thoughts(),
                None,
            )
            .await
            .unwrap()
            .map(|u| u.unwrap())
            .collect()
            .await;

        let totals: Vec<(&str, &str)> = updates
            .iter()
            .map(|u| (u.answer.as_str(), u.thoughts.as_str()))
            .collect();
        assert_eq!(
            totals,
            vec![
                ("", "Hmm. "),
                ("The answer ", "Hmm. "),
                ("The answer is 4.", "Hmm. Sure."),
            ]
        );
    }
}
