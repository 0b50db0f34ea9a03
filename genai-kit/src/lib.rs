//! # genai-kit - Async Gemini API toolkit for Rust
//!
//! genai-kit wraps the Gemini REST API in task-oriented services: text and
//! chat, image and speech generation, audio, video and document
//! understanding, the File API, context caching, tools (code execution,
//! Google Search, URL context, function calling), thinking models and
//! Veo video generation. With the default `live` feature it also opens
//! bidirectional Live API sessions.
//!
//! ## Quick Start
//!
//! ```ignore
//! use genai_kit::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     genai_kit::logging::init()?;
//!     let services = GenAiServices::from_env()?;
//!
//!     let reply = services
//!         .text
//!         .generate_text("gemini-2.0-flash", "Why is the sky blue?", None)
//!         .await?;
//!     println!("{}", reply.text());
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`genai_kit_core`] - Parts, the response classifier and the error taxonomy
//! - [`genai_kit_polling`] - The long-running operation poller
//! - [`genai_kit_client`] - The [`GenAiClient`] contract, the REST client and a mock
//!
//! ## Long-running jobs
//!
//! Video generation and large uploads finish asynchronously. The services
//! poll them at a fixed interval (10 s for video, 5 s for files) and fail
//! with [`GenAiError::ProcessingFailed`] when the job fails:
//!
//! ```ignore
//! let videos = services
//!     .video
//!     .generate_video_from_text(None, "A timelapse of a city at night", None)
//!     .await?;
//! services.video.download_video(&videos[0].uri, "city.mp4").await?;
//! ```
//!
//! ## Classifying responses
//!
//! ```rust
//! use genai_kit::{classify, Part};
//!
//! let parts = vec![
//!     Part::text("Here is the plot."),
//!     Part::executable_code("PYTHON", "plot()"),
//!     Part::inline_data("image/png", "iVBORw0KGgo="),
//! ];
//! let classified = classify(&parts);
//! assert_eq!(classified.text, vec!["Here is the plot."]);
//! assert_eq!(classified.code, vec!["plot()"]);
//! assert_eq!(classified.images.len(), 1);
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod config;
pub mod logging;
pub mod services;

// ============================================================================
// Crate Re-exports
// ============================================================================

/// Parts, classification and errors.
pub use genai_kit_core as core;

/// The long-running operation poller.
pub use genai_kit_polling as polling;

/// Client contract, REST client and wire types.
pub use genai_kit_client as client;

// ============================================================================
// Flat Re-exports
// ============================================================================

pub use genai_kit_core::{
    classify, Attachment, Blob, ClassifiedParts, Content, ContentBuilder, Contents, GenAiError,
    Part, Result, ValidationError,
};

pub use genai_kit_polling::{
    poll_until_done, CancellationToken, PollConfig, PollError, PollState, Pollable, Poller,
};

pub use genai_kit_client::{
    CachedContent, ClientError, File, FileState, FunctionDeclaration, GeminiClient, GenAiClient,
    GenerateContentRequest, GenerateContentResponse, GenerationConfig, MockClient, Operation,
    Tool, ToolConfig, UploadFile, VideoGenerationParameters,
};

pub use config::ServiceConfig;

pub use services::{
    AudioService, CacheService, ChatSession, CodeExecutionService, DocumentInput,
    DocumentService, DocumentSource, FilesService, FunctionCallingService, GroundedResponse,
    GroundingService, ImageOutput, ImageService, StructuredOutputService, TextService,
    ThinkingOptions, ThinkingResult, ThinkingService, ThinkingUpdate, TokenService,
    UrlContextResponse, UrlContextService, VideoLocator, VideoService,
};

#[cfg(feature = "live")]
pub use services::{LiveConnectOptions, LiveMessage, LiveService, LiveSession};

use std::sync::Arc;

/// Every service over one shared client.
#[derive(Clone)]
pub struct GenAiServices {
    /// Text generation and chat.
    pub text: TextService,
    /// Image generation.
    pub image: ImageService,
    /// Speech and audio understanding.
    pub audio: AudioService,
    /// Veo generation and video understanding.
    pub video: VideoService,
    /// File API.
    pub files: FilesService,
    /// Document summarization.
    pub documents: DocumentService,
    /// Code execution tool.
    pub code_execution: CodeExecutionService,
    /// Google Search grounding.
    pub grounding: GroundingService,
    /// URL context tool.
    pub url_context: UrlContextService,
    /// Thinking models.
    pub thinking: ThinkingService,
    /// Token counting.
    pub tokens: TokenService,
    /// Function calling.
    pub function_calling: FunctionCallingService,
    /// Structured output.
    pub structured_output: StructuredOutputService,
    /// Context caching.
    pub cache: CacheService,
    /// Live API sessions.
    #[cfg(feature = "live")]
    pub live: LiveService,
}

impl GenAiServices {
    /// Build every service over `client`, taking poll settings and the
    /// API key for video download links from `config`.
    pub fn new(client: Arc<dyn GenAiClient>, config: &ServiceConfig) -> Self {
        let files = FilesService::new(Arc::clone(&client)).with_poll_config(config.file_poll.clone());
        let video = VideoService::new(Arc::clone(&client), files.clone())
            .with_poll_config(config.video_poll.clone())
            .with_api_key(config.api_key.clone());

        Self {
            text: TextService::new(Arc::clone(&client)),
            image: ImageService::new(Arc::clone(&client)),
            audio: AudioService::new(Arc::clone(&client), files.clone()),
            video,
            documents: DocumentService::new(Arc::clone(&client), files.clone()),
            code_execution: CodeExecutionService::new(Arc::clone(&client)),
            grounding: GroundingService::new(Arc::clone(&client)),
            url_context: UrlContextService::new(Arc::clone(&client)),
            thinking: ThinkingService::new(Arc::clone(&client)),
            tokens: TokenService::new(Arc::clone(&client)),
            function_calling: FunctionCallingService::new(Arc::clone(&client)),
            structured_output: StructuredOutputService::new(Arc::clone(&client)),
            cache: CacheService::new(client),
            #[cfg(feature = "live")]
            live: LiveService::new(config.api_key.clone()),
            files,
        }
    }

    /// Build over a [`GeminiClient`] configured from `config`.
    pub fn from_config(config: ServiceConfig) -> Result<Self> {
        let client: Arc<dyn GenAiClient> = Arc::new(config.build_client()?);
        Ok(Self::new(client, &config))
    }

    /// Build from `GEMINI_API_KEY` and friends.
    pub fn from_env() -> Result<Self> {
        Self::from_config(ServiceConfig::from_env()?)
    }
}

// ============================================================================
// Prelude
// ============================================================================

/// Prelude for common imports.
pub mod prelude {
    pub use crate::config::ServiceConfig;
    pub use crate::services::*;
    pub use crate::GenAiServices;
    pub use genai_kit_client::{
        FunctionDeclaration, GenAiClient, GenerateContentResponse, GenerationConfig, Tool,
        ToolConfig,
    };
    pub use genai_kit_core::{
        classify, Attachment, ClassifiedParts, Content, Contents, GenAiError, Part, Result,
    };
    pub use genai_kit_polling::PollConfig;
}
