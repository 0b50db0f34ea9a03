//! # genai-kit-client
//!
//! Transport layer for the Gemini Developer API.
//!
//! - **[`GenAiClient`]**: the async contract the service layer is written
//!   against
//! - **[`GeminiClient`]**: `reqwest` implementation with API-key auth, SSE
//!   streaming and the resumable upload protocol
//! - **[`MockClient`]**: scripted implementation for tests
//! - Wire types for content generation, long-running video operations, the
//!   File API and context caches
//!
//! ## Example
//!
//! ```rust,no_run
//! use genai_kit_client::{GeminiClient, GenAiClient, GenerateContentRequest};
//! use genai_kit_core::Content;
//!
//! # async fn run() -> genai_kit_client::ClientResult<()> {
//! let client = GeminiClient::new(std::env::var("GEMINI_API_KEY").unwrap_or_default());
//! let request = GenerateContentRequest::new(vec![Content::user("Hello")]);
//! let response = client.generate_content("gemini-2.0-flash", &request).await?;
//! println!("{}", response.text());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod caches;
pub mod client;
pub mod error;
pub mod files;
pub mod gemini;
pub mod mock;
pub mod operations;
pub mod stream;
pub mod types;

pub use caches::{format_ttl, CacheUsageMetadata, CachedContent, ListCachedContentsResponse};
pub use client::{GenAiClient, ResponseStream};
pub use error::{ClientError, ClientResult};
pub use files::{File, FileState, FileStatus, ListFilesResponse, UploadFile};
pub use gemini::{GeminiClient, DEFAULT_API_VERSION, DEFAULT_BASE_URL};
pub use mock::{MockClient, RecordedCall};
pub use operations::{
    AspectRatio, GenerateVideosRequest, GeneratedVideo, Operation, OperationError,
    PersonGeneration, Video, VideoGenerationParameters, VideoImage, VideoInstance,
};
pub use stream::SseResponseStream;
pub use types::{
    Candidate, CountTokensRequest, CountTokensResponse, FunctionCallingConfig,
    FunctionDeclaration, GenerateContentRequest, GenerateContentResponse, GenerationConfig,
    GroundingChunk, GroundingMetadata, GroundingSupport, Modality, PromptFeedback,
    SearchEntryPoint, Segment, SpeechConfig, ThinkingConfig, Tool, ToolConfig,
    UrlContextMetadata, UrlMetadata, UsageMetadata, WebChunk,
};

/// Prelude for common imports.
pub mod prelude {
    pub use crate::{
        ClientError, ClientResult, GeminiClient, GenAiClient, GenerateContentRequest,
        GenerateContentResponse, GenerationConfig, MockClient, Tool,
    };
}
