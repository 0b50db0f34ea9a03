//! Task-oriented services over a [`GenAiClient`].
//!
//! Every service validates its required parameters before touching the
//! network, logs failures with `tracing::error!`, and reports transport
//! failures as [`GenAiError::Api`].

use genai_kit_client::{GenAiClient, GenerateContentRequest, GenerateContentResponse, GenerationConfig};
use genai_kit_core::{Contents, GenAiError, Result};
use tracing::error;

pub mod audio;
pub mod cache;
pub mod code_execution;
pub mod documents;
pub mod files;
pub mod function_calling;
pub mod grounding;
pub mod image;
#[cfg(feature = "live")]
#[cfg_attr(docsrs, doc(cfg(feature = "live")))]
pub mod live;
pub mod structured_output;
pub mod text;
pub mod thinking;
pub mod tokens;
pub mod url_context;
pub mod video;

pub use audio::AudioService;
pub use cache::CacheService;
pub use code_execution::CodeExecutionService;
pub use documents::{DocumentInput, DocumentService, DocumentSource};
pub use files::FilesService;
pub use function_calling::FunctionCallingService;
pub use grounding::{GroundedResponse, GroundingService};
pub use image::{ImageOutput, ImageService};
#[cfg(feature = "live")]
pub use live::{
    LiveConnectOptions, LiveMessage, LiveService, LiveSession, ResponseModality,
    DEFAULT_LIVE_MODEL, LIVE_AUDIO_MIME,
};
pub use structured_output::StructuredOutputService;
pub use text::{ChatSession, TextService};
pub use thinking::{ThinkingOptions, ThinkingResult, ThinkingService, ThinkingUpdate};
pub use tokens::TokenService;
pub use url_context::{UrlContextResponse, UrlContextService};
pub use video::{VideoLocator, VideoService, DEFAULT_VIDEO_MODEL};

/// Log a failed call under `operation` and hand the result back.
pub(crate) fn logged<T>(operation: &'static str, result: Result<T>) -> Result<T> {
    if let Err(err) = &result {
        error!(operation, error = %err, "Gemini call failed");
    }
    result
}

/// Wrap a failure as an API error with `message`, leaving validation and
/// processing failures as they are.
pub(crate) fn wrap_api(message: &'static str) -> impl FnOnce(GenAiError) -> GenAiError {
    move |err| match err {
        GenAiError::Validation(_) | GenAiError::ProcessingFailed(_) => err,
        other => GenAiError::api_with_source(message, other),
    }
}

/// Build a request from caller contents and an optional base config.
pub(crate) fn build_request(
    contents: Contents,
    config: Option<GenerationConfig>,
) -> GenerateContentRequest {
    let request = GenerateContentRequest::new(contents.into_contents());
    match config {
        Some(config) => request.with_generation_config(config),
        None => request,
    }
}

/// Fail with a validation error when `contents` is empty.
pub(crate) fn require_contents(contents: &Contents) -> Result<()> {
    if contents.is_empty() {
        Err(genai_kit_core::ValidationError::missing(["contents"]).into())
    } else {
        Ok(())
    }
}

/// Send `request` to `model`.
pub(crate) async fn generate(
    client: &dyn GenAiClient,
    model: &str,
    request: &GenerateContentRequest,
) -> Result<GenerateContentResponse> {
    Ok(client.generate_content(model, request).await?)
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tracing::{Event, Level, Subscriber};
    use tracing_subscriber::layer::{Context, SubscriberExt};
    use tracing_subscriber::Layer;

    /// Counts `ERROR` events seen by the subscriber it is attached to.
    #[derive(Clone, Default)]
    pub(crate) struct ErrorCounter(Arc<AtomicUsize>);

    impl ErrorCounter {
        pub(crate) fn count(&self) -> usize {
            self.0.load(Ordering::SeqCst)
        }

        pub(crate) fn subscriber(&self) -> impl Subscriber + Send + Sync + 'static {
            tracing_subscriber::registry().with(self.clone())
        }
    }

    impl<S: Subscriber> Layer<S> for ErrorCounter {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            if *event.metadata().level() == Level::ERROR {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }
    }
}
