//! Veo video generation and video understanding.

use super::audio::{file_len, file_part, read_bytes};
use super::files::{read_upload, FilesService};
use super::{generate, logged};
use genai_kit_client::{
    GenAiClient, GenerateContentRequest, GenerateVideosRequest, Operation,
    VideoGenerationParameters,
};
use genai_kit_core::errors::require_params;
use genai_kit_core::media::mime_for_path;
use genai_kit_core::{Attachment, Content, ContentBuilder, GenAiError, Part, Result, INLINE_DATA_LIMIT};
use genai_kit_polling::{CancellationToken, PollConfig, Poller};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};
use url::Url;

/// Model used when the caller does not name one.
pub const DEFAULT_VIDEO_MODEL: &str = "veo-2.0-generate-001";

const DEFAULT_VIDEO_MIME: &str = "video/mp4";
const DEFAULT_IMAGE_MIME: &str = "image/png";

/// Where a generated video can be fetched from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoLocator {
    /// URI as returned by the operation.
    pub uri: String,
    /// MIME type, when the service reported one.
    pub mime_type: Option<String>,
    /// `uri` with the API key appended when the service holds one,
    /// otherwise identical to `uri`.
    pub download_uri: String,
}

/// Video generation through long-running operations, plus analysis of
/// local and YouTube videos.
#[derive(Clone)]
pub struct VideoService {
    client: Arc<dyn GenAiClient>,
    files: FilesService,
    poll: PollConfig,
    api_key: Option<String>,
    cancel: Option<CancellationToken>,
}

impl VideoService {
    /// Create a service with the video poll preset.
    pub fn new(client: Arc<dyn GenAiClient>, files: FilesService) -> Self {
        Self {
            client,
            files,
            poll: PollConfig::video(),
            api_key: None,
            cancel: None,
        }
    }

    /// Set generation poll behavior.
    #[must_use]
    pub fn with_poll_config(mut self, poll: PollConfig) -> Self {
        self.poll = poll;
        self
    }

    /// Append `key` to every [`VideoLocator::download_uri`].
    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Abort generation waits when `token` is cancelled.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Generate videos from a text prompt and wait for the job to finish.
    pub async fn generate_video_from_text(
        &self,
        model: Option<&str>,
        prompt: &str,
        parameters: Option<VideoGenerationParameters>,
    ) -> Result<Vec<VideoLocator>> {
        let result: Result<Vec<VideoLocator>> = async {
            require_params(&[("prompt", prompt)])?;
            let request = with_parameters(GenerateVideosRequest::from_prompt(prompt), parameters);
            self.run_job(model.unwrap_or(DEFAULT_VIDEO_MODEL), &request).await
        }
        .await;
        logged("video.generate_video_from_text", result)
    }

    /// Generate videos starting from a base64 encoded image.
    pub async fn generate_video_from_image(
        &self,
        model: Option<&str>,
        prompt: &str,
        image_base64: &str,
        mime_type: Option<&str>,
        parameters: Option<VideoGenerationParameters>,
    ) -> Result<Vec<VideoLocator>> {
        let result: Result<Vec<VideoLocator>> = async {
            require_params(&[("prompt", prompt), ("image", image_base64)])?;
            let request = GenerateVideosRequest::from_image(
                prompt,
                image_base64,
                mime_type.unwrap_or(DEFAULT_IMAGE_MIME),
            );
            let request = with_parameters(request, parameters);
            self.run_job(model.unwrap_or(DEFAULT_VIDEO_MODEL), &request).await
        }
        .await;
        logged("video.generate_video_from_image", result)
    }

    /// Download a generated video to `path`, returning the bytes written.
    pub async fn download_video(&self, uri: &str, path: impl AsRef<Path>) -> Result<u64> {
        let path = path.as_ref();
        let result: Result<u64> = async {
            require_params(&[("uri", uri)])?;
            let bytes = self.client.download(uri).await?;
            tokio::fs::write(path, &bytes).await.map_err(|e| {
                GenAiError::api_with_source(format!("Failed to write {}", path.display()), e)
            })?;
            info!(path = %path.display(), bytes = bytes.len(), "Saved video");
            Ok(bytes.len() as u64)
        }
        .await;
        logged("video.download_video", result)
    }

    /// Ask `prompt` about a local video. Files under 20 MB go inline.
    pub async fn analyze_video_file(
        &self,
        model: &str,
        path: impl AsRef<Path>,
        prompt: &str,
    ) -> Result<String> {
        let path = path.as_ref();
        let result: Result<String> = async {
            require_params(&[("model", model), ("prompt", prompt)])?;
            let mime_type = mime_for_path(path, DEFAULT_VIDEO_MIME);

            let parts = if file_len(path).await? >= INLINE_DATA_LIMIT {
                let upload = read_upload(path, Some(mime_type), None).await?;
                let file = self.files.upload_and_wait(upload).await?;
                vec![
                    file_part(file.uri.as_deref(), file.mime_type.as_deref(), mime_type)?,
                    Part::text(prompt),
                ]
            } else {
                let bytes = read_bytes(path).await?;
                vec![
                    Attachment::bytes(&bytes, mime_type).into(),
                    Part::text(prompt),
                ]
            };

            let request = GenerateContentRequest::new(vec![Content::user_parts(parts)]);
            Ok(generate(self.client.as_ref(), model, &request).await?.text())
        }
        .await;
        logged("video.analyze_video_file", result)
    }

    /// Ask `prompt` about a public YouTube video.
    pub async fn analyze_youtube_video(&self, model: &str, url: &str, prompt: &str) -> Result<String> {
        let result: Result<String> = async {
            require_params(&[("model", model), ("url", url), ("prompt", prompt)])?;
            let parts = vec![ContentBuilder::text_part(prompt), Part::file_uri(url)];
            let request = GenerateContentRequest::new(vec![Content::user_parts(parts)]);
            Ok(generate(self.client.as_ref(), model, &request).await?.text())
        }
        .await;
        logged("video.analyze_youtube_video", result)
    }

    async fn run_job(&self, model: &str, request: &GenerateVideosRequest) -> Result<Vec<VideoLocator>> {
        let operation = self.client.generate_videos(model, request).await?;
        if operation.name.is_empty() {
            return Err(GenAiError::api("Video generation did not return an operation name"));
        }
        debug!(operation = %operation.name, model, "Video generation submitted");

        let client = self.client.as_ref();
        let poller = match &self.cancel {
            Some(token) => Poller::new(self.poll.clone()).with_cancellation(token.clone()),
            None => Poller::new(self.poll.clone()),
        };
        let operation = poller
            .run(operation, |op: Operation| async move {
                client.get_operation(&op.name).await
            })
            .await?;

        let locators: Vec<VideoLocator> = operation
            .generated_videos()
            .iter()
            .filter_map(|generated| {
                let video = generated.video.as_ref()?;
                let uri = video.uri.clone().filter(|u| !u.is_empty())?;
                Some(VideoLocator {
                    download_uri: self.download_uri(&uri),
                    mime_type: video.mime_type.clone(),
                    uri,
                })
            })
            .collect();

        if locators.is_empty() {
            warn!(operation = %operation.name, "Video job finished without videos");
        }
        Ok(locators)
    }

    fn download_uri(&self, uri: &str) -> String {
        match &self.api_key {
            Some(key) => append_key(uri, key),
            None => uri.to_string(),
        }
    }
}

fn with_parameters(
    request: GenerateVideosRequest,
    parameters: Option<VideoGenerationParameters>,
) -> GenerateVideosRequest {
    match parameters {
        Some(parameters) => request.with_parameters(parameters),
        None => request,
    }
}

/// Add `key` as a query parameter. Unparseable URIs are returned unchanged.
fn append_key(uri: &str, key: &str) -> String {
    match Url::parse(uri) {
        Ok(mut url) => {
            url.query_pairs_mut().append_pair("key", key);
            url.into()
        }
        Err(err) => {
            warn!(uri, error = %err, "Not appending API key to unparseable URI");
            uri.to_string()
        }
    }
}
