//! Speech synthesis and audio understanding.

use super::files::{read_upload, FilesService};
use super::{generate, logged};
use genai_kit_client::{
    CountTokensRequest, GenAiClient, GenerateContentRequest, GenerationConfig, Modality,
};
use genai_kit_core::content::decode_base64;
use genai_kit_core::errors::require_params;
use genai_kit_core::media::mime_for_path;
use genai_kit_core::{
    classify, Attachment, Content, ContentBuilder, GenAiError, Part, Result, INLINE_DATA_LIMIT,
};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// MIME type assumed for audio files with an unknown extension.
pub const DEFAULT_AUDIO_MIME: &str = "audio/mp3";

/// Text to speech and audio analysis.
#[derive(Clone)]
pub struct AudioService {
    client: Arc<dyn GenAiClient>,
    files: FilesService,
}

impl AudioService {
    /// Create a service. Large files go through `files`.
    pub fn new(client: Arc<dyn GenAiClient>, files: FilesService) -> Self {
        Self { client, files }
    }

    /// Synthesize `text` with a prebuilt voice and return the decoded audio
    /// (raw PCM for the TTS models).
    pub async fn generate_speech(&self, model: &str, text: &str, voice_name: &str) -> Result<Vec<u8>> {
        let result: Result<Vec<u8>> = async {
            require_params(&[("model", model), ("text", text), ("voice_name", voice_name)])?;

            let contents = vec![Content {
                role: None,
                parts: ContentBuilder::multimodal_parts(text, []),
            }];
            let config = GenerationConfig::new()
                .with_modalities(vec![Modality::Audio])
                .with_voice(voice_name);
            let request = GenerateContentRequest::new(contents).with_generation_config(config);

            let response = generate(self.client.as_ref(), model, &request).await?;
            let audio = classify(response.parts())
                .audio
                .into_iter()
                .next()
                .ok_or_else(|| GenAiError::api("Could not extract audio data from TTS response."))?;

            decode_base64(&audio.data)
                .map_err(|e| GenAiError::api_with_source("TTS audio is not valid base64", e))
        }
        .await;
        logged("audio.generate_speech", result)
    }

    /// Ask `prompt` about a local audio file.
    ///
    /// Files under 20 MB are sent inline unless `use_file_api` is set;
    /// larger ones are uploaded first.
    pub async fn analyze_audio_file(
        &self,
        model: &str,
        path: impl AsRef<Path>,
        prompt: &str,
        use_file_api: bool,
    ) -> Result<String> {
        let path = path.as_ref();
        let result: Result<String> = async {
            require_params(&[("model", model), ("prompt", prompt)])?;
            let mime_type = mime_for_path(path, DEFAULT_AUDIO_MIME);

            let parts = if use_file_api || file_len(path).await? >= INLINE_DATA_LIMIT {
                let file_part = self.upload_part(path, mime_type).await?;
                vec![file_part, Part::text(prompt)]
            } else {
                let bytes = read_bytes(path).await?;
                debug!(bytes = bytes.len(), mime_type, "Sending audio inline");
                ContentBuilder::multimodal_parts(prompt, [Attachment::bytes(&bytes, mime_type)])
            };

            let request = GenerateContentRequest::new(vec![Content::user_parts(parts)]);
            Ok(generate(self.client.as_ref(), model, &request).await?.text())
        }
        .await;
        logged("audio.analyze_audio_file", result)
    }

    /// Upload an audio file and count the tokens it costs.
    pub async fn count_audio_tokens(&self, model: &str, path: impl AsRef<Path>) -> Result<u32> {
        let path = path.as_ref();
        let result: Result<u32> = async {
            require_params(&[("model", model)])?;
            let file_part = self
                .upload_part(path, mime_for_path(path, DEFAULT_AUDIO_MIME))
                .await?;
            let request = CountTokensRequest {
                contents: vec![Content::user_parts(vec![file_part])],
            };
            Ok(self.client.count_tokens(model, &request).await?.total_tokens)
        }
        .await;
        logged("audio.count_audio_tokens", result)
    }

    async fn upload_part(&self, path: &Path, mime_type: &str) -> Result<Part> {
        let upload = read_upload(path, Some(mime_type), None).await?;
        let file = self.files.upload_and_wait(upload).await?;
        file_part(file.uri.as_deref(), file.mime_type.as_deref(), mime_type)
    }
}

/// A file-data part for an uploaded file, or an API error if it has no URI.
pub(crate) fn file_part(uri: Option<&str>, mime: Option<&str>, fallback: &str) -> Result<Part> {
    let uri = uri
        .filter(|u| !u.is_empty())
        .ok_or_else(|| GenAiError::api("Uploaded file has no URI"))?;
    Ok(ContentBuilder::file_part(uri, mime.unwrap_or(fallback)))
}

pub(crate) async fn file_len(path: &Path) -> Result<u64> {
    tokio::fs::metadata(path)
        .await
        .map(|m| m.len())
        .map_err(|e| GenAiError::api_with_source(format!("Failed to read {}", path.display()), e))
}

pub(crate) async fn read_bytes(path: &Path) -> Result<Vec<u8>> {
    tokio::fs::read(path)
        .await
        .map_err(|e| GenAiError::api_with_source(format!("Failed to read {}", path.display()), e))
}
