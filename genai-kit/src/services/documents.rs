//! Document summarization, inline for small files and through the File API
//! for large ones.

use super::audio::{file_part, read_bytes};
use super::files::{read_upload, FilesService};
use super::{generate, logged, wrap_api};
use genai_kit_client::{File, GenAiClient, GenerateContentRequest, UploadFile};
use genai_kit_core::errors::{require_non_empty, require_params};
use genai_kit_core::media::mime_for_path;
use genai_kit_core::{Attachment, Content, ContentBuilder, Part, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

const DEFAULT_PROMPT: &str = "Summarize this document";
const DEFAULT_MULTI_PROMPT: &str = "Summarize or analyze these documents";
const DEFAULT_MIME: &str = "application/pdf";
const REMOTE_DISPLAY_NAME: &str = "Remote Document";
const LOCAL_DISPLAY_NAME: &str = "Local Document";

/// Where a document comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentInput {
    /// Fetched over HTTP(S).
    Url(String),
    /// Read from disk.
    Path(PathBuf),
}

impl DocumentInput {
    fn label(&self) -> String {
        match self {
            Self::Url(url) => url.clone(),
            Self::Path(path) => path.display().to_string(),
        }
    }
}

/// One document for [`DocumentService::summarize_multiple`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSource {
    /// Location.
    pub input: DocumentInput,
    /// MIME type; `application/pdf` when unset.
    pub mime_type: Option<String>,
    /// Display name for the upload; the location when unset.
    pub display_name: Option<String>,
}

impl DocumentSource {
    /// A remote document.
    pub fn url(url: impl Into<String>) -> Self {
        Self {
            input: DocumentInput::Url(url.into()),
            mime_type: None,
            display_name: None,
        }
    }

    /// A local document.
    pub fn path(path: impl Into<PathBuf>) -> Self {
        Self {
            input: DocumentInput::Path(path.into()),
            mime_type: None,
            display_name: None,
        }
    }

    /// Set the MIME type.
    #[must_use]
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    /// Set the display name.
    #[must_use]
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }
}

/// Summarizes and analyzes documents.
///
/// Validation and processing failures are returned as they are; anything
/// else is wrapped in an API error naming the operation.
#[derive(Clone)]
pub struct DocumentService {
    client: Arc<dyn GenAiClient>,
    files: FilesService,
}

impl DocumentService {
    /// Create a service. Large documents go through `files`.
    pub fn new(client: Arc<dyn GenAiClient>, files: FilesService) -> Self {
        Self { client, files }
    }

    /// Summarize a small remote document sent inline.
    pub async fn summarize_from_url(
        &self,
        model: &str,
        url: &str,
        prompt: Option<&str>,
        mime_type: Option<&str>,
    ) -> Result<String> {
        let result: Result<String> = async {
            require_params(&[("model", model), ("url", url)])?;
            let bytes = self.client.download(url).await?;
            self.summarize_inline(model, &bytes, prompt, mime_type).await
        }
        .await
        .map_err(wrap_api("Failed to summarize document from URL"));
        logged("documents.summarize_from_url", result)
    }

    /// Summarize a small local document sent inline.
    pub async fn summarize_from_file(
        &self,
        model: &str,
        path: impl AsRef<Path>,
        prompt: Option<&str>,
        mime_type: Option<&str>,
    ) -> Result<String> {
        let path = path.as_ref();
        let result: Result<String> = async {
            let path_str = path.to_string_lossy();
            require_params(&[("model", model), ("path", path_str.as_ref())])?;
            let bytes = read_bytes(path).await?;
            self.summarize_inline(model, &bytes, prompt, mime_type).await
        }
        .await
        .map_err(wrap_api("Failed to summarize document from file"));
        logged("documents.summarize_from_file", result)
    }

    /// Summarize a large remote document through the File API.
    pub async fn summarize_large_from_url(
        &self,
        model: &str,
        url: &str,
        prompt: Option<&str>,
        display_name: Option<&str>,
        mime_type: Option<&str>,
    ) -> Result<String> {
        let result: Result<String> = async {
            require_params(&[("model", model), ("url", url)])?;
            let mime_type = mime_type.unwrap_or(DEFAULT_MIME);
            let bytes = self.client.download(url).await?;
            let upload = UploadFile::new(bytes, mime_type)
                .with_display_name(display_name.unwrap_or(REMOTE_DISPLAY_NAME));
            let file = self.files.upload_and_wait(upload).await?;
            let prompt = prompt.unwrap_or(DEFAULT_PROMPT);
            self.summarize_files(model, prompt, &[(file, mime_type.to_string())])
                .await
        }
        .await
        .map_err(wrap_api("Failed to summarize large document from URL"));
        logged("documents.summarize_large_from_url", result)
    }

    /// Summarize a large local document through the File API.
    pub async fn summarize_large_from_file(
        &self,
        model: &str,
        path: impl AsRef<Path>,
        prompt: Option<&str>,
        display_name: Option<&str>,
        mime_type: Option<&str>,
    ) -> Result<String> {
        let path = path.as_ref();
        let result: Result<String> = async {
            let path_str = path.to_string_lossy();
            require_params(&[("model", model), ("path", path_str.as_ref())])?;
            let mime_type = mime_type.unwrap_or_else(|| mime_for_path(path, DEFAULT_MIME));
            let upload = read_upload(
                path,
                Some(mime_type),
                Some(display_name.unwrap_or(LOCAL_DISPLAY_NAME)),
            )
            .await?;
            let file = self.files.upload_and_wait(upload).await?;
            let prompt = prompt.unwrap_or(DEFAULT_PROMPT);
            self.summarize_files(model, prompt, &[(file, mime_type.to_string())])
                .await
        }
        .await
        .map_err(wrap_api("Failed to summarize large document from file"));
        logged("documents.summarize_large_from_file", result)
    }

    /// Upload every document, then ask one question across all of them.
    ///
    /// Documents are uploaded in order and the prompt comes first.
    pub async fn summarize_multiple(
        &self,
        model: &str,
        docs: &[DocumentSource],
        prompt: Option<&str>,
    ) -> Result<String> {
        let result: Result<String> = async {
            require_params(&[("model", model)])?;
            require_non_empty("docs", docs)?;

            let mut uploaded = Vec::with_capacity(docs.len());
            for doc in docs {
                let mime_type = doc.mime_type.as_deref().unwrap_or(DEFAULT_MIME);
                let display_name = doc.display_name.clone().unwrap_or_else(|| doc.input.label());
                let upload = match &doc.input {
                    DocumentInput::Url(url) => {
                        require_params(&[("url", url.as_str())])?;
                        UploadFile::new(self.client.download(url).await?, mime_type)
                            .with_display_name(display_name)
                    }
                    DocumentInput::Path(path) => {
                        read_upload(path, Some(mime_type), Some(display_name.as_str())).await?
                    }
                };
                let file = self.files.upload_and_wait(upload).await?;
                debug!(file = %file.name, "Document ready");
                uploaded.push((file, mime_type.to_string()));
            }

            self.summarize_files(model, prompt.unwrap_or(DEFAULT_MULTI_PROMPT), &uploaded)
                .await
        }
        .await
        .map_err(wrap_api("Failed to summarize multiple documents"));
        logged("documents.summarize_multiple", result)
    }

    async fn summarize_inline(
        &self,
        model: &str,
        bytes: &[u8],
        prompt: Option<&str>,
        mime_type: Option<&str>,
    ) -> Result<String> {
        let parts = ContentBuilder::multimodal_parts(
            prompt.unwrap_or(DEFAULT_PROMPT),
            [Attachment::bytes(bytes, mime_type.unwrap_or(DEFAULT_MIME))],
        );
        let request = GenerateContentRequest::new(vec![Content::user_parts(parts)]);
        Ok(generate(self.client.as_ref(), model, &request).await?.text())
    }

    async fn summarize_files(
        &self,
        model: &str,
        prompt: &str,
        files: &[(File, String)],
    ) -> Result<String> {
        let mut parts = vec![Part::text(prompt)];
        for (file, fallback) in files {
            parts.push(file_part(file.uri.as_deref(), file.mime_type.as_deref(), fallback)?);
        }
        let request = GenerateContentRequest::new(vec![Content::user_parts(parts)]);
        Ok(generate(self.client.as_ref(), model, &request).await?.text())
    }
}
