//! The client contract consumed by the service layer.

use crate::caches::{CachedContent, ListCachedContentsResponse};
use crate::error::ClientResult;
use crate::files::{File, ListFilesResponse, UploadFile};
use crate::operations::{GenerateVideosRequest, Operation};
use crate::types::{
    CountTokensRequest, CountTokensResponse, GenerateContentRequest, GenerateContentResponse,
};
use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use std::pin::Pin;

/// One-shot stream of response chunks, in delivery order.
pub type ResponseStream =
    Pin<Box<dyn Stream<Item = ClientResult<GenerateContentResponse>> + Send>>;

/// Operations of the Generative Language API used by genai-kit.
///
/// [`GeminiClient`](crate::GeminiClient) talks to the real service;
/// [`MockClient`](crate::MockClient) serves scripted responses in tests.
#[async_trait]
pub trait GenAiClient: Send + Sync {
    /// `models/{model}:generateContent`.
    async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> ClientResult<GenerateContentResponse>;

    /// `models/{model}:streamGenerateContent`.
    async fn generate_content_stream(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> ClientResult<ResponseStream>;

    /// `models/{model}:countTokens`.
    async fn count_tokens(
        &self,
        model: &str,
        request: &CountTokensRequest,
    ) -> ClientResult<CountTokensResponse>;

    /// Submit a video generation job.
    async fn generate_videos(
        &self,
        model: &str,
        request: &GenerateVideosRequest,
    ) -> ClientResult<Operation>;

    /// Refresh a job handle by resource name.
    async fn get_operation(&self, name: &str) -> ClientResult<Operation>;

    /// Upload a file.
    async fn upload_file(&self, upload: UploadFile) -> ClientResult<File>;

    /// Fetch file metadata, including its processing state.
    async fn get_file(&self, name: &str) -> ClientResult<File>;

    /// List uploaded files, one page at a time.
    async fn list_files(
        &self,
        page_size: Option<u32>,
        page_token: Option<&str>,
    ) -> ClientResult<ListFilesResponse>;

    /// Delete an uploaded file.
    async fn delete_file(&self, name: &str) -> ClientResult<()>;

    /// Fetch the bytes behind a download URI.
    async fn download(&self, uri: &str) -> ClientResult<Bytes>;

    /// Create a context cache.
    async fn create_cache(&self, cache: &CachedContent) -> ClientResult<CachedContent>;

    /// List context caches, one page at a time.
    async fn list_caches(
        &self,
        page_size: Option<u32>,
        page_token: Option<&str>,
    ) -> ClientResult<ListCachedContentsResponse>;

    /// Change a cache's time to live. `ttl` uses the `300s` form.
    async fn update_cache_ttl(&self, name: &str, ttl: &str) -> ClientResult<CachedContent>;

    /// Delete a context cache.
    async fn delete_cache(&self, name: &str) -> ClientResult<()>;
}
