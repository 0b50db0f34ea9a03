//! Scripted client for tests.
//!
//! [`MockClient`] answers each call from a per-endpoint queue of responses
//! configured up front and records every call it receives. An endpoint whose
//! queue is empty returns [`ClientError::Configuration`], so a test that
//! triggers an unexpected call fails loudly instead of hanging.
//!
//! ```rust
//! use genai_kit_client::{GenAiClient, GenerateContentRequest, MockClient};
//! use genai_kit_core::Content;
//!
//! # tokio_test::block_on(async {
//! let client = MockClient::new().with_text("Hello!");
//! let request = GenerateContentRequest::new(vec![Content::user("Hi")]);
//! let response = client.generate_content("gemini-2.0-flash", &request).await.unwrap();
//! assert_eq!(response.text(), "Hello!");
//! assert_eq!(client.calls().len(), 1);
//! # });
//! ```

use crate::caches::{CachedContent, ListCachedContentsResponse};
use crate::client::{GenAiClient, ResponseStream};
use crate::error::{ClientError, ClientResult};
use crate::files::{File, ListFilesResponse, UploadFile};
use crate::operations::{GenerateVideosRequest, Operation};
use crate::types::{
    CountTokensRequest, CountTokensResponse, GenerateContentRequest, GenerateContentResponse,
};
use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

/// A call received by [`MockClient`].
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
    /// `generate_content`.
    GenerateContent {
        /// Model id.
        model: String,
        /// Request body.
        request: GenerateContentRequest,
    },
    /// `generate_content_stream`.
    GenerateContentStream {
        /// Model id.
        model: String,
        /// Request body.
        request: GenerateContentRequest,
    },
    /// `count_tokens`.
    CountTokens {
        /// Model id.
        model: String,
        /// Request body.
        request: CountTokensRequest,
    },
    /// `generate_videos`.
    GenerateVideos {
        /// Model id.
        model: String,
        /// Request body.
        request: GenerateVideosRequest,
    },
    /// `get_operation`.
    GetOperation(String),
    /// `upload_file`.
    UploadFile(UploadFile),
    /// `get_file`.
    GetFile(String),
    /// `list_files`.
    ListFiles {
        /// Requested page size.
        page_size: Option<u32>,
        /// Page token.
        page_token: Option<String>,
    },
    /// `delete_file`.
    DeleteFile(String),
    /// `download`.
    Download(String),
    /// `create_cache`.
    CreateCache(CachedContent),
    /// `list_caches`.
    ListCaches {
        /// Requested page size.
        page_size: Option<u32>,
        /// Page token.
        page_token: Option<String>,
    },
    /// `update_cache_ttl`.
    UpdateCacheTtl {
        /// Cache name.
        name: String,
        /// New TTL.
        ttl: String,
    },
    /// `delete_cache`.
    DeleteCache(String),
}

#[derive(Debug, Default)]
struct Script {
    generate: VecDeque<ClientResult<GenerateContentResponse>>,
    streams: VecDeque<ClientResult<Vec<ClientResult<GenerateContentResponse>>>>,
    count_tokens: VecDeque<ClientResult<CountTokensResponse>>,
    submissions: VecDeque<ClientResult<Operation>>,
    operations: VecDeque<ClientResult<Operation>>,
    uploads: VecDeque<ClientResult<File>>,
    files: VecDeque<ClientResult<File>>,
    file_pages: VecDeque<ListFilesResponse>,
    downloads: VecDeque<ClientResult<Bytes>>,
    caches: VecDeque<ClientResult<CachedContent>>,
    cache_pages: VecDeque<ListCachedContentsResponse>,
    calls: Vec<RecordedCall>,
}

fn next<T>(queue: &mut VecDeque<ClientResult<T>>, endpoint: &str) -> ClientResult<T> {
    queue.pop_front().unwrap_or_else(|| {
        Err(ClientError::configuration(format!(
            "MockClient has no scripted response for {endpoint}"
        )))
    })
}

/// Scripted [`GenAiClient`]. Clones share the same script and call log.
#[derive(Debug, Clone, Default)]
pub struct MockClient {
    script: Arc<Mutex<Script>>,
}

impl MockClient {
    /// Create an empty mock.
    pub fn new() -> Self {
        Self::default()
    }

    fn push(self, f: impl FnOnce(&mut Script)) -> Self {
        f(&mut self.script.lock());
        self
    }

    /// Queue a `generate_content` response.
    pub fn with_response(self, response: GenerateContentResponse) -> Self {
        self.push(|s| s.generate.push_back(Ok(response)))
    }

    /// Queue a text `generate_content` response.
    pub fn with_text(self, text: impl Into<String>) -> Self {
        self.with_response(GenerateContentResponse::from_text(text))
    }

    /// Queue a `generate_content` failure.
    pub fn with_error(self, error: ClientError) -> Self {
        self.push(|s| s.generate.push_back(Err(error)))
    }

    /// Queue a stream of chunks for `generate_content_stream`.
    pub fn with_stream(self, chunks: Vec<ClientResult<GenerateContentResponse>>) -> Self {
        self.push(|s| s.streams.push_back(Ok(chunks)))
    }

    /// Queue a stream of text chunks.
    pub fn with_text_stream<I, S>(self, texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let chunks = texts
            .into_iter()
            .map(|t| Ok(GenerateContentResponse::from_text(t)))
            .collect();
        self.with_stream(chunks)
    }

    /// Make the next `generate_content_stream` call fail before streaming.
    pub fn with_stream_error(self, error: ClientError) -> Self {
        self.push(|s| s.streams.push_back(Err(error)))
    }

    /// Queue a `count_tokens` result.
    pub fn with_token_count(self, total_tokens: u32) -> Self {
        self.push(|s| {
            s.count_tokens.push_back(Ok(CountTokensResponse {
                total_tokens,
                ..Default::default()
            }))
        })
    }

    /// Queue the handle returned by `generate_videos`.
    pub fn with_submitted_operation(self, operation: Operation) -> Self {
        self.push(|s| s.submissions.push_back(Ok(operation)))
    }

    /// Make the next `generate_videos` call fail.
    pub fn with_submission_error(self, error: ClientError) -> Self {
        self.push(|s| s.submissions.push_back(Err(error)))
    }

    /// Queue a `get_operation` refresh result.
    pub fn with_operation(self, operation: Operation) -> Self {
        self.push(|s| s.operations.push_back(Ok(operation)))
    }

    /// Queue a `get_operation` failure.
    pub fn with_operation_error(self, error: ClientError) -> Self {
        self.push(|s| s.operations.push_back(Err(error)))
    }

    /// Queue the file returned by `upload_file`.
    pub fn with_upload(self, file: File) -> Self {
        self.push(|s| s.uploads.push_back(Ok(file)))
    }

    /// Make the next `upload_file` call fail.
    pub fn with_upload_error(self, error: ClientError) -> Self {
        self.push(|s| s.uploads.push_back(Err(error)))
    }

    /// Queue a `get_file` result.
    pub fn with_file(self, file: File) -> Self {
        self.push(|s| s.files.push_back(Ok(file)))
    }

    /// Queue a `get_file` failure.
    pub fn with_file_error(self, error: ClientError) -> Self {
        self.push(|s| s.files.push_back(Err(error)))
    }

    /// Queue a `list_files` page. Without one, listing returns an empty page.
    pub fn with_file_page(self, page: ListFilesResponse) -> Self {
        self.push(|s| s.file_pages.push_back(page))
    }

    /// Queue `download` bytes.
    pub fn with_download(self, bytes: impl Into<Bytes>) -> Self {
        let bytes = bytes.into();
        self.push(|s| s.downloads.push_back(Ok(bytes)))
    }

    /// Queue a result for `create_cache` or `update_cache_ttl`.
    pub fn with_cache(self, cache: CachedContent) -> Self {
        self.push(|s| s.caches.push_back(Ok(cache)))
    }

    /// Queue a `list_caches` page. Without one, listing returns an empty page.
    pub fn with_cache_page(self, page: ListCachedContentsResponse) -> Self {
        self.push(|s| s.cache_pages.push_back(page))
    }

    /// Every call received so far, in order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.script.lock().calls.clone()
    }

    /// Requests passed to `generate_content` and `generate_content_stream`.
    pub fn generate_requests(&self) -> Vec<GenerateContentRequest> {
        self.script
            .lock()
            .calls
            .iter()
            .filter_map(|c| match c {
                RecordedCall::GenerateContent { request, .. }
                | RecordedCall::GenerateContentStream { request, .. } => Some(request.clone()),
                _ => None,
            })
            .collect()
    }

    /// The last `generate_content` style request, if any.
    pub fn last_generate_request(&self) -> Option<GenerateContentRequest> {
        self.generate_requests().pop()
    }

    /// Number of `get_operation` and `get_file` refreshes received.
    pub fn refresh_count(&self) -> usize {
        self.script
            .lock()
            .calls
            .iter()
            .filter(|c| matches!(c, RecordedCall::GetOperation(_) | RecordedCall::GetFile(_)))
            .count()
    }

    /// Forget recorded calls.
    pub fn clear_calls(&self) {
        self.script.lock().calls.clear();
    }

    fn record(&self, call: RecordedCall) -> parking_lot::MutexGuard<'_, Script> {
        let mut script = self.script.lock();
        script.calls.push(call);
        script
    }
}

#[async_trait]
impl GenAiClient for MockClient {
    async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> ClientResult<GenerateContentResponse> {
        let mut script = self.record(RecordedCall::GenerateContent {
            model: model.to_string(),
            request: request.clone(),
        });
        next(&mut script.generate, "generate_content")
    }

    async fn generate_content_stream(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> ClientResult<ResponseStream> {
        let chunks = {
            let mut script = self.record(RecordedCall::GenerateContentStream {
                model: model.to_string(),
                request: request.clone(),
            });
            next(&mut script.streams, "generate_content_stream")?
        };
        Ok(Box::pin(futures::stream::iter(chunks)))
    }

    async fn count_tokens(
        &self,
        model: &str,
        request: &CountTokensRequest,
    ) -> ClientResult<CountTokensResponse> {
        let mut script = self.record(RecordedCall::CountTokens {
            model: model.to_string(),
            request: request.clone(),
        });
        next(&mut script.count_tokens, "count_tokens")
    }

    async fn generate_videos(
        &self,
        model: &str,
        request: &GenerateVideosRequest,
    ) -> ClientResult<Operation> {
        let mut script = self.record(RecordedCall::GenerateVideos {
            model: model.to_string(),
            request: request.clone(),
        });
        next(&mut script.submissions, "generate_videos")
    }

    async fn get_operation(&self, name: &str) -> ClientResult<Operation> {
        let mut script = self.record(RecordedCall::GetOperation(name.to_string()));
        next(&mut script.operations, "get_operation")
    }

    async fn upload_file(&self, upload: UploadFile) -> ClientResult<File> {
        let mut script = self.record(RecordedCall::UploadFile(upload));
        next(&mut script.uploads, "upload_file")
    }

    async fn get_file(&self, name: &str) -> ClientResult<File> {
        let mut script = self.record(RecordedCall::GetFile(name.to_string()));
        next(&mut script.files, "get_file")
    }

    async fn list_files(
        &self,
        page_size: Option<u32>,
        page_token: Option<&str>,
    ) -> ClientResult<ListFilesResponse> {
        let mut script = self.record(RecordedCall::ListFiles {
            page_size,
            page_token: page_token.map(str::to_string),
        });
        Ok(script.file_pages.pop_front().unwrap_or_default())
    }

    async fn delete_file(&self, name: &str) -> ClientResult<()> {
        drop(self.record(RecordedCall::DeleteFile(name.to_string())));
        Ok(())
    }

    async fn download(&self, uri: &str) -> ClientResult<Bytes> {
        let mut script = self.record(RecordedCall::Download(uri.to_string()));
        next(&mut script.downloads, "download")
    }

    async fn create_cache(&self, cache: &CachedContent) -> ClientResult<CachedContent> {
        let mut script = self.record(RecordedCall::CreateCache(cache.clone()));
        next(&mut script.caches, "create_cache")
    }

    async fn list_caches(
        &self,
        page_size: Option<u32>,
        page_token: Option<&str>,
    ) -> ClientResult<ListCachedContentsResponse> {
        let mut script = self.record(RecordedCall::ListCaches {
            page_size,
            page_token: page_token.map(str::to_string),
        });
        Ok(script.cache_pages.pop_front().unwrap_or_default())
    }

    async fn update_cache_ttl(&self, name: &str, ttl: &str) -> ClientResult<CachedContent> {
        let mut script = self.record(RecordedCall::UpdateCacheTtl {
            name: name.to_string(),
            ttl: ttl.to_string(),
        });
        next(&mut script.caches, "update_cache_ttl")
    }

    async fn delete_cache(&self, name: &str) -> ClientResult<()> {
        drop(self.record(RecordedCall::DeleteCache(name.to_string())));
        Ok(())
    }
}
