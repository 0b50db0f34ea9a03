//! Generative Language API client over HTTPS.

use crate::caches::{CachedContent, ListCachedContentsResponse};
use crate::client::{GenAiClient, ResponseStream};
use crate::error::{ClientError, ClientResult};
use crate::files::{File, ListFilesResponse, UploadFile, UploadResponse};
use crate::operations::{GenerateVideosRequest, Operation};
use crate::stream::SseResponseStream;
use crate::types::{
    ApiErrorEnvelope, CountTokensRequest, CountTokensResponse, GenerateContentRequest,
    GenerateContentResponse,
};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Default API host.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Default API version path segment.
pub const DEFAULT_API_VERSION: &str = "v1beta";

const API_KEY_HEADER: &str = "x-goog-api-key";
const UPLOAD_URL_HEADER: &str = "x-goog-upload-url";

/// Client for the Gemini Developer API, authenticated with an API key.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
    api_version: String,
    default_timeout: Duration,
}

impl GeminiClient {
    /// Create a client for `api_key`.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            default_timeout: Duration::from_secs(120),
        }
    }

    /// Set the base URL.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the API version segment.
    #[must_use]
    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    /// Set a custom HTTP client.
    #[must_use]
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    /// Set the per-request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}/{}", self.base_url, self.api_version, path)
    }

    fn model_action(&self, model: &str, action: &str) -> String {
        self.endpoint(&format!("{}:{}", resource_name("models/", model), action))
    }

    fn authed(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header(API_KEY_HEADER, &self.api_key)
            .timeout(self.default_timeout)
    }

    /// Whether `uri` points at the API host, and so should carry the key.
    fn is_api_host(&self, uri: &str) -> bool {
        match (Url::parse(uri), Url::parse(&self.base_url)) {
            (Ok(target), Ok(base)) => target.host_str() == base.host_str(),
            _ => false,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> ClientResult<Response> {
        self.dispatch(self.authed(builder)).await
    }

    async fn dispatch(&self, builder: RequestBuilder) -> ClientResult<Response> {
        let response = builder.send().await?;
        let status = response.status().as_u16();
        if response.status().is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(handle_error_response(status, &body))
    }

    async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> ClientResult<T> {
        self.send(builder)
            .await?
            .json()
            .await
            .map_err(|e| ClientError::invalid_response(e.to_string()))
    }
}

/// Prefix `name` with `prefix` unless it already carries it.
fn resource_name(prefix: &str, name: &str) -> String {
    if name.starts_with(prefix) {
        name.to_string()
    } else {
        format!("{prefix}{name}")
    }
}

fn page_query(page_size: Option<u32>, page_token: Option<&str>) -> Vec<(&'static str, String)> {
    let mut query = Vec::new();
    if let Some(size) = page_size {
        query.push(("pageSize", size.to_string()));
    }
    if let Some(token) = page_token {
        query.push(("pageToken", token.to_string()));
    }
    query
}

/// Map a non-2xx response to a [`ClientError`].
fn handle_error_response(status: u16, body: &str) -> ClientError {
    if let Ok(err) = serde_json::from_str::<ApiErrorEnvelope>(body) {
        let message = err.error.message;
        return match status {
            401 | 403 => ClientError::Authentication(message),
            404 => ClientError::NotFound(message),
            429 => ClientError::RateLimited { retry_after: None },
            _ => ClientError::Api {
                status,
                message,
                code: err.error.status,
            },
        };
    }

    ClientError::http(status, body)
}

#[async_trait]
impl GenAiClient for GeminiClient {
    async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> ClientResult<GenerateContentResponse> {
        let url = self.model_action(model, "generateContent");
        debug!(model, contents = request.contents.len(), "Sending generateContent");
        self.send_json(self.client.post(&url).json(request)).await
    }

    async fn generate_content_stream(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> ClientResult<ResponseStream> {
        let url = self.model_action(model, "streamGenerateContent");
        debug!(model, "Opening streamGenerateContent");
        let response = self
            .send(self.client.post(&url).query(&[("alt", "sse")]).json(request))
            .await?;
        Ok(Box::pin(SseResponseStream::new(response.bytes_stream())))
    }

    async fn count_tokens(
        &self,
        model: &str,
        request: &CountTokensRequest,
    ) -> ClientResult<CountTokensResponse> {
        let url = self.model_action(model, "countTokens");
        self.send_json(self.client.post(&url).json(request)).await
    }

    async fn generate_videos(
        &self,
        model: &str,
        request: &GenerateVideosRequest,
    ) -> ClientResult<Operation> {
        let url = self.model_action(model, "predictLongRunning");
        debug!(model, "Submitting video generation");
        self.send_json(self.client.post(&url).json(request)).await
    }

    async fn get_operation(&self, name: &str) -> ClientResult<Operation> {
        debug!(operation = name, "Refreshing operation");
        self.send_json(self.client.get(self.endpoint(name))).await
    }

    async fn upload_file(&self, upload: UploadFile) -> ClientResult<File> {
        let start_url = format!("{}/upload/{}/files", self.base_url, self.api_version);
        let mut metadata = serde_json::Map::new();
        if let Some(name) = &upload.display_name {
            metadata.insert("displayName".into(), name.clone().into());
        }
        let length = upload.bytes.len().to_string();

        debug!(
            bytes = upload.bytes.len(),
            mime_type = %upload.mime_type,
            "Starting resumable upload"
        );
        let start = self
            .send(
                self.client
                    .post(&start_url)
                    .header("X-Goog-Upload-Protocol", "resumable")
                    .header("X-Goog-Upload-Command", "start")
                    .header("X-Goog-Upload-Header-Content-Length", &length)
                    .header("X-Goog-Upload-Header-Content-Type", &upload.mime_type)
                    .json(&serde_json::json!({ "file": metadata })),
            )
            .await?;

        let session_url = start
            .headers()
            .get(UPLOAD_URL_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| ClientError::invalid_response("upload start returned no upload URL"))?;

        let finished: UploadResponse = self
            .send_json(
                self.client
                    .post(&session_url)
                    .header("Content-Length", &length)
                    .header("X-Goog-Upload-Offset", "0")
                    .header("X-Goog-Upload-Command", "upload, finalize")
                    .body(upload.bytes),
            )
            .await?;

        debug!(file = %finished.file.name, state = ?finished.file.state, "Upload finished");
        Ok(finished.file)
    }

    async fn get_file(&self, name: &str) -> ClientResult<File> {
        let url = self.endpoint(&resource_name("files/", name));
        self.send_json(self.client.get(&url)).await
    }

    async fn list_files(
        &self,
        page_size: Option<u32>,
        page_token: Option<&str>,
    ) -> ClientResult<ListFilesResponse> {
        let url = self.endpoint("files");
        self.send_json(self.client.get(&url).query(&page_query(page_size, page_token)))
            .await
    }

    async fn delete_file(&self, name: &str) -> ClientResult<()> {
        let url = self.endpoint(&resource_name("files/", name));
        self.send(self.client.delete(&url)).await?;
        Ok(())
    }

    async fn download(&self, uri: &str) -> ClientResult<Bytes> {
        let builder = self.client.get(uri);
        let builder = if self.is_api_host(uri) {
            self.authed(builder)
        } else {
            builder.timeout(self.default_timeout)
        };
        debug!(uri, "Downloading");
        Ok(self.dispatch(builder).await?.bytes().await?)
    }

    async fn create_cache(&self, cache: &CachedContent) -> ClientResult<CachedContent> {
        let url = self.endpoint("cachedContents");
        self.send_json(self.client.post(&url).json(cache)).await
    }

    async fn list_caches(
        &self,
        page_size: Option<u32>,
        page_token: Option<&str>,
    ) -> ClientResult<ListCachedContentsResponse> {
        let url = self.endpoint("cachedContents");
        self.send_json(self.client.get(&url).query(&page_query(page_size, page_token)))
            .await
    }

    async fn update_cache_ttl(&self, name: &str, ttl: &str) -> ClientResult<CachedContent> {
        let url = self.endpoint(&resource_name("cachedContents/", name));
        self.send_json(
            self.client
                .patch(&url)
                .query(&[("updateMask", "ttl")])
                .json(&serde_json::json!({ "ttl": ttl })),
        )
        .await
    }

    async fn delete_cache(&self, name: &str) -> ClientResult<()> {
        let url = self.endpoint(&resource_name("cachedContents/", name));
        self.send(self.client.delete(&url)).await?;
        Ok(())
    }
}
