//! File API management.

use super::logged;
use genai_kit_client::{File, GenAiClient, UploadFile};
use genai_kit_core::errors::require_params;
use genai_kit_core::{GenAiError, Result};
use genai_kit_polling::{CancellationToken, PollConfig, Poller};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Page size used when draining `files.list`.
const LIST_PAGE_SIZE: u32 = 10;

/// Uploads, inspects, lists and deletes files.
#[derive(Clone)]
pub struct FilesService {
    client: Arc<dyn GenAiClient>,
    poll: PollConfig,
    cancel: Option<CancellationToken>,
}

impl FilesService {
    /// Create a service with the file-processing poll preset.
    pub fn new(client: Arc<dyn GenAiClient>) -> Self {
        Self {
            client,
            poll: PollConfig::file_processing(),
            cancel: None,
        }
    }

    /// Set processing poll behavior.
    #[must_use]
    pub fn with_poll_config(mut self, poll: PollConfig) -> Self {
        self.poll = poll;
        self
    }

    /// Abort processing waits when `token` is cancelled.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Upload bytes without waiting for processing.
    pub async fn upload_file(&self, upload: UploadFile) -> Result<File> {
        logged("files.upload_file", self.upload(upload).await)
    }

    /// Upload a local file. The MIME type falls back to the file extension.
    pub async fn upload_path(
        &self,
        path: impl AsRef<Path>,
        mime_type: Option<&str>,
        display_name: Option<&str>,
    ) -> Result<File> {
        let result: Result<File> = async {
            let upload = read_upload(path.as_ref(), mime_type, display_name).await?;
            self.upload(upload).await
        }
        .await;
        logged("files.upload_path", result)
    }

    /// Upload bytes and wait until the file leaves `PROCESSING`.
    ///
    /// A file that ends `FAILED` is a [`GenAiError::ProcessingFailed`].
    pub async fn upload_file_and_wait(&self, upload: UploadFile) -> Result<File> {
        logged("files.upload_file_and_wait", self.upload_and_wait(upload).await)
    }

    /// Poll an uploaded file until it is ready.
    pub async fn wait_until_active(&self, file: File) -> Result<File> {
        logged("files.wait_until_active", self.wait(file).await)
    }

    /// Unlogged upload and wait, for services that log at their own boundary.
    pub(crate) async fn upload_and_wait(&self, upload: UploadFile) -> Result<File> {
        let file = self.upload(upload).await?;
        self.wait(file).await
    }

    async fn wait(&self, file: File) -> Result<File> {
        let client = self.client.as_ref();
        let poller = match &self.cancel {
            Some(token) => Poller::new(self.poll.clone()).with_cancellation(token.clone()),
            None => Poller::new(self.poll.clone()),
        };

        debug!(file = %file.name, state = ?file.state, "Waiting for file processing");
        let file = poller
            .run(file, |f: File| async move { client.get_file(&f.name).await })
            .await?;
        Ok(file)
    }

    /// Fetch file metadata.
    pub async fn get_file(&self, name: &str) -> Result<File> {
        let result: Result<File> = async {
            require_params(&[("name", name)])?;
            Ok(self.client.get_file(name).await?)
        }
        .await;
        logged("files.get_file", result)
    }

    /// List every uploaded file, following page tokens.
    pub async fn list_files(&self) -> Result<Vec<File>> {
        let result: Result<Vec<File>> = async {
            let mut files = Vec::new();
            let mut token: Option<String> = None;
            loop {
                let page = self
                    .client
                    .list_files(Some(LIST_PAGE_SIZE), token.as_deref())
                    .await?;
                files.extend(page.files);
                match page.next_page_token.filter(|t| !t.is_empty()) {
                    Some(next) => token = Some(next),
                    None => break,
                }
            }
            Ok(files)
        }
        .await;
        logged("files.list_files", result)
    }

    /// Delete a file.
    pub async fn delete_file(&self, name: &str) -> Result<()> {
        let result: Result<()> = async {
            require_params(&[("name", name)])?;
            Ok(self.client.delete_file(name).await?)
        }
        .await;
        logged("files.delete_file", result)
    }

    async fn upload(&self, upload: UploadFile) -> Result<File> {
        require_params(&[("mime_type", upload.mime_type.as_str())])?;
        let file = self.client.upload_file(upload).await?;
        if file.name.is_empty() {
            return Err(GenAiError::api("Upload response did not name the file"));
        }
        Ok(file)
    }
}

/// Read a local file into an upload, named after the file.
pub(crate) async fn read_upload(
    path: &Path,
    mime_type: Option<&str>,
    display_name: Option<&str>,
) -> Result<UploadFile> {
    let path_str = path.to_string_lossy();
    require_params(&[("path", path_str.as_ref())])?;

    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| GenAiError::api_with_source(format!("Failed to read {path_str}"), e))?;
    let mime_type = mime_type
        .map(str::to_string)
        .unwrap_or_else(|| {
            genai_kit_core::media::mime_for_path(path, "application/octet-stream").to_string()
        });
    let display_name = display_name
        .map(str::to_string)
        .or_else(|| path.file_name().map(|n| n.to_string_lossy().into_owned()));

    let upload = UploadFile::new(bytes, mime_type);
    Ok(match display_name {
        Some(name) => upload.with_display_name(name),
        None => upload,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use genai_kit_client::{
        ClientError, FileState, FileStatus, ListFilesResponse, MockClient, RecordedCall,
    };
    use std::time::Duration;
    use tokio::time::Instant;

    fn service(mock: &MockClient) -> FilesService {
        FilesService::new(Arc::new(mock.clone()))
    }

    fn upload() -> UploadFile {
        UploadFile::new(&b"%PDF-1.7"[..], "application/pdf").with_display_name("Local Document")
    }

    #[tokio::test(start_paused = true)]
    async fn test_upload_and_wait_polls_until_active() {
        let mock = MockClient::new()
            .with_upload(File::with_state("files/doc", FileState::Processing))
            .with_file(File::with_state("files/doc", FileState::Processing))
            .with_file(
                File::with_state("files/doc", FileState::Active)
                    .with_uri("https://files/doc", "application/pdf"),
            );

        let started = Instant::now();
        let file = service(&mock).upload_file_and_wait(upload()).await.unwrap();

        assert_eq!(file.state, FileState::Active);
        assert_eq!(file.uri.as_deref(), Some("https://files/doc"));
        assert_eq!(mock.refresh_count(), 2);
        assert_eq!(started.elapsed(), Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unrecognized_state_counts_as_ready() {
        let mut ready: File = serde_json::from_value(serde_json::json!({
            "name": "files/doc",
            "state": "SOME_NEW_READY_STATE",
            "uri": "https://files/doc"
        }))
        .unwrap();
        ready.mime_type = Some("application/pdf".into());
        let mock = MockClient::new()
            .with_upload(File::with_state("files/doc", FileState::Processing))
            .with_file(ready);

        let file = service(&mock).upload_file_and_wait(upload()).await.unwrap();

        assert_eq!(file.state, FileState::Unknown);
        assert_eq!(file.uri.as_deref(), Some("https://files/doc"));
        assert_eq!(mock.refresh_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_file_is_processing_failed() {
        let mock = MockClient::new()
            .with_upload(File::with_state("files/doc", FileState::Processing))
            .with_file(File::with_state("files/doc", FileState::Failed));

        let err = service(&mock).upload_file_and_wait(upload()).await.unwrap_err();

        assert!(err.is_processing_failed());
        assert_eq!(err.to_string(), "File processing failed.");
        assert_eq!(mock.refresh_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_detail_is_reported() {
        let mut failed = File::with_state("files/doc", FileState::Failed);
        failed.error = Some(FileStatus {
            code: 3,
            message: "corrupt PDF".into(),
        });
        let mock = MockClient::new().with_upload(failed);

        let err = service(&mock).upload_file_and_wait(upload()).await.unwrap_err();
        assert_eq!(err.to_string(), "File processing failed: corrupt PDF");
        assert_eq!(mock.refresh_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_status_error_is_api_without_retry() {
        let mock = MockClient::new()
            .with_upload(File::with_state("files/doc", FileState::Processing))
            .with_file_error(ClientError::Connection("reset".into()))
            .with_file(File::with_state("files/doc", FileState::Active));

        let err = service(&mock).upload_file_and_wait(upload()).await.unwrap_err();
        assert!(err.is_api());
        assert_eq!(mock.refresh_count(), 1);
    }

    #[tokio::test]
    async fn test_upload_error_is_api() {
        let mock = MockClient::new().with_upload_error(ClientError::api(400, "bad upload"));
        let err = service(&mock).upload_file_and_wait(upload()).await.unwrap_err();
        assert!(err.is_api());
    }

    #[tokio::test]
    async fn test_blank_mime_type_is_validation() {
        let mock = MockClient::new();
        let err = service(&mock)
            .upload_file(UploadFile::new(&b"x"[..], " "))
            .await
            .unwrap_err();
        assert!(err.is_validation());
        assert!(mock.calls().is_empty());
    }

    #[tokio::test]
    async fn test_list_files_drains_pages() {
        let mock = MockClient::new()
            .with_file_page(ListFilesResponse {
                files: vec![File::with_state("files/a", FileState::Active)],
                next_page_token: Some("p2".into()),
            })
            .with_file_page(ListFilesResponse {
                files: vec![File::with_state("files/b", FileState::Active)],
                next_page_token: None,
            });

        let files = service(&mock).list_files().await.unwrap();
        let names: Vec<_> = files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["files/a", "files/b"]);
        assert_eq!(
            mock.calls()[1],
            RecordedCall::ListFiles {
                page_size: Some(10),
                page_token: Some("p2".into())
            }
        );
    }

    #[tokio::test]
    async fn test_get_and_delete_validate_name() {
        let mock = MockClient::new();
        let files = service(&mock);
        assert!(files.get_file("").await.unwrap_err().is_validation());
        assert!(files.delete_file(" ").await.unwrap_err().is_validation());
        files.delete_file("files/a").await.unwrap();
        assert_eq!(mock.calls(), vec![RecordedCall::DeleteFile("files/a".into())]);
    }

    #[tokio::test]
    async fn test_read_upload_detects_mime() {
        let path = std::env::temp_dir().join("genai-kit-files-test.csv");
        tokio::fs::write(&path, b"a,b\n1,2\n").await.unwrap();

        let upload = read_upload(&path, None, None).await.unwrap();
        assert_eq!(upload.mime_type, "text/csv");
        assert_eq!(upload.display_name.as_deref(), Some("genai-kit-files-test.csv"));
        assert_eq!(&upload.bytes[..], b"a,b\n1,2\n");

        let _ = tokio::fs::remove_file(&path).await;
    }

    #[tokio::test]
    async fn test_read_missing_file_is_api() {
        let err = read_upload(Path::new("/definitely/not/here.pdf"), None, None)
            .await
            .unwrap_err();
        assert!(err.is_api());
    }
}
