//! Explicit context caching.

use super::{build_request, generate, logged, require_contents};
use genai_kit_client::{
    format_ttl, CachedContent, GenAiClient, GenerateContentResponse, GenerationConfig,
};
use genai_kit_core::errors::{require_non_empty, require_params};
use genai_kit_core::{Attachment, Content, Contents, Part, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

const LIST_PAGE_SIZE: u32 = 10;

/// Creates, lists, updates and deletes context caches, and generates
/// against them.
#[derive(Clone)]
pub struct CacheService {
    client: Arc<dyn GenAiClient>,
}

impl CacheService {
    /// Create a service.
    pub fn new(client: Arc<dyn GenAiClient>) -> Self {
        Self { client }
    }

    /// Cache `files` as one user turn for `model`.
    pub async fn create_cache(
        &self,
        model: &str,
        files: Vec<Attachment>,
        system_instruction: Option<&str>,
        ttl: Option<Duration>,
    ) -> Result<CachedContent> {
        let result: Result<CachedContent> = async {
            require_params(&[("model", model)])?;
            require_non_empty("files", &files)?;

            let parts: Vec<Part> = files.into_iter().map(Part::from).collect();
            let mut cache = CachedContent::new(model).with_contents(vec![Content::user_parts(parts)]);
            if let Some(instruction) = system_instruction.filter(|s| !s.trim().is_empty()) {
                cache = cache.with_system_instruction(instruction);
            }
            if let Some(ttl) = ttl {
                cache = cache.with_ttl(ttl);
            }

            let created = self.client.create_cache(&cache).await?;
            debug!(cache = ?created.name, expires = ?created.expire_time, "Cache created");
            Ok(created)
        }
        .await;
        logged("cache.create_cache", result)
    }

    /// Every cache, following page tokens.
    pub async fn list_caches(&self) -> Result<Vec<CachedContent>> {
        let result: Result<Vec<CachedContent>> = async {
            let mut caches = Vec::new();
            let mut token: Option<String> = None;
            loop {
                let page = self
                    .client
                    .list_caches(Some(LIST_PAGE_SIZE), token.as_deref())
                    .await?;
                caches.extend(page.cached_contents);
                match page.next_page_token.filter(|t| !t.is_empty()) {
                    Some(next) => token = Some(next),
                    None => break,
                }
            }
            Ok(caches)
        }
        .await;
        logged("cache.list_caches", result)
    }

    /// Set a new time to live.
    pub async fn update_cache_ttl(&self, name: &str, ttl: Duration) -> Result<CachedContent> {
        let result: Result<CachedContent> = async {
            require_params(&[("name", name)])?;
            Ok(self.client.update_cache_ttl(name, &format_ttl(ttl)).await?)
        }
        .await;
        logged("cache.update_cache_ttl", result)
    }

    /// Delete a cache.
    pub async fn delete_cache(&self, name: &str) -> Result<()> {
        let result: Result<()> = async {
            require_params(&[("name", name)])?;
            Ok(self.client.delete_cache(name).await?)
        }
        .await;
        logged("cache.delete_cache", result)
    }

    /// Generate with `cache_name` as the cached prefix.
    pub async fn generate_with_cache(
        &self,
        model: &str,
        contents: impl Into<Contents>,
        cache_name: &str,
        config: Option<GenerationConfig>,
    ) -> Result<GenerateContentResponse> {
        let contents = contents.into();
        let result: Result<GenerateContentResponse> = async {
            require_params(&[("model", model), ("cache_name", cache_name)])?;
            require_contents(&contents)?;
            let request = build_request(contents, config).with_cached_content(cache_name);
            generate(self.client.as_ref(), model, &request).await
        }
        .await;
        logged("cache.generate_with_cache", result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use genai_kit_client::{ListCachedContentsResponse, MockClient, RecordedCall};
    use pretty_assertions::assert_eq;

    fn service(mock: &MockClient) -> CacheService {
        CacheService::new(Arc::new(mock.clone()))
    }

    fn named(name: &str) -> CachedContent {
        CachedContent {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_cache_shape() {
        let mock = MockClient::new().with_cache(named("cachedContents/abc"));

        let cache = service(&mock)
            .create_cache(
                "gemini-2.0-flash-001",
                vec![Attachment::uri("https://files/transcript", "text/plain")],
                Some("You are an expert"),
                Some(Duration::from_secs(300)),
            )
            .await
            .unwrap();

        assert_eq!(cache.name.as_deref(), Some("cachedContents/abc"));
        let RecordedCall::CreateCache(sent) = &mock.calls()[0] else {
            panic!("expected create");
        };
        assert_eq!(sent.model.as_deref(), Some("models/gemini-2.0-flash-001"));
        assert_eq!(sent.ttl.as_deref(), Some("300s"));
        assert_eq!(sent.system_instruction, Some(Content::instruction("You are an expert")));
        assert_eq!(
            sent.contents,
            vec![Content::user_parts(vec![Part::file_data(
                "text/plain",
                "https://files/transcript"
            )])]
        );
    }

    #[tokio::test]
    async fn test_create_requires_files() {
        let mock = MockClient::new();
        let err = service(&mock)
            .create_cache("gemini-2.0-flash-001", vec![], None, None)
            .await
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[tokio::test]
    async fn test_list_drains_pages() {
        let mock = MockClient::new()
            .with_cache_page(ListCachedContentsResponse {
                cached_contents: vec![named("cachedContents/a")],
                next_page_token: Some("next".into()),
            })
            .with_cache_page(ListCachedContentsResponse {
                cached_contents: vec![named("cachedContents/b")],
                next_page_token: Some(String::new()),
            });

        let caches = service(&mock).list_caches().await.unwrap();
        assert_eq!(caches.len(), 2);
        assert_eq!(
            mock.calls()[1],
            RecordedCall::ListCaches {
                page_size: Some(10),
                page_token: Some("next".into())
            }
        );
    }

    #[tokio::test]
    async fn test_update_ttl_formats_duration() {
        let mock = MockClient::new().with_cache(named("cachedContents/a"));
        service(&mock)
            .update_cache_ttl("cachedContents/a", Duration::from_secs(7200))
            .await
            .unwrap();
        assert_eq!(
            mock.calls(),
            vec![RecordedCall::UpdateCacheTtl {
                name: "cachedContents/a".into(),
                ttl: "7200s".into()
            }]
        );
    }

    #[tokio::test]
    async fn test_generate_with_cache_sets_name() {
        let mock = MockClient::new().with_text("The speaker is worried.");
        let response = service(&mock)
            .generate_with_cache(
                "gemini-2.0-flash-001",
                "What is the tone?",
                "cachedContents/a",
                None,
            )
            .await
            .unwrap();

        assert_eq!(response.text(), "The speaker is worried.");
        assert_eq!(
            mock.last_generate_request().unwrap().cached_content.as_deref(),
            Some("cachedContents/a")
        );
    }

    #[tokio::test]
    async fn test_delete_validates_name() {
        let mock = MockClient::new();
        assert!(service(&mock).delete_cache("").await.unwrap_err().is_validation());
        service(&mock).delete_cache("cachedContents/a").await.unwrap();
        assert_eq!(mock.calls(), vec![RecordedCall::DeleteCache("cachedContents/a".into())]);
    }
}
