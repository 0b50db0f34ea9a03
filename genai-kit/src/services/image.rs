//! Image generation.

use super::{build_request, generate, logged, require_contents};
use genai_kit_client::{GenAiClient, GenerationConfig, Modality};
use genai_kit_core::content::decode_base64;
use genai_kit_core::errors::require_params;
use genai_kit_core::{classify, Blob, Contents, GenAiError, Result};
use std::sync::Arc;

/// One piece of an image generation result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageOutput {
    /// Text the model wrote alongside the images.
    Text(String),
    /// A generated image, base64 encoded.
    Image(Blob),
}

impl ImageOutput {
    /// Decoded image bytes, for image outputs.
    pub fn image_bytes(&self) -> Option<Result<Vec<u8>>> {
        match self {
            Self::Image(blob) => Some(
                decode_base64(&blob.data)
                    .map_err(|e| GenAiError::api_with_source("Image data is not valid base64", e)),
            ),
            Self::Text(_) => None,
        }
    }
}

/// Native image generation.
#[derive(Clone)]
pub struct ImageService {
    client: Arc<dyn GenAiClient>,
}

impl ImageService {
    /// Create a service.
    pub fn new(client: Arc<dyn GenAiClient>) -> Self {
        Self { client }
    }

    /// Generate images. Response modalities are always text plus image.
    ///
    /// Returns every text part first, then every image, each in response
    /// order.
    pub async fn generate_image(
        &self,
        model: &str,
        contents: impl Into<Contents>,
        config: Option<GenerationConfig>,
    ) -> Result<Vec<ImageOutput>> {
        let contents = contents.into();
        let result: Result<Vec<ImageOutput>> = async {
            require_params(&[("model", model)])?;
            require_contents(&contents)?;

            let config = config
                .unwrap_or_default()
                .with_modalities(vec![Modality::Text, Modality::Image]);
            let response =
                generate(self.client.as_ref(), model, &build_request(contents, Some(config)))
                    .await?;

            let classified = classify(response.parts());
            Ok(classified
                .text
                .into_iter()
                .map(ImageOutput::Text)
                .chain(classified.images.into_iter().map(ImageOutput::Image))
                .collect())
        }
        .await;
        logged("image.generate_image", result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use genai_kit_client::{GenerateContentResponse, MockClient};
    use genai_kit_core::Part;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_text_then_images() {
        let mock = MockClient::new().with_response(GenerateContentResponse::from_parts(vec![
            Part::inline_data("image/png", "aGVsbG8="),
            Part::text("A red fox"),
            Part::inline_data("audio/wav", "AAAA"),
            Part::text("in snow"),
        ]));
        let service = ImageService::new(Arc::new(mock.clone()));

        let outputs = service
            .generate_image("gemini-2.0-flash-exp", "Draw a fox", None)
            .await
            .unwrap();

        assert_eq!(
            outputs,
            vec![
                ImageOutput::Text("A red fox".into()),
                ImageOutput::Text("in snow".into()),
                ImageOutput::Image(Blob::new("image/png", "aGVsbG8=")),
            ]
        );
        assert_eq!(outputs[2].image_bytes().unwrap().unwrap(), b"hello");
        assert!(outputs[0].image_bytes().is_none());
    }

    #[tokio::test]
    async fn test_modalities_forced() {
        let mock = MockClient::new().with_text("no image today");
        let service = ImageService::new(Arc::new(mock.clone()));
        let config = GenerationConfig::new()
            .temperature(1.0)
            .with_modalities(vec![Modality::Text]);

        service
            .generate_image("gemini-2.0-flash-exp", "Draw", Some(config))
            .await
            .unwrap();

        let sent = mock.last_generate_request().unwrap().generation_config.unwrap();
        assert_eq!(
            sent.response_modalities,
            Some(vec![Modality::Text, Modality::Image])
        );
        assert_eq!(sent.temperature, Some(1.0));
    }
}
