//! Long-running operation types for Veo video generation.

use genai_kit_polling::{PollState, Pollable};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// `predictLongRunning` request body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateVideosRequest {
    /// Generation instances; one per prompt.
    pub instances: Vec<VideoInstance>,
    /// Generation parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<VideoGenerationParameters>,
}

impl GenerateVideosRequest {
    /// Text-to-video request.
    pub fn from_prompt(prompt: impl Into<String>) -> Self {
        Self {
            instances: vec![VideoInstance {
                prompt: prompt.into(),
                image: None,
            }],
            parameters: None,
        }
    }

    /// Image-to-video request. `image_base64` is the encoded image.
    pub fn from_image(
        prompt: impl Into<String>,
        image_base64: impl Into<String>,
        mime_type: impl Into<String>,
    ) -> Self {
        Self {
            instances: vec![VideoInstance {
                prompt: prompt.into(),
                image: Some(VideoImage {
                    bytes_base64_encoded: image_base64.into(),
                    mime_type: mime_type.into(),
                }),
            }],
            parameters: None,
        }
    }

    /// Set the generation parameters.
    #[must_use]
    pub fn with_parameters(mut self, parameters: VideoGenerationParameters) -> Self {
        self.parameters = Some(parameters);
        self
    }
}

/// One video generation instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoInstance {
    /// Text prompt.
    pub prompt: String,
    /// Optional starting image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<VideoImage>,
}

/// Starting image for image-to-video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoImage {
    /// Base64 image bytes.
    pub bytes_base64_encoded: String,
    /// MIME type.
    pub mime_type: String,
}

/// Video aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AspectRatio {
    /// Landscape.
    #[serde(rename = "16:9")]
    Landscape,
    /// Portrait.
    #[serde(rename = "9:16")]
    Portrait,
}

/// Whether generated videos may include people.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersonGeneration {
    /// No people.
    DontAllow,
    /// Adults only.
    AllowAdult,
}

/// Video generation parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoGenerationParameters {
    /// Aspect ratio.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<AspectRatio>,
    /// Person generation policy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub person_generation: Option<PersonGeneration>,
    /// Number of videos (1 or 2).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_count: Option<u32>,
    /// Duration in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<u32>,
    /// What to avoid.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub negative_prompt: Option<String>,
    /// Let the service rewrite the prompt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enhance_prompt: Option<bool>,
}

/// Handle to a long-running job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    /// Resource name, e.g. `models/veo-2.0-generate-001/operations/abc`.
    pub name: String,
    /// Whether the job has finished.
    #[serde(default)]
    pub done: bool,
    /// Result, once done.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<OperationResponse>,
    /// Failure, once done.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<OperationError>,
    /// Service-specific progress metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<JsonValue>,
}

impl Operation {
    /// A pending operation with `name`.
    pub fn pending(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// A finished operation with the given video URIs.
    pub fn completed<I, S>(name: impl Into<String>, uris: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let samples = uris
            .into_iter()
            .map(|uri| GeneratedVideo {
                video: Some(Video {
                    uri: Some(uri.into()),
                    mime_type: None,
                }),
            })
            .collect();

        Self {
            name: name.into(),
            done: true,
            response: Some(OperationResponse {
                generate_video_response: Some(GenerateVideoResponse {
                    generated_samples: samples,
                    ..Default::default()
                }),
            }),
            ..Default::default()
        }
    }

    /// A finished operation that failed.
    pub fn failed(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            done: true,
            error: Some(OperationError {
                code: 0,
                message: message.into(),
            }),
            ..Default::default()
        }
    }

    /// Generated videos; empty until done.
    pub fn generated_videos(&self) -> &[GeneratedVideo] {
        self.response
            .as_ref()
            .and_then(|r| r.generate_video_response.as_ref())
            .map(|r| r.generated_samples.as_slice())
            .unwrap_or(&[])
    }

    /// URIs of generated videos that carry one.
    pub fn video_uris(&self) -> Vec<&str> {
        self.generated_videos()
            .iter()
            .filter_map(|v| v.video.as_ref()?.uri.as_deref())
            .collect()
    }
}

impl Pollable for Operation {
    fn poll_state(&self) -> PollState {
        match (&self.error, self.done) {
            (Some(err), _) => PollState::Failed(err.message.clone()),
            (None, true) => PollState::Done,
            (None, false) => PollState::Pending,
        }
    }
}

/// Result payload of a finished operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationResponse {
    /// Video generation result.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generate_video_response: Option<GenerateVideoResponse>,
}

/// Video generation result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateVideoResponse {
    /// Generated videos.
    #[serde(default)]
    pub generated_samples: Vec<GeneratedVideo>,
    /// Videos removed by safety filters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rai_media_filtered_count: Option<u32>,
    /// Why videos were filtered.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rai_media_filtered_reasons: Vec<String>,
}

/// One generated video.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedVideo {
    /// The video.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video: Option<Video>,
}

/// Video location.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    /// Download URI.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    /// MIME type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

/// Failure status of an operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationError {
    /// Status code.
    #[serde(default)]
    pub code: i32,
    /// Message.
    #[serde(default)]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_request_shape() {
        let request = GenerateVideosRequest::from_image("a cat surfing", "QQ==", "image/png")
            .with_parameters(VideoGenerationParameters {
                aspect_ratio: Some(AspectRatio::Portrait),
                person_generation: Some(PersonGeneration::DontAllow),
                sample_count: Some(2),
                ..Default::default()
            });

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "instances": [{
                    "prompt": "a cat surfing",
                    "image": {"bytesBase64Encoded": "QQ==", "mimeType": "image/png"}
                }],
                "parameters": {
                    "aspectRatio": "9:16",
                    "personGeneration": "dont_allow",
                    "sampleCount": 2
                }
            })
        );
    }

    #[test]
    fn test_deserialize_done_operation() {
        let op: Operation = serde_json::from_value(json!({
            "name": "models/veo-2.0-generate-001/operations/xyz",
            "done": true,
            "response": {
                "@type": "type.googleapis.com/google.ai.generativelanguage.v1beta.PredictLongRunningResponse",
                "generateVideoResponse": {
                    "generatedSamples": [
                        {"video": {"uri": "https://example.com/v1beta/files/a:download?alt=media"}},
                        {"video": {"uri": "https://example.com/v1beta/files/b:download?alt=media"}}
                    ]
                }
            }
        }))
        .unwrap();

        assert_eq!(op.poll_state(), PollState::Done);
        assert_eq!(
            op.video_uris(),
            vec![
                "https://example.com/v1beta/files/a:download?alt=media",
                "https://example.com/v1beta/files/b:download?alt=media"
            ]
        );
    }

    #[test]
    fn test_poll_states() {
        assert_eq!(Operation::pending("op").poll_state(), PollState::Pending);
        assert_eq!(
            Operation::failed("op", "quota exceeded").poll_state(),
            PollState::Failed("quota exceeded".into())
        );
        assert_eq!(Operation::completed("op", ["u"]).poll_state(), PollState::Done);
    }

    #[test]
    fn test_pending_has_no_videos() {
        let op: Operation = serde_json::from_value(json!({"name": "op"})).unwrap();
        assert!(!op.done);
        assert!(op.video_uris().is_empty());
    }
}
