//! Content and response part types.
//!
//! These mirror the `Content`/`Part` records of the Generative Language API.
//! A [`Part`] is a sum type: deserialization picks the variant from the field
//! that is present, and anything unrecognized lands in [`Part::Other`] instead
//! of failing the whole response.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Role used for caller-authored content.
pub const ROLE_USER: &str = "user";
/// Role used for model-authored content.
pub const ROLE_MODEL: &str = "model";

/// One element of a request or a generated response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Part {
    /// Text, optionally marked as model thinking.
    Text {
        /// The text.
        text: String,
        /// Set on thought summaries from thinking models.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        thought: Option<bool>,
    },
    /// Inline binary data.
    InlineData {
        /// The blob.
        #[serde(rename = "inlineData")]
        inline_data: Blob,
    },
    /// Reference to an uploaded file.
    FileData {
        /// The file reference.
        #[serde(rename = "fileData")]
        file_data: FileData,
    },
    /// Function call emitted by the model.
    FunctionCall {
        /// The call.
        #[serde(rename = "functionCall")]
        function_call: FunctionCall,
    },
    /// Function result sent back to the model.
    FunctionResponse {
        /// The result.
        #[serde(rename = "functionResponse")]
        function_response: FunctionResponse,
    },
    /// Code written by the model for the code execution tool.
    ExecutableCode {
        /// The code.
        #[serde(rename = "executableCode")]
        executable_code: ExecutableCode,
    },
    /// Result of running [`Part::ExecutableCode`].
    CodeExecutionResult {
        /// The result.
        #[serde(rename = "codeExecutionResult")]
        code_execution_result: CodeExecutionResult,
    },
    /// Any part shape not modelled above.
    Other(JsonValue),
}

impl Part {
    /// Create a text part.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text {
            text: text.into(),
            thought: None,
        }
    }

    /// Create a thought part.
    pub fn thought(text: impl Into<String>) -> Self {
        Self::Text {
            text: text.into(),
            thought: Some(true),
        }
    }

    /// Create an inline data part from base64 data.
    pub fn inline_data(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self::InlineData {
            inline_data: Blob::new(mime_type, data),
        }
    }

    /// Create a file reference part.
    pub fn file_data(mime_type: impl Into<String>, file_uri: impl Into<String>) -> Self {
        Self::FileData {
            file_data: FileData {
                mime_type: Some(mime_type.into()),
                file_uri: file_uri.into(),
            },
        }
    }

    /// Create a file reference part without a MIME type (e.g. a YouTube URL).
    pub fn file_uri(file_uri: impl Into<String>) -> Self {
        Self::FileData {
            file_data: FileData {
                mime_type: None,
                file_uri: file_uri.into(),
            },
        }
    }

    /// Create an executable code part.
    pub fn executable_code(language: impl Into<String>, code: impl Into<String>) -> Self {
        Self::ExecutableCode {
            executable_code: ExecutableCode {
                language: language.into(),
                code: code.into(),
            },
        }
    }

    /// Create a code execution result part.
    pub fn code_execution_result(outcome: impl Into<String>, output: impl Into<String>) -> Self {
        Self::CodeExecutionResult {
            code_execution_result: CodeExecutionResult {
                outcome: outcome.into(),
                output: output.into(),
            },
        }
    }

    /// Create a function call part.
    pub fn function_call(name: impl Into<String>, args: JsonValue) -> Self {
        Self::FunctionCall {
            function_call: FunctionCall {
                id: None,
                name: name.into(),
                args,
            },
        }
    }

    /// Create a function response part.
    pub fn function_response(name: impl Into<String>, response: JsonValue) -> Self {
        Self::FunctionResponse {
            function_response: FunctionResponse {
                id: None,
                name: name.into(),
                response,
            },
        }
    }

    /// Get the text if this is a text part.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { text, .. } => Some(text),
            _ => None,
        }
    }

    /// Whether this is a thought part.
    #[must_use]
    pub fn is_thought(&self) -> bool {
        matches!(self, Self::Text { thought: Some(true), .. })
    }

    /// Get the blob if this is an inline data part.
    #[must_use]
    pub fn as_inline_data(&self) -> Option<&Blob> {
        match self {
            Self::InlineData { inline_data } => Some(inline_data),
            _ => None,
        }
    }

    /// Get the call if this is a function call part.
    #[must_use]
    pub fn as_function_call(&self) -> Option<&FunctionCall> {
        match self {
            Self::FunctionCall { function_call } => Some(function_call),
            _ => None,
        }
    }
}

/// Inline binary payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Blob {
    /// MIME type.
    #[serde(default)]
    pub mime_type: String,
    /// Base64-encoded data.
    #[serde(default)]
    pub data: String,
}

impl Blob {
    /// Create a new blob.
    pub fn new(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }

    /// Whether the blob is a non-empty image.
    #[must_use]
    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/") && !self.data.is_empty()
    }

    /// Whether the blob is non-empty audio.
    #[must_use]
    pub fn is_audio(&self) -> bool {
        self.mime_type.starts_with("audio/") && !self.data.is_empty()
    }
}

/// Reference to an uploaded file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileData {
    /// MIME type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    /// File URI.
    pub file_uri: String,
}

/// Function call from the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    /// Call identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Function name.
    pub name: String,
    /// Arguments.
    #[serde(default)]
    pub args: JsonValue,
}

/// Function result sent to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionResponse {
    /// Call identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Function name.
    pub name: String,
    /// Response payload.
    pub response: JsonValue,
}

/// Executable code produced by the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutableCode {
    /// Programming language.
    #[serde(default)]
    pub language: String,
    /// The code.
    #[serde(default)]
    pub code: String,
}

/// Result of executing code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeExecutionResult {
    /// Outcome, e.g. `OUTCOME_OK`.
    #[serde(default)]
    pub outcome: String,
    /// Captured output.
    #[serde(default)]
    pub output: String,
}

/// A turn of a conversation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Content {
    /// `user` or `model`; omitted for system instructions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Parts of the turn.
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    /// Create user content from text.
    pub fn user(text: impl Into<String>) -> Self {
        Self::user_parts(vec![Part::text(text)])
    }

    /// Create model content from text.
    pub fn model(text: impl Into<String>) -> Self {
        Self::model_parts(vec![Part::text(text)])
    }

    /// Create user content with parts.
    pub fn user_parts(parts: Vec<Part>) -> Self {
        Self {
            role: Some(ROLE_USER.to_string()),
            parts,
        }
    }

    /// Create model content with parts.
    pub fn model_parts(parts: Vec<Part>) -> Self {
        Self {
            role: Some(ROLE_MODEL.to_string()),
            parts,
        }
    }

    /// Create role-less content, as used for system instructions.
    pub fn instruction(text: impl Into<String>) -> Self {
        Self {
            role: None,
            parts: vec![Part::text(text)],
        }
    }

    /// Concatenate all non-thought text parts.
    #[must_use]
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .filter(|p| !p.is_thought())
            .filter_map(Part::as_text)
            .collect()
    }
}

/// Caller input for a generation call.
///
/// Accepts a bare prompt, a list of parts forming one user turn, or an
/// explicit conversation.
#[derive(Debug, Clone, PartialEq)]
pub enum Contents {
    /// A single text prompt.
    Prompt(String),
    /// Parts of a single user turn.
    Parts(Vec<Part>),
    /// A full conversation.
    Conversation(Vec<Content>),
}

impl Contents {
    /// Whether there is nothing to send.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Prompt(p) => p.trim().is_empty(),
            Self::Parts(parts) => parts.is_empty(),
            Self::Conversation(turns) => turns.iter().all(|t| t.parts.is_empty()),
        }
    }

    /// Convert to the wire conversation.
    #[must_use]
    pub fn into_contents(self) -> Vec<Content> {
        match self {
            Self::Prompt(p) => vec![Content::user(p)],
            Self::Parts(parts) => vec![Content::user_parts(parts)],
            Self::Conversation(turns) => turns,
        }
    }
}

impl From<&str> for Contents {
    fn from(s: &str) -> Self {
        Self::Prompt(s.to_string())
    }
}

impl From<String> for Contents {
    fn from(s: String) -> Self {
        Self::Prompt(s)
    }
}

impl From<Vec<Part>> for Contents {
    fn from(parts: Vec<Part>) -> Self {
        Self::Parts(parts)
    }
}

impl From<Vec<Content>> for Contents {
    fn from(turns: Vec<Content>) -> Self {
        Self::Conversation(turns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_deserialize_each_variant() {
        let parts: Vec<Part> = serde_json::from_value(json!([
            {"text": "hi"},
            {"text": "pondering", "thought": true},
            {"inlineData": {"mimeType": "image/png", "data": "QQ=="}},
            {"fileData": {"mimeType": "video/mp4", "fileUri": "https://x/files/1"}},
            {"functionCall": {"name": "lookup", "args": {"q": "rust"}}},
            {"executableCode": {"language": "PYTHON", "code": "print(1)"}},
            {"codeExecutionResult": {"outcome": "OUTCOME_OK", "output": "1\n"}},
            {"videoMetadata": {"fps": 1}}
        ]))
        .unwrap();

        assert_eq!(parts[0], Part::text("hi"));
        assert!(parts[1].is_thought());
        assert_eq!(parts[2].as_inline_data(), Some(&Blob::new("image/png", "QQ==")));
        assert!(matches!(parts[3], Part::FileData { .. }));
        assert_eq!(parts[4].as_function_call().map(|c| c.name.as_str()), Some("lookup"));
        assert_eq!(parts[5], Part::executable_code("PYTHON", "print(1)"));
        assert_eq!(parts[6], Part::code_execution_result("OUTCOME_OK", "1\n"));
        assert!(matches!(parts[7], Part::Other(_)));
    }

    #[test]
    fn test_serialize_wire_names() {
        let json = serde_json::to_value(Part::inline_data("audio/wav", "Zm9v")).unwrap();
        assert_eq!(json, json!({"inlineData": {"mimeType": "audio/wav", "data": "Zm9v"}}));

        let json = serde_json::to_value(Part::text("plain")).unwrap();
        assert_eq!(json, json!({"text": "plain"}));

        let json = serde_json::to_value(Part::file_uri("https://youtu.be/abc")).unwrap();
        assert_eq!(json, json!({"fileData": {"fileUri": "https://youtu.be/abc"}}));
    }

    #[test]
    fn test_content_text_skips_thoughts() {
        let content = Content::model_parts(vec![
            Part::thought("let me think"),
            Part::text("Hello"),
            Part::text(", world"),
        ]);
        assert_eq!(content.text(), "Hello, world");
    }

    #[test]
    fn test_contents_conversion() {
        let contents: Contents = "hello".into();
        assert!(!contents.is_empty());
        assert_eq!(contents.into_contents(), vec![Content::user("hello")]);

        let blank: Contents = "   ".into();
        assert!(blank.is_empty());

        let turns = vec![Content::user("a"), Content::model("b")];
        let contents: Contents = turns.clone().into();
        assert_eq!(contents.into_contents(), turns);
    }
}
