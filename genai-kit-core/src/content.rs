//! Helpers for assembling request parts.

use crate::parts::Part;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// A file attached to a prompt, given as base64 data or an uploaded URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attachment {
    /// Base64-encoded bytes.
    Inline {
        /// Base64 data.
        data: String,
        /// MIME type.
        mime_type: String,
    },
    /// An uploaded file or remote URI.
    Uri {
        /// File URI.
        uri: String,
        /// MIME type.
        mime_type: String,
    },
}

impl Attachment {
    /// Attach raw bytes, base64-encoding them.
    pub fn bytes(bytes: &[u8], mime_type: impl Into<String>) -> Self {
        Self::Inline {
            data: encode_base64(bytes),
            mime_type: mime_type.into(),
        }
    }

    /// Attach already-encoded base64 data.
    pub fn base64(data: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self::Inline {
            data: data.into(),
            mime_type: mime_type.into(),
        }
    }

    /// Attach an uploaded file by URI.
    pub fn uri(uri: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self::Uri {
            uri: uri.into(),
            mime_type: mime_type.into(),
        }
    }
}

impl From<Attachment> for Part {
    fn from(a: Attachment) -> Self {
        match a {
            Attachment::Inline { data, mime_type } => Part::inline_data(mime_type, data),
            Attachment::Uri { uri, mime_type } => Part::file_data(mime_type, uri),
        }
    }
}

/// Builds part lists for multimodal prompts.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentBuilder;

impl ContentBuilder {
    /// A text part.
    pub fn text_part(text: impl Into<String>) -> Part {
        Part::text(text)
    }

    /// An inline data part from base64 data.
    pub fn inline_data_part(data: impl Into<String>, mime_type: impl Into<String>) -> Part {
        Part::inline_data(mime_type, data)
    }

    /// A file reference part.
    pub fn file_part(uri: impl Into<String>, mime_type: impl Into<String>) -> Part {
        Part::file_data(mime_type, uri)
    }

    /// The text first, then each attachment in order.
    pub fn multimodal_parts<I>(text: impl Into<String>, attachments: I) -> Vec<Part>
    where
        I: IntoIterator<Item = Attachment>,
    {
        std::iter::once(Part::text(text))
            .chain(attachments.into_iter().map(Part::from))
            .collect()
    }

    /// Alias of [`ContentBuilder::multimodal_parts`] for prompt-plus-files calls.
    pub fn parts_from_prompt_and_files<I>(prompt: impl Into<String>, files: I) -> Vec<Part>
    where
        I: IntoIterator<Item = Attachment>,
    {
        Self::multimodal_parts(prompt, files)
    }
}

/// Base64-encode bytes with the standard alphabet.
#[must_use]
pub fn encode_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decode standard base64.
pub fn decode_base64(data: &str) -> Result<Vec<u8>, base64::DecodeError> {
    STANDARD.decode(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_multimodal_parts_order() {
        let parts = ContentBuilder::multimodal_parts(
            "Describe these",
            [
                Attachment::bytes(b"A", "image/png"),
                Attachment::uri("https://x/files/abc", "video/mp4"),
            ],
        );

        assert_eq!(
            parts,
            vec![
                Part::text("Describe these"),
                Part::inline_data("image/png", "QQ=="),
                Part::file_data("video/mp4", "https://x/files/abc"),
            ]
        );
    }

    #[test]
    fn test_prompt_only() {
        let parts = ContentBuilder::parts_from_prompt_and_files("hi", []);
        assert_eq!(parts, vec![ContentBuilder::text_part("hi")]);
    }

    #[test]
    fn test_base64_helpers() {
        assert_eq!(encode_base64(b"foo"), "Zm9v");
        assert_eq!(decode_base64("Zm9v").unwrap(), b"foo");
        assert!(decode_base64("not base64!").is_err());
    }
}
