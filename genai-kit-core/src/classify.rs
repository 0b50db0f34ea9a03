//! Response part classification.
//!
//! [`classify`] projects a heterogeneous part sequence into five homogeneous,
//! order-preserving lists. It never fails: parts that match no category are
//! left out. The per-category iterators ([`texts`], [`code_blocks`],
//! [`outputs`], [`images`], [`audio`]) are the lazy form of the same rules.

use crate::parts::{Blob, Part};
use serde::{Deserialize, Serialize};

/// Response parts grouped by kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedParts {
    /// Non-empty text parts.
    pub text: Vec<String>,
    /// Non-empty executable code.
    pub code: Vec<String>,
    /// Non-empty code execution output.
    pub output: Vec<String>,
    /// Non-empty inline images.
    pub images: Vec<Blob>,
    /// Non-empty inline audio.
    pub audio: Vec<Blob>,
}

impl ClassifiedParts {
    /// Whether every category is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
            && self.code.is_empty()
            && self.output.is_empty()
            && self.images.is_empty()
            && self.audio.is_empty()
    }
}

/// Classify `parts` into text, code, output, images and audio.
///
/// ```rust
/// use genai_kit_core::{classify, Part};
///
/// let parts = vec![Part::text("hi"), Part::inline_data("image/png", "QQ==")];
/// let classified = classify(&parts);
/// assert_eq!(classified.text, vec!["hi"]);
/// assert_eq!(classified.images.len(), 1);
/// ```
#[must_use]
pub fn classify(parts: &[Part]) -> ClassifiedParts {
    let mut out = ClassifiedParts::default();

    for part in parts {
        match part {
            Part::Text { text, .. } if !text.is_empty() => out.text.push(text.clone()),
            Part::ExecutableCode { executable_code } if !executable_code.code.is_empty() => {
                out.code.push(executable_code.code.clone());
            }
            Part::CodeExecutionResult {
                code_execution_result,
            } if !code_execution_result.output.is_empty() => {
                out.output.push(code_execution_result.output.clone());
            }
            Part::InlineData { inline_data } if inline_data.is_image() => {
                out.images.push(inline_data.clone());
            }
            Part::InlineData { inline_data } if inline_data.is_audio() => {
                out.audio.push(inline_data.clone());
            }
            _ => {}
        }
    }

    out
}

/// Non-empty text parts, in order.
pub fn texts(parts: &[Part]) -> impl Iterator<Item = &str> + '_ {
    parts.iter().filter_map(|p| match p {
        Part::Text { text, .. } if !text.is_empty() => Some(text.as_str()),
        _ => None,
    })
}

/// Non-empty executable code, in order.
pub fn code_blocks(parts: &[Part]) -> impl Iterator<Item = &str> + '_ {
    parts.iter().filter_map(|p| match p {
        Part::ExecutableCode { executable_code } if !executable_code.code.is_empty() => {
            Some(executable_code.code.as_str())
        }
        _ => None,
    })
}

/// Non-empty code execution output, in order.
pub fn outputs(parts: &[Part]) -> impl Iterator<Item = &str> + '_ {
    parts.iter().filter_map(|p| match p {
        Part::CodeExecutionResult {
            code_execution_result,
        } if !code_execution_result.output.is_empty() => {
            Some(code_execution_result.output.as_str())
        }
        _ => None,
    })
}

/// Non-empty inline images, in order.
pub fn images(parts: &[Part]) -> impl Iterator<Item = &Blob> + '_ {
    parts
        .iter()
        .filter_map(Part::as_inline_data)
        .filter(|b| b.is_image())
}

/// Non-empty inline audio, in order.
pub fn audio(parts: &[Part]) -> impl Iterator<Item = &Blob> + '_ {
    parts
        .iter()
        .filter_map(Part::as_inline_data)
        .filter(|b| b.is_audio())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn test_empty_input() {
        let classified = classify(&[]);
        assert!(classified.is_empty());
        assert_eq!(classified, ClassifiedParts::default());
    }

    #[test]
    fn test_single_text() {
        let classified = classify(&[Part::text("hi")]);
        assert_eq!(
            classified,
            ClassifiedParts {
                text: vec!["hi".to_string()],
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_single_image() {
        let classified = classify(&[Part::inline_data("image/png", "QQ==")]);
        assert_eq!(
            classified,
            ClassifiedParts {
                images: vec![Blob::new("image/png", "QQ==")],
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_audio_with_empty_text() {
        let classified = classify(&[Part::inline_data("audio/mp3", "Zm9v"), Part::text("")]);
        assert_eq!(classified.audio, vec![Blob::new("audio/mp3", "Zm9v")]);
        assert!(classified.text.is_empty());
        assert!(classified.images.is_empty());
    }

    #[rstest]
    #[case::empty_code(Part::executable_code("PYTHON", ""))]
    #[case::empty_output(Part::code_execution_result("OUTCOME_OK", ""))]
    #[case::empty_image(Part::inline_data("image/png", ""))]
    #[case::pdf_blob(Part::inline_data("application/pdf", "JVBERi0="))]
    #[case::video_blob(Part::inline_data("video/mp4", "AAAA"))]
    #[case::uppercase_mime(Part::inline_data("IMAGE/PNG", "QQ=="))]
    #[case::file_ref(Part::file_data("image/png", "https://x/files/1"))]
    #[case::function_call(Part::function_call("f", serde_json::json!({})))]
    #[case::unknown(Part::Other(serde_json::json!({"videoMetadata": {}})))]
    fn test_excluded_parts(#[case] part: Part) {
        assert!(classify(&[part]).is_empty());
    }

    #[test]
    fn test_order_preserved_per_category() {
        let parts = vec![
            Part::text("first"),
            Part::executable_code("PYTHON", "x = 1"),
            Part::inline_data("image/jpeg", "b25l"),
            Part::code_execution_result("OUTCOME_OK", "out-1"),
            Part::text("second"),
            Part::inline_data("audio/wav", "YQ=="),
            Part::executable_code("PYTHON", "print(x)"),
            Part::inline_data("image/png", "dHdv"),
            Part::code_execution_result("OUTCOME_OK", "out-2"),
            Part::text("third"),
        ];

        let classified = classify(&parts);
        assert_eq!(classified.text, vec!["first", "second", "third"]);
        assert_eq!(classified.code, vec!["x = 1", "print(x)"]);
        assert_eq!(classified.output, vec!["out-1", "out-2"]);
        assert_eq!(
            classified.images,
            vec![Blob::new("image/jpeg", "b25l"), Blob::new("image/png", "dHdv")]
        );
        assert_eq!(classified.audio, vec![Blob::new("audio/wav", "YQ==")]);
    }

    #[test]
    fn test_thought_text_counts_as_text() {
        let classified = classify(&[Part::thought("hmm"), Part::text("answer")]);
        assert_eq!(classified.text, vec!["hmm", "answer"]);
    }

    #[test]
    fn test_idempotent() {
        let parts = vec![
            Part::text("a"),
            Part::inline_data("audio/mp3", "Zm9v"),
            Part::executable_code("PYTHON", "1+1"),
        ];
        assert_eq!(classify(&parts), classify(&parts));
    }

    #[test]
    fn test_lazy_projections_match_classify() {
        let parts = vec![
            Part::text("a"),
            Part::text(""),
            Part::executable_code("PYTHON", "1+1"),
            Part::code_execution_result("OUTCOME_OK", "2"),
            Part::inline_data("image/gif", "R0lG"),
            Part::inline_data("audio/ogg", "T2dn"),
        ];
        let classified = classify(&parts);

        assert_eq!(texts(&parts).collect::<Vec<_>>(), classified.text);
        assert_eq!(code_blocks(&parts).collect::<Vec<_>>(), classified.code);
        assert_eq!(outputs(&parts).collect::<Vec<_>>(), classified.output);
        assert_eq!(images(&parts).cloned().collect::<Vec<_>>(), classified.images);
        assert_eq!(audio(&parts).cloned().collect::<Vec<_>>(), classified.audio);
    }
}
