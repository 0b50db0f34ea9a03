//! Media type detection for local files.
//!
//! Maps file extensions to the MIME types the API accepts for images, audio,
//! video and documents.

use std::fmt;
use std::path::Path;

/// Files up to this size may be sent inline; larger ones go through upload.
pub const INLINE_DATA_LIMIT: u64 = 20 * 1024 * 1024;

/// Broad category of a media type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    /// `image/*`.
    Image,
    /// `audio/*`.
    Audio,
    /// `video/*`.
    Video,
    /// Documents and plain text.
    Document,
}

impl MediaKind {
    /// Categorize a MIME type string.
    #[must_use]
    pub fn of(mime_type: &str) -> Option<Self> {
        let parsed: mime::Mime = mime_type.parse().ok()?;
        let top = parsed.type_();
        if top == mime::IMAGE {
            Some(Self::Image)
        } else if top == mime::AUDIO {
            Some(Self::Audio)
        } else if top == mime::VIDEO {
            Some(Self::Video)
        } else if top == mime::TEXT || top == mime::APPLICATION {
            Some(Self::Document)
        } else {
            None
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Image => "image",
            Self::Audio => "audio",
            Self::Video => "video",
            Self::Document => "document",
        };
        f.write_str(name)
    }
}

/// Look up the MIME type for a file extension.
#[must_use]
pub fn mime_from_extension(ext: &str) -> Option<&'static str> {
    let mime = match ext.to_lowercase().as_str() {
        // Images
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "heic" => "image/heic",
        "heif" => "image/heif",
        // Audio
        "mp3" => "audio/mp3",
        "wav" => "audio/wav",
        "aiff" | "aif" => "audio/aiff",
        "aac" => "audio/aac",
        "ogg" => "audio/ogg",
        "flac" => "audio/flac",
        // Video
        "mp4" => "video/mp4",
        "mpeg" | "mpg" => "video/mpeg",
        "mov" => "video/mov",
        "avi" => "video/avi",
        "flv" => "video/x-flv",
        "webm" => "video/webm",
        "wmv" => "video/wmv",
        "3gp" | "3gpp" => "video/3gpp",
        // Documents
        "pdf" => "application/pdf",
        "txt" => "text/plain",
        "md" => "text/md",
        "html" | "htm" => "text/html",
        "csv" => "text/csv",
        "xml" => "text/xml",
        "json" => "application/json",
        "js" => "application/x-javascript",
        "py" => "application/x-python",
        "rtf" => "text/rtf",
        _ => return None,
    };
    Some(mime)
}

/// Look up the MIME type for a path, falling back to `default`.
#[must_use]
pub fn mime_for_path<'a>(path: &Path, default: &'a str) -> &'a str {
    path.extension()
        .and_then(|e| e.to_str())
        .and_then(mime_from_extension)
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_from_extension() {
        assert_eq!(mime_from_extension("PNG"), Some("image/png"));
        assert_eq!(mime_from_extension("mp3"), Some("audio/mp3"));
        assert_eq!(mime_from_extension("mp4"), Some("video/mp4"));
        assert_eq!(mime_from_extension("pdf"), Some("application/pdf"));
        assert_eq!(mime_from_extension("exe"), None);
    }

    #[test]
    fn test_mime_for_path_default() {
        assert_eq!(mime_for_path(Path::new("clip.webm"), "video/mp4"), "video/webm");
        assert_eq!(mime_for_path(Path::new("clip"), "video/mp4"), "video/mp4");
        assert_eq!(mime_for_path(Path::new("notes.unknown"), "application/pdf"), "application/pdf");
    }

    #[test]
    fn test_media_kind() {
        assert_eq!(MediaKind::of("image/png"), Some(MediaKind::Image));
        assert_eq!(MediaKind::of("audio/mp3"), Some(MediaKind::Audio));
        assert_eq!(MediaKind::of("video/mp4"), Some(MediaKind::Video));
        assert_eq!(MediaKind::of("application/pdf"), Some(MediaKind::Document));
        assert_eq!(MediaKind::of("not a mime"), None);
        assert_eq!(MediaKind::Video.to_string(), "video");
    }
}
