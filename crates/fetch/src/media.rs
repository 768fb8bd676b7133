//! Media kind detection from MIME types and file extensions.

use std::path::Path;

use serde::Serialize;

/// What kind of content a fetched resource holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Image,
    Video,
    Audio,
    Presentation,
    Service,
    Other,
}

const IMAGE_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "bmp", "gif", "tiff", "tif", "webp", "svg",
];
const VIDEO_EXTENSIONS: &[&str] = &[
    "mp4", "avi", "mov", "mkv", "wmv", "flv", "webm", "m4v", "3gp",
];
const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "ogg", "flac", "aac", "m4a", "wma"];
const PRESENTATION_EXTENSIONS: &[&str] = &["pdf", "pptx", "ppt", "pptm", "pps", "ppsx", "odp"];
const SERVICE_EXTENSIONS: &[&str] = &["json"];

impl MediaKind {
    /// Classify by file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Self {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return Self::Other;
        };
        Self::from_extension(&ext.to_ascii_lowercase())
    }

    pub fn from_extension(ext: &str) -> Self {
        if IMAGE_EXTENSIONS.contains(&ext) {
            Self::Image
        } else if VIDEO_EXTENSIONS.contains(&ext) {
            Self::Video
        } else if AUDIO_EXTENSIONS.contains(&ext) {
            Self::Audio
        } else if PRESENTATION_EXTENSIONS.contains(&ext) {
            Self::Presentation
        } else if SERVICE_EXTENSIONS.contains(&ext) {
            Self::Service
        } else {
            Self::Other
        }
    }
}

/// Map a MIME type to a canonical file extension, ignoring parameters such
/// as `; charset=utf-8`. Returns `None` for unrecognized types.
pub fn extension_for_content_type(content_type: &str) -> Option<&'static str> {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();
    let ext = match mime.as_str() {
        "image/jpeg" | "image/jpg" => "jpg",
        "image/png" => "png",
        "image/gif" => "gif",
        "image/bmp" => "bmp",
        "image/tiff" | "image/tif" => "tiff",
        "image/webp" => "webp",
        "image/svg+xml" => "svg",

        "video/mp4" => "mp4",
        "video/avi" | "video/x-msvideo" => "avi",
        "video/quicktime" => "mov",
        "video/x-ms-wmv" => "wmv",
        "video/x-flv" => "flv",
        "video/webm" => "webm",
        "video/3gpp" => "3gp",
        "video/x-matroska" => "mkv",

        "audio/mpeg" | "audio/mp3" => "mp3",
        "audio/wav" | "audio/wave" | "audio/x-wav" => "wav",
        "audio/ogg" => "ogg",
        "audio/flac" => "flac",
        "audio/aac" => "aac",
        "audio/mp4" => "m4a",
        "audio/x-ms-wma" => "wma",

        "application/pdf" => "pdf",
        "application/vnd.openxmlformats-officedocument.presentationml.presentation" => "pptx",
        "application/vnd.ms-powerpoint" => "ppt",
        "application/vnd.ms-powerpoint.presentation.macroenabled.12" => "pptm",
        "application/vnd.oasis.opendocument.presentation" => "odp",

        "application/json" => "json",

        _ => return None,
    };
    Some(ext)
}
