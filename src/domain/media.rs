use crate::domain::message::MessageType;
use thiserror::Error;

pub const IMAGE_MIME_TYPES: &[&str] = &["image/jpeg", "image/jpg", "image/png", "image/gif", "image/webp"];
pub const VIDEO_MIME_TYPES: &[&str] = &["video/mp4", "video/webm", "video/ogg", "video/quicktime"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    #[must_use]
    pub const fn message_type(self) -> MessageType {
        match self {
            Self::Image => MessageType::Image,
            Self::Video => MessageType::Video,
        }
    }
}

/// A file that passed the policy, with its MIME type in canonical lowercase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptedMedia {
    pub kind: MediaKind,
    pub mime_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MediaRejection {
    #[error("File size too large. Maximum size is {max_mib}MB")]
    SizeExceeded { size: usize, max_mib: usize },
    #[error("Invalid file type {mime_type}. Only images and videos are allowed")]
    UnsupportedType { mime_type: String },
}

/// Size and type gate applied to every upload before any processing.
#[derive(Debug, Clone, Copy)]
pub struct MediaPolicy {
    max_bytes: usize,
}

impl MediaPolicy {
    #[must_use]
    pub const fn new(max_bytes: usize) -> Self {
        Self { max_bytes }
    }

    /// Accepts a file by its declared size and MIME type.
    ///
    /// The size check runs first, so an oversized file is rejected as such
    /// whatever its type. The returned MIME type is lowercased and is the one
    /// the rest of the pipeline should use.
    ///
    /// # Errors
    /// Returns the violated constraint.
    pub fn validate(&self, size: usize, mime_type: &str) -> Result<AcceptedMedia, MediaRejection> {
        if size > self.max_bytes {
            return Err(MediaRejection::SizeExceeded { size, max_mib: self.max_bytes / (1024 * 1024) });
        }

        let mime = mime_type.trim().to_ascii_lowercase();
        let kind = if IMAGE_MIME_TYPES.contains(&mime.as_str()) {
            MediaKind::Image
        } else if VIDEO_MIME_TYPES.contains(&mime.as_str()) {
            MediaKind::Video
        } else {
            return Err(MediaRejection::UnsupportedType { mime_type: mime_type.to_string() });
        };
        Ok(AcceptedMedia { kind, mime_type: mime })
    }
}

/// Extension (with leading dot) used when the client's file name has none.
#[must_use]
pub fn extension_for_mime(mime_type: &str) -> &'static str {
    match mime_type {
        "image/jpeg" | "image/jpg" => ".jpg",
        "image/png" => ".png",
        "image/gif" => ".gif",
        "image/webp" => ".webp",
        "video/mp4" => ".mp4",
        "video/webm" => ".webm",
        "video/ogg" => ".ogv",
        "video/quicktime" => ".mov",
        _ => "",
    }
}

/// Describes a stored media file; returned to the client, which attaches it
/// to the message it sends next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadDescriptor {
    pub file_url: String,
    pub thumbnail_url: Option<String>,
    pub file_name: String,
    pub file_size: u64,
    pub mime_type: String,
    pub message_type: MessageType,
}
