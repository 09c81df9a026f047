/// Generic reason attached to every fail-closed verdict.
pub const UNAVAILABLE_REASON: &str = "Content moderation service unavailable. Please try again later.";

/// Reason used when the backend blocks content without explaining why.
pub const DEFAULT_REJECTION_REASON: &str = "This type of content is not permitted on our platform.";

/// Outcome of screening one media file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Appropriate,
    /// The backend classified the content as not allowed.
    Inappropriate { reason: Option<String> },
    /// The check could not be completed; treated as a block.
    Unavailable { reason: String },
}

impl Verdict {
    #[must_use]
    pub fn unavailable() -> Self {
        Self::Unavailable { reason: UNAVAILABLE_REASON.to_string() }
    }

    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Appropriate => "appropriate",
            Self::Inappropriate { .. } => "inappropriate",
            Self::Unavailable { .. } => "unavailable",
        }
    }
}

/// The bytes and metadata handed to a moderator.
#[derive(Debug, Clone, Copy)]
pub struct MediaSample<'a> {
    pub bytes: &'a [u8],
    pub mime_type: &'a str,
    pub file_name: &'a str,
}

impl MediaSample<'_> {
    /// Only images and videos are screened.
    #[must_use]
    pub fn needs_screening(&self) -> bool {
        self.mime_type.starts_with("image/") || self.mime_type.starts_with("video/")
    }

    #[must_use]
    pub fn family(&self) -> &'static str {
        if self.mime_type.starts_with("video/") { "video" } else { "image" }
    }
}
