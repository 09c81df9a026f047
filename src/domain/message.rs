use crate::domain::user::UserProfile;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

pub const IMAGE_PLACEHOLDER: &str = "📷 Image";
pub const VIDEO_PLACEHOLDER: &str = "🎥 Video";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    #[default]
    Text,
    Image,
    Video,
}

impl MessageType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Image => "image",
            Self::Video => "video",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "text" => Some(Self::Text),
            "image" => Some(Self::Image),
            "video" => Some(Self::Video),
            _ => None,
        }
    }

    /// Summary text shown for media messages instead of the file name.
    #[must_use]
    pub const fn placeholder(self) -> Option<&'static str> {
        match self {
            Self::Text => None,
            Self::Image => Some(IMAGE_PLACEHOLDER),
            Self::Video => Some(VIDEO_PLACEHOLDER),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFile {
    pub file_url: String,
    pub file_name: Option<String>,
    pub file_size: Option<i64>,
    pub mime_type: Option<String>,
    pub thumbnail_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Message {
    pub id: Uuid,
    pub chat_id: Uuid,
    pub sender_id: Uuid,
    pub message_type: MessageType,
    pub content: Option<String>,
    pub media: Option<MediaFile>,
    pub is_video_note: bool,
    pub timestamp: OffsetDateTime,
}

impl Message {
    /// The text the chat summary shows for this message.
    #[must_use]
    pub fn display_text(&self) -> String {
        match (&self.content, self.message_type.placeholder()) {
            (Some(content), _) => content.clone(),
            (None, Some(placeholder)) => placeholder.to_string(),
            (None, None) => String::new(),
        }
    }

    #[must_use]
    pub fn is_from(&self, user_id: Uuid) -> bool {
        self.sender_id == user_id
    }
}

/// A message joined with its sender's public profile.
#[derive(Debug, Clone)]
pub struct PopulatedMessage {
    pub message: Message,
    pub sender: UserProfile,
}

/// Client-supplied message fields before validation.
#[derive(Debug, Clone, Default)]
pub struct MessageDraft {
    pub message_type: Option<MessageType>,
    pub content: Option<String>,
    pub file_url: Option<String>,
    pub file_name: Option<String>,
    pub file_size: Option<i64>,
    pub mime_type: Option<String>,
    pub thumbnail_url: Option<String>,
    pub is_video_note: Option<bool>,
}

/// A message that passed shape validation and is ready to persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
    pub message_type: MessageType,
    pub content: String,
    pub media: Option<MediaFile>,
    pub is_video_note: bool,
}

impl MessageDraft {
    /// Checks the payload shape for its message type.
    ///
    /// Text needs non-blank content; media needs a file URL and gets the
    /// placeholder as its content.
    ///
    /// # Errors
    /// Returns a human-readable reason when the shape is invalid.
    pub fn validate(self) -> Result<NewMessage, String> {
        let message_type = self.message_type.unwrap_or_default();

        match message_type.placeholder() {
            None => {
                let content = self.content.filter(|c| !c.trim().is_empty());
                let Some(content) = content else {
                    return Err("Content is required for text messages".to_string());
                };
                Ok(NewMessage { message_type, content, media: None, is_video_note: false })
            }
            Some(placeholder) => {
                let file_url = self.file_url.filter(|u| !u.trim().is_empty());
                let Some(file_url) = file_url else {
                    return Err("File URL is required for media messages".to_string());
                };
                if self.file_size.is_some_and(|s| s < 0) {
                    return Err("File size must not be negative".to_string());
                }
                Ok(NewMessage {
                    message_type,
                    content: placeholder.to_string(),
                    media: Some(MediaFile {
                        file_url,
                        file_name: self.file_name,
                        file_size: self.file_size,
                        mime_type: self.mime_type,
                        thumbnail_url: self.thumbnail_url,
                    }),
                    is_video_note: message_type == MessageType::Video && self.is_video_note.unwrap_or(false),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(content: &str) -> MessageDraft {
        MessageDraft { message_type: Some(MessageType::Text), content: Some(content.to_string()), ..Default::default() }
    }

    #[test]
    fn test_blank_text_is_rejected() {
        assert!(text("").validate().is_err());
        assert!(text("   \n\t").validate().is_err());
        assert!(MessageDraft::default().validate().is_err());
    }

    #[test]
    fn test_text_keeps_content_verbatim() {
        let msg = text("  hi there ").validate().unwrap();
        assert_eq!(msg.message_type, MessageType::Text);
        assert_eq!(msg.content, "  hi there ");
        assert!(msg.media.is_none());
    }

    #[test]
    fn test_media_requires_file_url() {
        let draft = MessageDraft { message_type: Some(MessageType::Image), ..Default::default() };
        assert!(draft.validate().is_err());
    }

    #[test]
    fn test_media_uses_placeholder_content() {
        let draft = MessageDraft {
            message_type: Some(MessageType::Image),
            content: Some("holiday.jpg".to_string()),
            file_url: Some("/uploads/1_abc.webp".to_string()),
            ..Default::default()
        };
        let msg = draft.validate().unwrap();
        assert_eq!(msg.content, IMAGE_PLACEHOLDER);
        assert_eq!(msg.media.unwrap().file_url, "/uploads/1_abc.webp");
    }

    #[test]
    fn test_video_note_only_applies_to_video() {
        let image = MessageDraft {
            message_type: Some(MessageType::Image),
            file_url: Some("/uploads/a.webp".to_string()),
            is_video_note: Some(true),
            ..Default::default()
        };
        assert!(!image.validate().unwrap().is_video_note);

        let video = MessageDraft {
            message_type: Some(MessageType::Video),
            file_url: Some("/uploads/a.mp4".to_string()),
            is_video_note: Some(true),
            ..Default::default()
        };
        let msg = video.validate().unwrap();
        assert!(msg.is_video_note);
        assert_eq!(msg.content, VIDEO_PLACEHOLDER);
    }

    #[test]
    fn test_display_text_falls_back_to_placeholder() {
        let msg = Message {
            id: Uuid::new_v4(),
            chat_id: Uuid::new_v4(),
            sender_id: Uuid::new_v4(),
            message_type: MessageType::Video,
            content: None,
            media: None,
            is_video_note: false,
            timestamp: OffsetDateTime::now_utc(),
        };
        assert_eq!(msg.display_text(), VIDEO_PLACEHOLDER);
    }
}
