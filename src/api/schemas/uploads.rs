use crate::domain::media::UploadDescriptor;
use crate::domain::message::MessageType;
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub success: bool,
    pub file_url: String,
    pub thumbnail_url: Option<String>,
    pub file_name: String,
    pub file_size: u64,
    pub mime_type: String,
    pub message_type: MessageType,
}

impl From<UploadDescriptor> for UploadResponse {
    fn from(descriptor: UploadDescriptor) -> Self {
        Self {
            success: true,
            file_url: descriptor.file_url,
            thumbnail_url: descriptor.thumbnail_url,
            file_name: descriptor.file_name,
            file_size: descriptor.file_size,
            mime_type: descriptor.mime_type,
            message_type: descriptor.message_type,
        }
    }
}
