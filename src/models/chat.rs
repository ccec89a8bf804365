//! Chat and message models.

use serde::{Deserialize, Serialize};

/// A conversation between two or more users.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chat {
    pub chat_id: u64,
    /// Member user IDs
    pub members: Vec<u64>,
    /// Creation timestamp (ISO 8601)
    pub created_at: String,
}

/// One message in a chat. At least one of the content fields is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub message_id: u64,
    pub chat_id: u64,
    pub sender_id: u64,
    #[serde(default)]
    pub text: Option<String>,
    /// Attachment paths under /uploads
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub document: Option<String>,
    #[serde(default)]
    pub audio: Option<String>,
    /// Send timestamp (ISO 8601)
    pub created_at: String,
}

impl Message {
    /// A message must carry some content.
    pub fn has_content(&self) -> bool {
        self.text.as_deref().is_some_and(|t| !t.is_empty())
            || self.image.is_some()
            || self.document.is_some()
            || self.audio.is_some()
    }
}
