use teloxide::types::MessageId;

/// Key of the singleton state document.
pub const ANNOUNCEMENT_STATE_KEY: &str = "main";

/// The id of the last message posted to the channel. The message itself may be gone already.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AnnouncementState {
    pub last_message_id: Option<MessageId>,
}

impl AnnouncementState {
    pub fn published(message_id: MessageId) -> Self {
        Self { last_message_id: Some(message_id) }
    }
}

impl From<Option<i32>> for AnnouncementState {
    fn from(value: Option<i32>) -> Self {
        Self { last_message_id: value.map(MessageId) }
    }
}
