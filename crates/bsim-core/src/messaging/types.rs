use crate::domain::ChatId;

/// A plain text message received by the bot, already stripped of
/// messenger-specific envelope data.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IncomingText {
    pub chat_id: ChatId,
    pub text: String,
}

/// Limits of a messenger implementation.
#[derive(Clone, Copy, Debug)]
pub struct MessagingCapabilities {
    pub max_message_len: usize,
}
