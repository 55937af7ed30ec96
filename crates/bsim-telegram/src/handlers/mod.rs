//! Webhook update handlers.
//!
//! Only plain text messages are acted upon; every other update kind is
//! acknowledged and dropped.

use teloxide::types::{Update, UpdateKind};

use bsim_core::{
    domain::ChatId, messaging::port::MessagingPort, messaging::types::IncomingText,
    replies::EntryReply, Result,
};

mod text;

pub use text::handle_text;

/// Pull the chat and text out of a message update.
pub fn incoming_text(update: &Update) -> Option<IncomingText> {
    let UpdateKind::Message(msg) = &update.kind else {
        return None;
    };
    let text = msg.text()?;
    Some(IncomingText {
        chat_id: ChatId(msg.chat.id.0),
        text: text.to_string(),
    })
}

/// Handle one webhook update. Returns the reply that was sent, if any.
pub async fn handle_update(
    update: &Update,
    messenger: &dyn MessagingPort,
    mini_app_url: &str,
) -> Result<Option<EntryReply>> {
    let Some(incoming) = incoming_text(update) else {
        tracing::debug!(update_id = ?update.id, "ignoring non-text update");
        return Ok(None);
    };
    handle_text(&incoming, messenger, mini_app_url).await.map(Some)
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use bsim_core::{
        domain::{ChatId, MessageId, MessageRef},
        messaging::{port::MessagingPort, types::MessagingCapabilities},
        Result,
    };

    pub struct FakeMessenger {
        pub max_len: usize,
        pub sent: Mutex<Vec<(ChatId, String)>>,
    }

    impl FakeMessenger {
        pub fn new(max_len: usize) -> Self {
            Self {
                max_len,
                sent: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl MessagingPort for FakeMessenger {
        fn capabilities(&self) -> MessagingCapabilities {
            MessagingCapabilities {
                max_message_len: self.max_len,
            }
        }

        async fn send_html(&self, chat_id: ChatId, html: &str) -> Result<MessageRef> {
            let mut sent = self.sent.lock().unwrap();
            sent.push((chat_id, html.to_string()));
            Ok(MessageRef {
                chat_id,
                message_id: MessageId(sent.len() as i32),
            })
        }
    }
}
