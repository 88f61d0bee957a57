//! Outbound Telegram actions used by the lookup path.

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{ChatId, InputFile, MessageId};

#[async_trait]
pub trait Relay: Send + Sync {
    /// Forward `message_id` from `from_chat_id` into `target_chat_id`
    async fn forward(
        &self,
        target_chat_id: i64,
        from_chat_id: i64,
        message_id: i32,
    ) -> Result<(), String>;

    /// Send an animation by file id, with a caption
    async fn send_animation(
        &self,
        target_chat_id: i64,
        media_id: &str,
        caption: &str,
    ) -> Result<(), String>;
}

pub struct TelegramRelay {
    bot: Bot,
}

impl TelegramRelay {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl Relay for TelegramRelay {
    async fn forward(
        &self,
        target_chat_id: i64,
        from_chat_id: i64,
        message_id: i32,
    ) -> Result<(), String> {
        self.bot
            .forward_message(ChatId(target_chat_id), ChatId(from_chat_id), MessageId(message_id))
            .await
            .map(|_| ())
            .map_err(|e| format!("forwardMessage failed: {}", e))
    }

    async fn send_animation(
        &self,
        target_chat_id: i64,
        media_id: &str,
        caption: &str,
    ) -> Result<(), String> {
        self.bot
            .send_animation(ChatId(target_chat_id), InputFile::file_id(media_id.to_string()))
            .caption(caption.to_string())
            .await
            .map(|_| ())
            .map_err(|e| format!("sendAnimation failed: {}", e))
    }
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum SentAction {
        Forward {
            target: i64,
            from: i64,
            message_id: i32,
        },
        SendAnimation {
            target: i64,
            media_id: String,
            caption: String,
        },
    }

    /// Records every outbound call; forwarding and sending can be made to fail
    #[derive(Default)]
    pub struct RecordingRelay {
        pub fail_forward: bool,
        pub fail_send: bool,
        actions: Mutex<Vec<SentAction>>,
    }

    impl RecordingRelay {
        pub fn failing_forward() -> Self {
            Self {
                fail_forward: true,
                ..Default::default()
            }
        }

        pub fn failing_send() -> Self {
            Self {
                fail_send: true,
                ..Default::default()
            }
        }

        pub fn actions(&self) -> Vec<SentAction> {
            self.actions.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Relay for RecordingRelay {
        async fn forward(
            &self,
            target_chat_id: i64,
            from_chat_id: i64,
            message_id: i32,
        ) -> Result<(), String> {
            self.actions.lock().unwrap().push(SentAction::Forward {
                target: target_chat_id,
                from: from_chat_id,
                message_id,
            });
            if self.fail_forward {
                Err("Bad Request: message to forward not found".to_string())
            } else {
                Ok(())
            }
        }

        async fn send_animation(
            &self,
            target_chat_id: i64,
            media_id: &str,
            caption: &str,
        ) -> Result<(), String> {
            self.actions.lock().unwrap().push(SentAction::SendAnimation {
                target: target_chat_id,
                media_id: media_id.to_string(),
                caption: caption.to_string(),
            });
            if self.fail_send {
                Err("Forbidden: bot was kicked from the group chat".to_string())
            } else {
                Ok(())
            }
        }
    }
}
