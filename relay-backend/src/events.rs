//! Inbound event shapes and their extraction from Telegram updates.

use chrono::{DateTime, Utc};
use daily_record_types::MediaKind;
use teloxide::types::{Message, Update, UpdateKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Media {
    pub kind: MediaKind,
    pub media_id: String,
}

/// A post published in a channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelPost {
    pub chat_id: i64,
    pub message_id: i32,
    pub posted_at: DateTime<Utc>,
    pub media: Option<Media>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatKind {
    Private,
    Group,
    Supergroup,
    Channel,
}

impl ChatKind {
    pub fn is_group_chat(&self) -> bool {
        matches!(self, ChatKind::Group | ChatKind::Supergroup)
    }
}

/// A text message sent to a chat the bot is in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatText {
    pub chat_id: i64,
    pub chat_kind: ChatKind,
    pub chat_title: Option<String>,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    ChannelPost(ChannelPost),
    ChatText(ChatText),
}

/// Map an update to the event it carries, if the relay cares about it.
pub fn classify(update: &Update) -> Option<InboundEvent> {
    match &update.kind {
        UpdateKind::ChannelPost(msg) => Some(InboundEvent::ChannelPost(channel_post(msg))),
        UpdateKind::Message(msg) => chat_text(msg).map(InboundEvent::ChatText),
        _ => None,
    }
}

fn channel_post(msg: &Message) -> ChannelPost {
    let media = if let Some(animation) = msg.animation() {
        Some(Media {
            kind: MediaKind::Animation,
            media_id: animation.file.id.clone(),
        })
    } else {
        msg.video().map(|video| Media {
            kind: MediaKind::Video,
            media_id: video.file.id.clone(),
        })
    };

    ChannelPost {
        chat_id: msg.chat.id.0,
        message_id: msg.id.0,
        posted_at: msg.date,
        media,
    }
}

fn chat_text(msg: &Message) -> Option<ChatText> {
    let text = msg.text()?;

    let chat_kind = if msg.chat.is_supergroup() {
        ChatKind::Supergroup
    } else if msg.chat.is_group() {
        ChatKind::Group
    } else if msg.chat.is_channel() {
        ChatKind::Channel
    } else {
        ChatKind::Private
    };

    Some(ChatText {
        chat_id: msg.chat.id.0,
        chat_kind,
        chat_title: msg.chat.title().map(|t| t.to_string()),
        text: text.to_string(),
    })
}
