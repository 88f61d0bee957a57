//! Answering "what day is it" in group chats with today's captured media.

use crate::clock::{date_key, Clock};
use crate::events::ChatText;
use crate::relay::Relay;
use crate::store::RecordStore;
use chrono::FixedOffset;

/// Phrases that trigger a reply when they appear anywhere in a message
pub const QUERY_PHRASES: [&str; 2] = ["امروز چندمه", "امروز چه روزیه"];

const CAPTION_NOT_CAPTURED: &str =
    "امروز گیفی در بازه 00:00 تا 00:01 در کانال پیدا نشد، این گیف پیش‌فرض است.";
const CAPTION_RELAY_FAILED: &str =
    "متاسفانه گیف امروز پیدا نشد یا قابل فوروارد نبود، این گیف پیش‌فرض است.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackReason {
    /// No record for today (or the store could not be read)
    NotCaptured,
    RelayFailed,
}

impl FallbackReason {
    pub fn caption(&self) -> &'static str {
        match self {
            FallbackReason::NotCaptured => CAPTION_NOT_CAPTURED,
            FallbackReason::RelayFailed => CAPTION_RELAY_FAILED,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    NotGroupChat,
    NoMatch,
    Relayed { message_id: i32 },
    Fallback { reason: FallbackReason, delivered: bool },
}

pub struct LookupSettings {
    pub source_channel_id: i64,
    pub fallback_animation_id: String,
    pub utc_offset: FixedOffset,
}

pub fn matches_query(text: &str) -> bool {
    QUERY_PHRASES.iter().any(|phrase| text.contains(phrase))
}

/// Reply to a matching group message with today's media or the fallback.
pub async fn handle_chat_text(
    message: &ChatText,
    settings: &LookupSettings,
    store: &dyn RecordStore,
    relay: &dyn Relay,
    clock: &dyn Clock,
) -> LookupOutcome {
    if !message.chat_kind.is_group_chat() {
        log::debug!("[LOOKUP] Ignoring text outside a group (chat {})", message.chat_id);
        return LookupOutcome::NotGroupChat;
    }

    if !matches_query(&message.text) {
        return LookupOutcome::NoMatch;
    }

    let chat_label = message.chat_title.as_deref().unwrap_or("untitled");
    log::info!(
        "[LOOKUP] Query '{}' in group {} ({})",
        message.text,
        chat_label,
        message.chat_id
    );

    let key = date_key(clock.now(), &settings.utc_offset);
    let record = match store.get(&key).await {
        Ok(record) => record,
        Err(e) => {
            log::error!("[LOOKUP] Could not read record for {}: {}", key, e);
            None
        }
    };

    let reason = match record {
        Some(record) => {
            match relay
                .forward(message.chat_id, settings.source_channel_id, record.source_message_id)
                .await
            {
                Ok(()) => {
                    log::info!(
                        "[LOOKUP] Forwarded message {} to group {}",
                        record.source_message_id,
                        chat_label
                    );
                    return LookupOutcome::Relayed {
                        message_id: record.source_message_id,
                    };
                }
                Err(e) => {
                    log::warn!(
                        "[LOOKUP] Forwarding message {} failed: {}. Sending fallback",
                        record.source_message_id,
                        e
                    );
                    FallbackReason::RelayFailed
                }
            }
        }
        None => {
            log::info!("[LOOKUP] Nothing captured for {}. Sending fallback", key);
            FallbackReason::NotCaptured
        }
    };

    let delivered = match relay
        .send_animation(message.chat_id, &settings.fallback_animation_id, reason.caption())
        .await
    {
        Ok(()) => true,
        Err(e) => {
            log::error!(
                "[LOOKUP] Failed to send fallback to group {}: {}",
                chat_label,
                e
            );
            false
        }
    };

    LookupOutcome::Fallback { reason, delivered }
}
