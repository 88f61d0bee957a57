//! Capture of the daily animation from the source channel.

use crate::clock::{date_key, in_capture_window, Clock};
use crate::events::ChannelPost;
use crate::store::RecordStore;
use chrono::{Duration, FixedOffset};
use daily_record_types::DailyRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    ForeignChannel,
    OutsideWindow,
    UnsupportedMedia,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureOutcome {
    Skipped(SkipReason),
    /// Today's slot was already filled
    AlreadyCaptured,
    Captured(DailyRecord),
    StoreFailed(String),
}

pub struct CaptureSettings {
    pub source_channel_id: i64,
    pub utc_offset: FixedOffset,
    pub record_ttl: Duration,
}

/// Store `post`'s media as today's record if the post is eligible.
pub async fn handle_channel_post(
    post: &ChannelPost,
    settings: &CaptureSettings,
    store: &dyn RecordStore,
    clock: &dyn Clock,
) -> CaptureOutcome {
    if post.chat_id != settings.source_channel_id {
        log::debug!("[CAPTURE] Ignoring post from channel {}", post.chat_id);
        return CaptureOutcome::Skipped(SkipReason::ForeignChannel);
    }

    let now = clock.now();
    let local_time = post
        .posted_at
        .with_timezone(&settings.utc_offset)
        .format("%H:%M:%S")
        .to_string();

    if !in_capture_window(post.posted_at, now, &settings.utc_offset) {
        log::info!(
            "[CAPTURE] Post {} at {} is outside the capture window",
            post.message_id,
            local_time
        );
        return CaptureOutcome::Skipped(SkipReason::OutsideWindow);
    }

    let Some(media) = &post.media else {
        log::info!(
            "[CAPTURE] Post {} at {} has neither animation nor video",
            post.message_id,
            local_time
        );
        return CaptureOutcome::Skipped(SkipReason::UnsupportedMedia);
    };

    let key = date_key(now, &settings.utc_offset);

    match store.get(&key).await {
        Ok(Some(existing)) => {
            log::info!(
                "[CAPTURE] Media already saved for {} ({}), skipping post {}",
                key,
                existing.media_id,
                post.message_id
            );
            return CaptureOutcome::AlreadyCaptured;
        }
        Ok(None) => {}
        Err(e) => {
            log::error!("[CAPTURE] Could not check record for {}: {}", key, e);
            return CaptureOutcome::StoreFailed(e);
        }
    }

    let record = DailyRecord {
        date: key.clone(),
        media_id: media.media_id.clone(),
        media_kind: media.kind,
        source_message_id: post.message_id,
        captured_at: now.to_rfc3339(),
    };

    match store.set_if_absent(&key, &record, settings.record_ttl).await {
        Ok(true) => {
            log::info!(
                "[CAPTURE] Captured {} from post {} at {} for {}",
                media.kind.as_str(),
                post.message_id,
                local_time,
                key
            );
            CaptureOutcome::Captured(record)
        }
        Ok(false) => {
            log::info!("[CAPTURE] Lost the race for {}, keeping the earlier record", key);
            CaptureOutcome::AlreadyCaptured
        }
        Err(e) => {
            log::error!("[CAPTURE] Failed to save record for {}: {}", key, e);
            CaptureOutcome::StoreFailed(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{parse_utc_offset, FixedClock};
    use crate::events::Media;
    use crate::store::{DisabledStore, SqliteRecordStore};
    use chrono::{DateTime, Utc};
    use daily_record_types::MediaKind;

    const SOURCE: i64 = -1001886988651;

    fn settings() -> CaptureSettings {
        CaptureSettings {
            source_channel_id: SOURCE,
            utc_offset: parse_utc_offset("+03:30").unwrap(),
            record_ttl: Duration::days(7),
        }
    }

    fn at(rfc3339: &str) -> DateTime<Utc> {
        FixedClock::at(rfc3339).now()
    }

    fn animation_post(message_id: i32, media_id: &str, posted_at: &str) -> ChannelPost {
        ChannelPost {
            chat_id: SOURCE,
            message_id,
            posted_at: at(posted_at),
            media: Some(Media {
                kind: MediaKind::Animation,
                media_id: media_id.to_string(),
            }),
        }
    }

    #[tokio::test]
    async fn test_captures_eligible_animation() {
        let store = SqliteRecordStore::open(":memory:").unwrap();
        let clock = FixedClock::at("2025-03-02T00:00:20+03:30");
        let post = animation_post(42, "M1", "2025-03-02T00:00:15+03:30");

        let outcome = handle_channel_post(&post, &settings(), &store, &clock).await;
        match outcome {
            CaptureOutcome::Captured(record) => {
                assert_eq!(record.date, "2025-03-02");
                assert_eq!(record.media_id, "M1");
                assert_eq!(record.source_message_id, 42);
            }
            other => panic!("Expected capture, got {:?}", other),
        }

        let stored = store.get("2025-03-02").await.unwrap().unwrap();
        assert_eq!(stored.media_id, "M1");
        assert_eq!(stored.media_kind, MediaKind::Animation);
    }

    #[tokio::test]
    async fn test_captures_video() {
        let store = SqliteRecordStore::open(":memory:").unwrap();
        let clock = FixedClock::at("2025-03-02T00:01:30+03:30");
        let mut post = animation_post(50, "V1", "2025-03-02T00:01:10+03:30");
        post.media = Some(Media {
            kind: MediaKind::Video,
            media_id: "V1".to_string(),
        });

        let outcome = handle_channel_post(&post, &settings(), &store, &clock).await;
        assert!(matches!(outcome, CaptureOutcome::Captured(_)));
        assert_eq!(
            store.get("2025-03-02").await.unwrap().unwrap().media_kind,
            MediaKind::Video
        );
    }

    #[tokio::test]
    async fn test_ignores_other_channels() {
        let store = SqliteRecordStore::open(":memory:").unwrap();
        let clock = FixedClock::at("2025-03-02T00:00:20+03:30");
        let mut post = animation_post(42, "M1", "2025-03-02T00:00:15+03:30");
        post.chat_id = -1009999;

        let outcome = handle_channel_post(&post, &settings(), &store, &clock).await;
        assert_eq!(outcome, CaptureOutcome::Skipped(SkipReason::ForeignChannel));
        assert_eq!(store.get("2025-03-02").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_ignores_posts_outside_window() {
        let store = SqliteRecordStore::open(":memory:").unwrap();
        let clock = FixedClock::at("2025-03-02T09:00:00+03:30");

        for posted_at in [
            "2025-03-02T00:02:00+03:30",
            "2025-03-02T08:59:00+03:30",
            "2025-03-01T23:59:59+03:30",
            // Yesterday's midnight window
            "2025-03-01T00:00:30+03:30",
        ] {
            let post = animation_post(42, "M1", posted_at);
            let outcome = handle_channel_post(&post, &settings(), &store, &clock).await;
            assert_eq!(
                outcome,
                CaptureOutcome::Skipped(SkipReason::OutsideWindow),
                "posted at {}",
                posted_at
            );
        }

        assert_eq!(store.get("2025-03-02").await.unwrap(), None);
        assert_eq!(store.get("2025-03-01").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_ignores_posts_without_animation_or_video() {
        let store = SqliteRecordStore::open(":memory:").unwrap();
        let clock = FixedClock::at("2025-03-02T00:00:20+03:30");
        let mut post = animation_post(42, "M1", "2025-03-02T00:00:15+03:30");
        post.media = None;

        let outcome = handle_channel_post(&post, &settings(), &store, &clock).await;
        assert_eq!(outcome, CaptureOutcome::Skipped(SkipReason::UnsupportedMedia));
        assert_eq!(store.get("2025-03-02").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_first_post_of_the_day_wins() {
        let store = SqliteRecordStore::open(":memory:").unwrap();
        let clock = FixedClock::at("2025-03-02T00:01:50+03:30");

        let first = animation_post(42, "M1", "2025-03-02T00:00:05+03:30");
        let second = animation_post(43, "M2", "2025-03-02T00:01:45+03:30");

        assert!(matches!(
            handle_channel_post(&first, &settings(), &store, &clock).await,
            CaptureOutcome::Captured(_)
        ));
        assert_eq!(
            handle_channel_post(&second, &settings(), &store, &clock).await,
            CaptureOutcome::AlreadyCaptured
        );

        let stored = store.get("2025-03-02").await.unwrap().unwrap();
        assert_eq!(stored.media_id, "M1");
        assert_eq!(stored.source_message_id, 42);
    }

    #[tokio::test]
    async fn test_store_failure_is_reported_not_raised() {
        let store = DisabledStore::new("no database");
        let clock = FixedClock::at("2025-03-02T00:00:20+03:30");
        let post = animation_post(42, "M1", "2025-03-02T00:00:15+03:30");

        let outcome = handle_channel_post(&post, &settings(), &store, &clock).await;
        assert!(matches!(outcome, CaptureOutcome::StoreFailed(_)));
    }
}
