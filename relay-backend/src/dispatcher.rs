//! Routes classified Telegram updates to the capture and lookup handlers.

use crate::capture::{self, CaptureOutcome, CaptureSettings};
use crate::clock::Clock;
use crate::events::{self, InboundEvent};
use crate::lookup::{self, LookupOutcome, LookupSettings};
use crate::relay::Relay;
use crate::store::RecordStore;
use std::sync::Arc;
use teloxide::types::Update;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Ignored,
    Capture(CaptureOutcome),
    Lookup(LookupOutcome),
}

pub struct UpdateDispatcher {
    store: Arc<dyn RecordStore>,
    relay: Arc<dyn Relay>,
    clock: Arc<dyn Clock>,
    capture: CaptureSettings,
    lookup: LookupSettings,
}

impl UpdateDispatcher {
    pub fn new(
        store: Arc<dyn RecordStore>,
        relay: Arc<dyn Relay>,
        clock: Arc<dyn Clock>,
        capture: CaptureSettings,
        lookup: LookupSettings,
    ) -> Self {
        Self {
            store,
            relay,
            clock,
            capture,
            lookup,
        }
    }

    pub async fn dispatch(&self, update: &Update) -> DispatchOutcome {
        match events::classify(update) {
            Some(event) => self.dispatch_event(&event).await,
            None => DispatchOutcome::Ignored,
        }
    }

    pub async fn dispatch_event(&self, event: &InboundEvent) -> DispatchOutcome {
        match event {
            InboundEvent::ChannelPost(post) => DispatchOutcome::Capture(
                capture::handle_channel_post(
                    post,
                    &self.capture,
                    self.store.as_ref(),
                    self.clock.as_ref(),
                )
                .await,
            ),
            InboundEvent::ChatText(message) => DispatchOutcome::Lookup(
                lookup::handle_chat_text(
                    message,
                    &self.lookup,
                    self.store.as_ref(),
                    self.relay.as_ref(),
                    self.clock.as_ref(),
                )
                .await,
            ),
        }
    }
}
