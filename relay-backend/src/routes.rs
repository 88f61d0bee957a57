//! Axum route handlers: the Telegram webhook and the status RPC API.

use crate::clock::{date_key, Clock};
use crate::dispatcher::{DispatchOutcome, UpdateDispatcher};
use crate::store::RecordStore;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::Json;
use chrono::FixedOffset;
use daily_record_types::*;
use std::sync::Arc;
use std::time::Instant;
use teloxide::types::Update;

pub const SECRET_HEADER: &str = "x-telegram-bot-api-secret-token";

pub struct AppState {
    pub dispatcher: Arc<UpdateDispatcher>,
    pub store: Arc<dyn RecordStore>,
    pub clock: Arc<dyn Clock>,
    pub start_time: Instant,
    pub source_channel_id: i64,
    pub utc_offset: FixedOffset,
    pub webhook_secret: Option<String>,
}

// POST /api/bot
pub async fn webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, Json<WebhookAck>) {
    if let Some(expected) = &state.webhook_secret {
        let provided = headers.get(SECRET_HEADER).and_then(|v| v.to_str().ok());
        if provided != Some(expected.as_str()) {
            log::warn!("[WEBHOOK] Rejected update with missing or wrong secret token");
            return (StatusCode::UNAUTHORIZED, Json(WebhookAck::ignored()));
        }
    }

    // Always acknowledge, otherwise Telegram keeps redelivering the update
    let update: Update = match serde_json::from_slice(&body) {
        Ok(u) => u,
        Err(e) => {
            log::warn!("[WEBHOOK] Ignoring malformed update: {}", e);
            return (StatusCode::OK, Json(WebhookAck::ignored()));
        }
    };

    match state.dispatcher.dispatch(&update).await {
        DispatchOutcome::Ignored => {
            log::debug!("[WEBHOOK] Update {:?} not relevant", update.id);
            (StatusCode::OK, Json(WebhookAck::ignored()))
        }
        outcome => {
            log::debug!("[WEBHOOK] Update {:?} handled: {:?}", update.id, outcome);
            (StatusCode::OK, Json(WebhookAck::ok()))
        }
    }
}

// GET /rpc/status
pub async fn status(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<RpcResponse<ServiceStatus>>) {
    let today_key = date_key(state.clock.now(), &state.utc_offset);
    let today_captured = matches!(state.store.get(&today_key).await, Ok(Some(_)));

    (
        StatusCode::OK,
        Json(RpcResponse::ok(ServiceStatus {
            running: true,
            uptime_secs: state.start_time.elapsed().as_secs(),
            source_channel_id: state.source_channel_id,
            utc_offset: state.utc_offset.to_string(),
            today_key,
            today_captured,
        })),
    )
}

// GET /rpc/record/today
pub async fn today_record(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<RpcResponse<Option<DailyRecord>>>) {
    let key = date_key(state.clock.now(), &state.utc_offset);
    match state.store.get(&key).await {
        Ok(record) => (StatusCode::OK, Json(RpcResponse::ok(record))),
        Err(e) => (StatusCode::SERVICE_UNAVAILABLE, Json(RpcResponse::err(e))),
    }
}
