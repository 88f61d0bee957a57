//! Daily Relay — captures the midnight animation posted to a source channel
//! and forwards it to groups asking what day it is.
//!
//! Receives Telegram updates on a webhook and hosts a small status RPC API.
//! Default: http://127.0.0.1:9110/

mod capture;
mod clock;
mod config;
mod dispatcher;
mod events;
mod housekeeping;
mod lookup;
mod relay;
mod routes;
mod store;

use capture::CaptureSettings;
use clock::{Clock, SystemClock};
use config::Config;
use dispatcher::UpdateDispatcher;
use lookup::LookupSettings;
use relay::TelegramRelay;
use routes::AppState;
use std::sync::Arc;
use std::time::Instant;
use store::{DisabledStore, RecordStore, SqliteRecordStore};
use teloxide::prelude::*;
use teloxide::types::AllowedUpdate;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    env_logger::init();

    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            log::error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    log::info!("Opening database at: {}", config.db_path);
    let store: Arc<dyn RecordStore> = match SqliteRecordStore::open(&config.db_path) {
        Ok(s) => Arc::new(s),
        Err(e) => {
            log::error!("Record store unavailable, captures will be skipped: {}", e);
            Arc::new(DisabledStore::new(e))
        }
    };

    let bot = Bot::new(config.bot_token.clone());
    if let Some(url) = &config.webhook_url {
        register_webhook(&bot, url.clone(), config.webhook_secret.clone()).await;
    }

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let dispatcher = UpdateDispatcher::new(
        store.clone(),
        Arc::new(TelegramRelay::new(bot)),
        clock.clone(),
        CaptureSettings {
            source_channel_id: config.source_channel_id,
            utc_offset: config.utc_offset,
            record_ttl: config.record_ttl,
        },
        LookupSettings {
            source_channel_id: config.source_channel_id,
            fallback_animation_id: config.fallback_animation_id.clone(),
            utc_offset: config.utc_offset,
        },
    );

    let worker_store = store.clone();
    let interval = config.housekeeping_interval_secs;
    tokio::spawn(async move {
        housekeeping::run_worker(worker_store, interval).await;
    });

    let state = Arc::new(AppState {
        dispatcher: Arc::new(dispatcher),
        store,
        clock,
        start_time: Instant::now(),
        source_channel_id: config.source_channel_id,
        utc_offset: config.utc_offset,
        webhook_secret: config.webhook_secret.clone(),
    });

    let cors = tower_http::cors::CorsLayer::permissive();

    let app = axum::Router::new()
        .route("/api/bot", axum::routing::post(routes::webhook))
        .route("/rpc/status", axum::routing::get(routes::status))
        .route("/rpc/record/today", axum::routing::get(routes::today_record))
        .with_state(state)
        .layer(cors);

    let addr = format!("{}:{}", config.host, config.port);
    log::info!(
        "Daily Relay listening on http://{} (source channel {}, offset {})",
        addr,
        config.source_channel_id,
        config.utc_offset
    );

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            log::error!("Failed to bind {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    if let Err(e) = axum::serve(listener, app).await {
        log::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Point Telegram at our webhook. Failure is logged and startup continues.
async fn register_webhook(bot: &Bot, url: url::Url, secret: Option<String>) {
    let mut request = bot
        .set_webhook(url.clone())
        .allowed_updates(vec![AllowedUpdate::Message, AllowedUpdate::ChannelPost]);
    if let Some(secret) = secret {
        request = request.secret_token(secret);
    }

    match request.await {
        Ok(_) => log::info!("[WEBHOOK] Registered webhook at {}", url),
        Err(e) => log::error!("[WEBHOOK] Failed to register webhook at {}: {}", url, e),
    }
}
