use crate::clock::parse_utc_offset;
use chrono::{Duration, FixedOffset};
use std::env;

#[derive(Clone)]
pub struct Config {
    pub bot_token: String,
    pub source_channel_id: i64,
    pub fallback_animation_id: String,
    pub utc_offset: FixedOffset,
    pub db_path: String,
    pub host: String,
    pub port: u16,
    pub record_ttl: Duration,
    pub housekeeping_interval_secs: u64,
    pub webhook_url: Option<url::Url>,
    pub webhook_secret: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build and validate the config from any key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &str| get(key).ok_or_else(|| format!("{} must be set", key));

        let bot_token = required("TELEGRAM_BOT_TOKEN")?;

        let source_channel_id = required("SOURCE_CHANNEL_ID")?
            .trim()
            .parse::<i64>()
            .map_err(|e| format!("SOURCE_CHANNEL_ID must be a numeric chat id: {}", e))?;

        let fallback_animation_id = required("FALLBACK_ANIMATION_ID")?.trim().to_string();

        let utc_offset = match get("RELAY_UTC_OFFSET") {
            Some(raw) => parse_utc_offset(&raw)
                .map_err(|e| format!("RELAY_UTC_OFFSET is invalid: {}", e))?,
            None => parse_utc_offset("+03:30")?,
        };

        let port = get("RELAY_PORT")
            .unwrap_or_else(|| "9110".to_string())
            .parse::<u16>()
            .map_err(|e| format!("RELAY_PORT must be a valid number: {}", e))?;

        let ttl_days = get("RECORD_TTL_DAYS")
            .unwrap_or_else(|| "7".to_string())
            .parse::<i64>()
            .map_err(|e| format!("RECORD_TTL_DAYS must be a valid number: {}", e))?;
        if ttl_days < 1 {
            return Err("RECORD_TTL_DAYS must be at least 1".to_string());
        }

        let housekeeping_interval_secs = get("HOUSEKEEPING_INTERVAL_SECS")
            .unwrap_or_else(|| "3600".to_string())
            .parse::<u64>()
            .map_err(|e| format!("HOUSEKEEPING_INTERVAL_SECS must be a valid number: {}", e))?;
        if housekeeping_interval_secs == 0 {
            return Err("HOUSEKEEPING_INTERVAL_SECS must be greater than 0".to_string());
        }

        let webhook_url = get("TELEGRAM_WEBHOOK_URL")
            .map(|raw| {
                url::Url::parse(raw.trim())
                    .map_err(|e| format!("TELEGRAM_WEBHOOK_URL is not a valid URL: {}", e))
            })
            .transpose()?;

        Ok(Self {
            bot_token,
            source_channel_id,
            fallback_animation_id,
            utc_offset,
            db_path: get("RELAY_DB_PATH").unwrap_or_else(|| "./daily_relay.db".to_string()),
            host: get("RELAY_HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port,
            record_ttl: Duration::days(ttl_days),
            housekeeping_interval_secs,
            webhook_url,
            webhook_secret: get("TELEGRAM_WEBHOOK_SECRET"),
        })
    }
}
