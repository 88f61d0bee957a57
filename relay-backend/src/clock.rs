//! Time source and calendar helpers for the relay's authoritative timezone.

use chrono::{DateTime, FixedOffset, Timelike, Utc};

/// Minutes after local midnight during which a channel post can be captured
pub const CAPTURE_WINDOW_MINUTES: u32 = 2;

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock pinned to a single instant
#[cfg(test)]
pub struct FixedClock(pub DateTime<Utc>);

#[cfg(test)]
impl FixedClock {
    /// Parse an RFC 3339 instant, e.g. `2025-03-01T00:00:30+03:30`
    pub fn at(rfc3339: &str) -> Self {
        Self(
            DateTime::parse_from_rfc3339(rfc3339)
                .unwrap()
                .with_timezone(&Utc),
        )
    }
}

#[cfg(test)]
impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Parse the configured timezone.
///
/// Accepts `UTC`/`Z`, the `Asia/Tehran` zone name (fixed at +03:30, no DST
/// since 2022), or an explicit `±HH:MM` / `±HHMM` offset.
pub fn parse_utc_offset(raw: &str) -> Result<FixedOffset, String> {
    let raw = raw.trim();
    match raw {
        "UTC" | "Z" | "Etc/UTC" => return fixed_offset(0),
        "Asia/Tehran" => return fixed_offset(3 * 3600 + 30 * 60),
        _ => {}
    }

    let (sign, rest) = match raw.chars().next() {
        Some('+') => (1, &raw[1..]),
        Some('-') => (-1, &raw[1..]),
        _ => return Err(format!("expected ±HH:MM, got '{}'", raw)),
    };

    let digits = match rest.as_bytes() {
        [h1, h2, b':', m1, m2] | [h1, h2, m1, m2] => [*h1, *h2, *m1, *m2],
        _ => return Err(format!("expected ±HH:MM, got '{}'", raw)),
    };
    if !digits.iter().all(|c| c.is_ascii_digit()) {
        return Err(format!("expected ±HH:MM, got '{}'", raw));
    }
    let digits = String::from_utf8_lossy(&digits);

    let hours: i32 = digits[..2].parse().map_err(|e| format!("bad hours: {}", e))?;
    let minutes: i32 = digits[2..].parse().map_err(|e| format!("bad minutes: {}", e))?;
    if hours > 14 || minutes > 59 {
        return Err(format!("offset out of range: '{}'", raw));
    }

    fixed_offset(sign * (hours * 3600 + minutes * 60))
}

fn fixed_offset(seconds: i32) -> Result<FixedOffset, String> {
    FixedOffset::east_opt(seconds).ok_or_else(|| format!("offset out of range: {}s", seconds))
}

/// Store key for the local calendar date of `instant`
pub fn date_key(instant: DateTime<Utc>, offset: &FixedOffset) -> String {
    instant
        .with_timezone(offset)
        .date_naive()
        .format("%Y-%m-%d")
        .to_string()
}

/// True when `posted_at` falls on the same local date as `now` and inside
/// `[00:00, 00:02)` local time.
pub fn in_capture_window(
    posted_at: DateTime<Utc>,
    now: DateTime<Utc>,
    offset: &FixedOffset,
) -> bool {
    let posted = posted_at.with_timezone(offset);
    let today = now.with_timezone(offset).date_naive();

    posted.date_naive() == today && posted.hour() == 0 && posted.minute() < CAPTURE_WINDOW_MINUTES
}
