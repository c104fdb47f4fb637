use chrono::{DateTime, TimeDelta, Utc};

pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Absolute expiry for a token issued at `now` with a lifetime of `expires_in_secs`.
///
/// `None` when the lifetime is past what a timestamp can hold; such a token
/// never expires. Callers reject negative and non-finite lifetimes first.
pub fn expires_at(now: DateTime<Utc>, expires_in_secs: f64) -> Option<DateTime<Utc>> {
    let millis = (expires_in_secs * 1000.0).round();
    if !millis.is_finite() || millis >= i64::MAX as f64 || millis <= i64::MIN as f64 {
        return None;
    }
    TimeDelta::try_milliseconds(millis as i64).and_then(|delta| now.checked_add_signed(delta))
}
