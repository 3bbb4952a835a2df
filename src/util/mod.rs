pub(crate) mod browser;

use chrono::{DateTime, SecondsFormat, Utc};
use std::sync::Arc;

/// Source of "now" for timestamps and time-based ids.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

pub fn system_clock() -> Clock {
    Arc::new(Utc::now)
}

/// ISO-8601 with millisecond precision and a `Z` suffix.
pub(crate) fn iso_timestamp(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub(crate) fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

/// Millisecond-timestamp id, bumped until it is not taken.
pub(crate) fn mint_time_id(now: DateTime<Utc>, taken: impl Fn(&str) -> bool) -> String {
    let mut n = now.timestamp_millis();
    loop {
        let id = n.to_string();
        if !taken(&id) {
            return id;
        }
        n = n.saturating_add(1);
    }
}

/// `<base>_1`, `<base>_2`, ... until one is free. `base` itself is tried first.
pub(crate) fn next_free_suffixed(base: &str, taken: impl Fn(&str) -> bool) -> String {
    if !taken(base) {
        return base.to_string();
    }
    let mut counter: u32 = 1;
    loop {
        let candidate = format!("{}_{}", base, counter);
        if !taken(&candidate) {
            return candidate;
        }
        counter = counter.saturating_add(1);
    }
}

/// Trimmed value, or `None` when nothing but whitespace is left.
pub(crate) fn non_blank(s: &str) -> Option<String> {
    let t = s.trim();
    if t.is_empty() {
        None
    } else {
        Some(t.to_string())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::Clock;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use std::sync::atomic::{AtomicI64, Ordering};
    use std::sync::Arc;

    /// Clock starting at 2024-01-01T00:00:00Z that advances one second per reading.
    pub(crate) fn ticking_clock() -> Clock {
        let start: DateTime<Utc> = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let ticks = Arc::new(AtomicI64::new(0));
        Arc::new(move || start + Duration::seconds(ticks.fetch_add(1, Ordering::SeqCst)))
    }

    /// Clock frozen at a single instant.
    pub(crate) fn frozen_clock() -> Clock {
        let t: DateTime<Utc> = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        Arc::new(move || t)
    }
}
