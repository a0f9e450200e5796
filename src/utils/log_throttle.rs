//! Per-key rate limiting for noisy log lines.
//!
//! Message polling can fail on every tick while the backend is unreachable.
//! Callers ask [`should_emit`] before logging a failure, so one warning per
//! window is written together with the number of swallowed repeats. Once a
//! call succeeds again, [`recover`] closes the outage and reports what was
//! swallowed since the last warning.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, OnceLock};
use std::time::{Duration, Instant};

/// An ongoing run of failures for one key.
#[derive(Debug)]
struct Outage {
    last_reported: Instant,
    unreported: u64,
}

static OUTAGES: OnceLock<Mutex<HashMap<String, Outage>>> = OnceLock::new();

fn outages() -> MutexGuard<'static, HashMap<String, Outage>> {
    OUTAGES
        .get_or_init(|| Mutex::new(HashMap::new()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Returns `Some(suppressed_count)` when a failure for `key` should be
/// logged, or `None` when it falls inside the current window.
pub fn should_emit(key: &str, interval: Duration) -> Option<u64> {
    let mut outages = outages();
    let now = Instant::now();

    let Some(outage) = outages.get_mut(key) else {
        outages.insert(
            key.to_string(),
            Outage {
                last_reported: now,
                unreported: 0,
            },
        );
        return Some(0);
    };

    if now.duration_since(outage.last_reported) < interval {
        outage.unreported += 1;
        return None;
    }

    outage.last_reported = now;
    Some(std::mem::take(&mut outage.unreported))
}

/// Ends the outage for `key`.
///
/// Returns `Some(suppressed_count)` if failures were logged for `key` since
/// the last recovery, `None` when there was nothing to recover from.
pub fn recover(key: &str) -> Option<u64> {
    outages().remove(key).map(|outage| outage.unreported)
}
