//! Shared id helpers.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

static SEQ: AtomicU64 = AtomicU64::new(0);

/// Generate a short unique id from the current time in nanoseconds plus a
/// process-wide sequence number, so ids minted in the same tick still differ.
#[inline]
pub(crate) fn gen_id() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let seq = SEQ.fetch_add(1, Ordering::Relaxed);
    format!("{:x}-{}", nanos, seq)
}

/// First `n` characters of `s`, never splitting a UTF-8 code point.
pub(crate) fn preview(s: &str, n: usize) -> String {
    s.chars().take(n).collect()
}
