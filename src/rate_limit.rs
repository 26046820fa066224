use std::net::IpAddr;
use std::time::{Duration, Instant};

use dashmap::DashMap;

/// Per-IP counter of successfully relayed submissions over a fixed
/// window. The window starts at the first recorded send; counts for an
/// address not seen within the window reset implicitly.
///
/// Advisory anti-abuse, not a security boundary: `allow` and `record`
/// are separate calls and a concurrent submission may slip between
/// them.
pub struct SubmissionLimiter {
    /// ip -> (count, window_start)
    entries: DashMap<IpAddr, (u32, Instant)>,
}

impl SubmissionLimiter {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Check if the address may submit. Does NOT count the attempt —
    /// call `record()` once the submission has actually been relayed.
    pub fn allow(&self, ip: IpAddr, max: u32, window: Duration) -> bool {
        let now = Instant::now();

        let Some(entry) = self.entries.get(&ip) else {
            return true;
        };
        let (count, start) = entry.value();

        if now.duration_since(*start) > window {
            return true;
        }

        *count < max
    }

    /// Count one relayed submission. The first record in a window (or
    /// after one has elapsed) restarts the window.
    pub fn record(&self, ip: IpAddr, window: Duration) {
        let now = Instant::now();

        let mut entry = self.entries.entry(ip).or_insert((0, now));
        let (count, start) = entry.value_mut();

        if now.duration_since(*start) > window {
            *count = 1;
            *start = now;
        } else {
            *count += 1;
        }
    }

    /// Remove entries whose window elapsed longer than `max_age` ago.
    /// Purely a memory bound; `allow` ignores expired entries anyway.
    pub fn cleanup(&self, max_age: Duration) {
        let now = Instant::now();
        self.entries
            .retain(|_, (_, start)| now.duration_since(*start) < max_age);
    }
}

impl Default for SubmissionLimiter {
    fn default() -> Self {
        Self::new()
    }
}
