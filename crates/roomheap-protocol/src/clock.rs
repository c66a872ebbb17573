//! Wall-clock helper used to stamp players at creation time.

use std::time::{SystemTime, UNIX_EPOCH};

/// Milliseconds since the Unix epoch.
///
/// Returns 0 if the system clock reads earlier than the epoch. The
/// allocator never looks at this value; it only rides along on
/// [`Player`](crate::Player) for whoever consumes the output.
pub fn unix_time_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unix_time_millis_is_after_2020() {
        // 2020-01-01T00:00:00Z
        assert!(unix_time_millis() > 1_577_836_800_000);
    }

    #[test]
    fn test_unix_time_millis_does_not_go_backwards() {
        let a = unix_time_millis();
        let b = unix_time_millis();
        assert!(b >= a);
    }
}
