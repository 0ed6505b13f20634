//! Time and timestamp helpers.

use chrono::{DateTime, Utc};

/// UTC timestamp used for action request/start/completion times.
pub type Timestamp = DateTime<Utc>;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

/// Milliseconds elapsed between two timestamps, clamped at zero.
#[must_use]
pub fn elapsed_ms(from: Timestamp, to: Timestamp) -> u64 {
    u64::try_from((to - from).num_milliseconds()).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_return_current_utc_time() {
        let before = Utc::now();
        let ts = now();
        let after = Utc::now();
        assert!(ts >= before);
        assert!(ts <= after);
    }

    #[test]
    fn should_measure_elapsed_milliseconds() {
        let start = now();
        let end = start + chrono::Duration::milliseconds(250);
        assert_eq!(elapsed_ms(start, end), 250);
    }

    #[test]
    fn should_clamp_negative_elapsed_to_zero() {
        let start = now();
        let earlier = start - chrono::Duration::seconds(1);
        assert_eq!(elapsed_ms(start, earlier), 0);
    }
}
