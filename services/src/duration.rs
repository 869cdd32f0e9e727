//! Duration and nullification arithmetic.
//!
//! Pure functions only; no storage round-trips. The session manager and the
//! lifecycle controller both resolve elapsed time through here so the
//! clamping rule cannot drift between the two close paths.

use chrono::{DateTime, Utc};
use db::models::attendance::AttendanceStatus;

/// Elapsed whole seconds between check-in and check-out, clamped to zero.
///
/// A check-out that precedes its check-in (clock skew between gates, replayed
/// scans) still closes the session; it just contributes no time.
pub fn duration_seconds(check_in: DateTime<Utc>, check_out: DateTime<Utc>) -> i64 {
    (check_out - check_in).num_seconds().max(0)
}

/// Duration-so-far of a still-open session against a caller-supplied clock.
/// Display only; never persisted.
pub fn live_duration_seconds(check_in: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    duration_seconds(check_in, now)
}

/// How a closed session's time is accounted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionClass {
    /// Closed by a genuine check-out scan; counts toward valid time.
    Valid,
    /// Force-closed by the event-stop sweep; counts toward nullified time.
    Nullified,
}

/// Classifies a session by its terminal status. `None` while still open.
pub fn classify(status: &AttendanceStatus) -> Option<SessionClass> {
    match status {
        AttendanceStatus::CheckedIn => None,
        AttendanceStatus::CheckedOut => Some(SessionClass::Valid),
        AttendanceStatus::AutoCheckout => Some(SessionClass::Nullified),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_760_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn duration_is_whole_seconds() {
        assert_eq!(duration_seconds(ts(0), ts(3600)), 3600);
    }

    #[test]
    fn duration_clamps_clock_skew_to_zero() {
        assert_eq!(duration_seconds(ts(100), ts(40)), 0);
        assert_eq!(duration_seconds(ts(0), ts(0)), 0);
    }

    #[test]
    fn live_duration_tracks_caller_clock() {
        assert_eq!(live_duration_seconds(ts(0), ts(90)), 90);
        assert_eq!(live_duration_seconds(ts(90), ts(0)), 0);
    }

    #[test]
    fn classification_follows_terminal_status() {
        assert_eq!(classify(&AttendanceStatus::CheckedIn), None);
        assert_eq!(
            classify(&AttendanceStatus::CheckedOut),
            Some(SessionClass::Valid)
        );
        assert_eq!(
            classify(&AttendanceStatus::AutoCheckout),
            Some(SessionClass::Nullified)
        );
    }
}
