//! Session lifecycle events.
//!
//! Emitted by the session manager and the event lifecycle controller, and
//! consumed by the summary aggregator. This is the only channel through which
//! summary rows are written, so the arithmetic for what counts as attended
//! time lives in exactly one place.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum SessionEvent {
    /// A check-in scan opened a new session for the pair.
    SessionOpened {
        event_id: i64,
        student_id: i64,
        check_in_time: DateTime<Utc>,
    },

    /// A session reached a terminal state, either by a genuine check-out
    /// scan or by the event-stop sweep.
    SessionClosed {
        event_id: i64,
        student_id: i64,
        check_out_time: DateTime<Utc>,
        /// Whole seconds, already clamped to zero.
        duration_seconds: i64,
        /// True when the close came from the sweep rather than a scan.
        nullified: bool,
    },
}

impl SessionEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            SessionEvent::SessionOpened { .. } => "session_opened",
            SessionEvent::SessionClosed { .. } => "session_closed",
        }
    }

    /// The (event, student) pair the event belongs to.
    pub fn pair(&self) -> (i64, i64) {
        match self {
            SessionEvent::SessionOpened {
                event_id,
                student_id,
                ..
            }
            | SessionEvent::SessionClosed {
                event_id,
                student_id,
                ..
            } => (*event_id, *student_id),
        }
    }

    pub fn to_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn closed_event_serializes_with_tag() {
        let event = SessionEvent::SessionClosed {
            event_id: 7,
            student_id: 21,
            check_out_time: Utc.with_ymd_and_hms(2026, 3, 14, 11, 0, 0).unwrap(),
            duration_seconds: 3600,
            nullified: false,
        };

        assert_eq!(event.event_type(), "session_closed");
        assert_eq!(event.pair(), (7, 21));
        let json = event.to_json().unwrap();
        assert_eq!(json["type"], "session_closed");
        assert_eq!(json["data"]["duration_seconds"], 3600);
    }
}
