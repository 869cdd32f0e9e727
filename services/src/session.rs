//! Attendance session manager.
//!
//! Owns the open/close state machine for (event, student) pairs. The
//! lookup-then-open/close sequence runs in a single transaction so two scans
//! racing for the same pair resolve to a serial order: the loser observes the
//! state the winner left behind and still returns a correct outcome.

use crate::duration;
use crate::error::{AttendanceError, AttendanceResult};
use crate::events::SessionEvent;
use crate::scan::ScanRequest;
use crate::summary::SummaryAggregator;
use db::models::attendance::{self, AttendanceStatus, Entity as Attendance};
use db::models::event;
use log::{info, warn};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::Serialize;

pub use db::models::attendance::Model as AttendanceSession;

/// What a scan did to the pair's session state.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SessionOutcome {
    /// No open session existed; the scan opened one.
    Opened { session: AttendanceSession },
    /// An open session existed; the scan closed it.
    Closed {
        session: AttendanceSession,
        duration_seconds: i64,
    },
}

/// Opens or closes the pair's session for one validated scan.
///
/// The event's stopped flag is re-read inside the transaction: once the stop
/// sweep has begun, a check-in scan can no longer slip a fresh session in
/// behind it.
pub(crate) async fn open_or_close(
    db: &DatabaseConnection,
    scan: &ScanRequest,
) -> AttendanceResult<SessionOutcome> {
    let txn = db.begin().await?;

    let event = event::Entity::find_by_id(scan.event_id)
        .one(&txn)
        .await?
        .ok_or(AttendanceError::EventNotFound(scan.event_id))?;

    let open = Attendance::find()
        .filter(attendance::Column::EventId.eq(scan.event_id))
        .filter(attendance::Column::StudentId.eq(scan.student_id))
        .filter(attendance::Column::CheckOutTime.is_null())
        .lock_exclusive()
        .one(&txn)
        .await?;

    match open {
        None => {
            if !event.is_active {
                // Transaction rolls back on drop; nothing persisted.
                return Err(AttendanceError::EventStopped(event.id));
            }

            let session = attendance::ActiveModel {
                event_id: Set(scan.event_id),
                student_id: Set(scan.student_id),
                gate: Set(scan.gate.clone()),
                check_in_time: Set(scan.timestamp),
                status: Set(AttendanceStatus::CheckedIn),
                is_nullified: Set(false),
                ..Default::default()
            }
            .insert(&txn)
            .await?;

            SummaryAggregator::apply(
                &txn,
                &SessionEvent::SessionOpened {
                    event_id: session.event_id,
                    student_id: session.student_id,
                    check_in_time: session.check_in_time,
                },
            )
            .await?;
            txn.commit().await?;

            info!(
                "opened attendance {} for student {} at event {} (gate {})",
                session.id, session.student_id, session.event_id, session.gate
            );
            Ok(SessionOutcome::Opened { session })
        }
        Some(session) => {
            if scan.timestamp < session.check_in_time {
                warn!(
                    "check-out at {} precedes check-in at {} for attendance {}; clamping duration to zero",
                    scan.timestamp, session.check_in_time, session.id
                );
            }
            let duration_seconds =
                duration::duration_seconds(session.check_in_time, scan.timestamp);
            let (event_id, student_id) = (session.event_id, session.student_id);

            let mut active: attendance::ActiveModel = session.into();
            active.check_out_time = Set(Some(scan.timestamp));
            active.status = Set(AttendanceStatus::CheckedOut);
            active.updated_at = Set(scan.timestamp);
            let session = active.update(&txn).await?;

            SummaryAggregator::apply(
                &txn,
                &SessionEvent::SessionClosed {
                    event_id,
                    student_id,
                    check_out_time: scan.timestamp,
                    duration_seconds,
                    nullified: false,
                },
            )
            .await?;
            txn.commit().await?;

            info!(
                "closed attendance {} for student {} at event {} after {}s",
                session.id, student_id, event_id, duration_seconds
            );
            Ok(SessionOutcome::Closed {
                session,
                duration_seconds,
            })
        }
    }
}

/// Full scan history for a pair, oldest first. Used by history views.
pub async fn list_sessions(
    db: &DatabaseConnection,
    event_id: i64,
    student_id: i64,
) -> AttendanceResult<Vec<AttendanceSession>> {
    Attendance::find()
        .filter(attendance::Column::EventId.eq(event_id))
        .filter(attendance::Column::StudentId.eq(student_id))
        .order_by_asc(attendance::Column::CheckInTime)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Students currently inside the event. Live headcount for dashboards.
pub async fn open_session_count(db: &DatabaseConnection, event_id: i64) -> AttendanceResult<u64> {
    Attendance::find()
        .filter(attendance::Column::EventId.eq(event_id))
        .filter(attendance::Column::CheckOutTime.is_null())
        .count(db)
        .await
        .map_err(Into::into)
}
