//! Event lifecycle controller.
//!
//! Invoked by the event-management layer when an admin stops an event. Marks
//! the event stopped, then reconciles every still-open session into a
//! nullified auto-checkout.

use crate::duration;
use crate::error::{AttendanceError, AttendanceResult};
use crate::events::SessionEvent;
use crate::summary::SummaryAggregator;
use chrono::{DateTime, Utc};
use db::models::attendance::{self, AttendanceStatus, Entity as Attendance};
use db::models::event;
use log::info;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QuerySelect, Set,
    TransactionTrait,
};
use serde::Serialize;

/// What a stop sweep did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StopSweepReport {
    pub sessions_nullified: u64,
    pub seconds_nullified: i64,
}

/// Stops the event and reconciles its open sessions.
///
/// The stopped flag is written before the sweep starts, so a check-in scan
/// arriving mid-sweep is rejected rather than opening a session the sweep
/// will never see. Each session is closed in its own transaction and only
/// rows still open are touched: a retried or crash-resumed sweep picks up
/// exactly where the previous one left off without double-counting.
pub async fn on_event_stopped(
    db: &DatabaseConnection,
    event_id: i64,
    stop_time: DateTime<Utc>,
    reason: &str,
) -> AttendanceResult<StopSweepReport> {
    let txn = db.begin().await?;
    let event = event::Entity::find_by_id(event_id)
        .one(&txn)
        .await?
        .ok_or(AttendanceError::EventNotFound(event_id))?;
    if event.is_active {
        let mut active: event::ActiveModel = event.into();
        active.is_active = Set(false);
        active.stopped_at = Set(Some(stop_time));
        active.stop_reason = Set(Some(reason.to_owned()));
        active.updated_at = Set(stop_time);
        active.update(&txn).await?;
    }
    txn.commit().await?;

    let open_ids: Vec<i64> = Attendance::find()
        .select_only()
        .column(attendance::Column::Id)
        .filter(attendance::Column::EventId.eq(event_id))
        .filter(attendance::Column::CheckOutTime.is_null())
        .into_tuple()
        .all(db)
        .await?;

    let mut report = StopSweepReport::default();
    for id in open_ids {
        let txn = db.begin().await?;
        // Re-check under the transaction; a check-out scan that raced the
        // sweep may have closed the session since the id list was taken.
        let Some(session) = Attendance::find_by_id(id)
            .filter(attendance::Column::CheckOutTime.is_null())
            .lock_exclusive()
            .one(&txn)
            .await?
        else {
            continue;
        };

        let nullified_seconds = duration::duration_seconds(session.check_in_time, stop_time);
        let (sev, sstudent) = (session.event_id, session.student_id);

        let mut active: attendance::ActiveModel = session.into();
        active.check_out_time = Set(Some(stop_time));
        active.status = Set(AttendanceStatus::AutoCheckout);
        active.is_nullified = Set(true);
        active.nullified_duration = Set(Some(nullified_seconds));
        active.nullified_reason = Set(Some(reason.to_owned()));
        active.event_stop_time = Set(Some(stop_time));
        active.updated_at = Set(stop_time);
        active.update(&txn).await?;

        SummaryAggregator::apply(
            &txn,
            &SessionEvent::SessionClosed {
                event_id: sev,
                student_id: sstudent,
                check_out_time: stop_time,
                duration_seconds: nullified_seconds,
                nullified: true,
            },
        )
        .await?;
        txn.commit().await?;

        report.sessions_nullified += 1;
        report.seconds_nullified += nullified_seconds;
    }

    info!(
        "stop sweep for event {} nullified {} sessions totalling {}s (reason: {})",
        event_id, report.sessions_nullified, report.seconds_nullified, reason
    );
    Ok(report)
}
