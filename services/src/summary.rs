//! Summary aggregator.
//!
//! Maintains the running per-(event, student) rollup. Updated incrementally
//! on every session transition; never recomputed from full history on the
//! hot path.

use crate::error::AttendanceResult;
use crate::events::SessionEvent;
use db::models::attendance_summary::{self, Entity as AttendanceSummary, PresenceStatus};
use log::debug;
use sea_orm::sea_query::{Expr, ExprTrait};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, Set,
};

pub use db::models::attendance_summary::Model as StudentEventAttendanceSummary;

pub struct SummaryAggregator;

impl SummaryAggregator {
    /// Applies one session event to the pair's summary row.
    ///
    /// Sole writer of `attendance_summaries`; the session manager and the
    /// lifecycle controller call this exactly once per transition, inside the
    /// same transaction as the session mutation. Accumulators are bumped with
    /// in-place column arithmetic so closes for different pairs landing
    /// together cannot lose increments to a read-modify-write race.
    pub async fn apply<C: ConnectionTrait>(conn: &C, event: &SessionEvent) -> Result<(), DbErr> {
        if let Ok(json) = event.to_json() {
            debug!("applying {}", json);
        }

        let (event_id, student_id) = event.pair();
        Self::ensure_row(conn, event_id, student_id).await?;

        let update = AttendanceSummary::update_many()
            .filter(attendance_summary::Column::EventId.eq(event_id))
            .filter(attendance_summary::Column::StudentId.eq(student_id));

        let update = match event {
            SessionEvent::SessionOpened { check_in_time, .. } => update
                .col_expr(
                    attendance_summary::Column::CurrentStatus,
                    Expr::value(PresenceStatus::CheckedIn),
                )
                .col_expr(
                    attendance_summary::Column::LastCheckInTime,
                    Expr::value(Some(*check_in_time)),
                )
                .col_expr(
                    attendance_summary::Column::UpdatedAt,
                    Expr::value(*check_in_time),
                ),
            SessionEvent::SessionClosed {
                check_out_time,
                duration_seconds,
                nullified,
                ..
            } => {
                let update = update
                    .col_expr(
                        attendance_summary::Column::TotalSessions,
                        Expr::col(attendance_summary::Column::TotalSessions).add(1),
                    )
                    .col_expr(
                        attendance_summary::Column::CurrentStatus,
                        Expr::value(PresenceStatus::CheckedOut),
                    )
                    .col_expr(
                        attendance_summary::Column::LastActivityDate,
                        Expr::value(Some(check_out_time.date_naive())),
                    )
                    .col_expr(
                        attendance_summary::Column::UpdatedAt,
                        Expr::value(*check_out_time),
                    );
                if *nullified {
                    update
                        .col_expr(
                            attendance_summary::Column::TotalNullifiedDuration,
                            Expr::col(attendance_summary::Column::TotalNullifiedDuration)
                                .add(*duration_seconds),
                        )
                        .col_expr(
                            attendance_summary::Column::NullifiedSessions,
                            Expr::col(attendance_summary::Column::NullifiedSessions).add(1),
                        )
                        // monotonic OR; no code path writes this back to false
                        .col_expr(
                            attendance_summary::Column::HasImproperCheckouts,
                            Expr::col(attendance_summary::Column::HasImproperCheckouts)
                                .or(Expr::value(true)),
                        )
                } else {
                    update.col_expr(
                        attendance_summary::Column::TotalValidDuration,
                        Expr::col(attendance_summary::Column::TotalValidDuration)
                            .add(*duration_seconds),
                    )
                }
            }
        };

        update.exec(conn).await?;
        Ok(())
    }

    async fn ensure_row<C: ConnectionTrait>(
        conn: &C,
        event_id: i64,
        student_id: i64,
    ) -> Result<(), DbErr> {
        let existing = AttendanceSummary::find_by_id((event_id, student_id))
            .one(conn)
            .await?;
        if existing.is_none() {
            attendance_summary::ActiveModel {
                event_id: Set(event_id),
                student_id: Set(student_id),
                ..Default::default()
            }
            .insert(conn)
            .await?;
        }
        Ok(())
    }
}

/// The pair's rollup row, if the student has ever scanned at the event.
pub async fn get_summary(
    db: &DatabaseConnection,
    event_id: i64,
    student_id: i64,
) -> AttendanceResult<Option<StudentEventAttendanceSummary>> {
    AttendanceSummary::find_by_id((event_id, student_id))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Distinct students with at least one scan for the event. One summary row
/// exists per such student, so counting rows is enough.
pub async fn attended_student_count(
    db: &DatabaseConnection,
    event_id: i64,
) -> AttendanceResult<u64> {
    AttendanceSummary::find()
        .filter(attendance_summary::Column::EventId.eq(event_id))
        .count(db)
        .await
        .map_err(Into::into)
}
