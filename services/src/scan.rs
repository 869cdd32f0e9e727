use crate::error::{AttendanceError, AttendanceResult};
use crate::session::{self, SessionOutcome};
use chrono::{DateTime, Utc};
use db::models::{event, user};
use sea_orm::{DatabaseConnection, EntityTrait};
use serde::Deserialize;
use validator::Validate;

/// A raw "student S scanned at gate G for event E at time T" fact.
///
/// Supplied by the gate/QR frontend; the timestamp is gate- or
/// server-stamped at scan time, never student-supplied. Identity has already
/// been verified by the auth layer upstream.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ScanRequest {
    pub event_id: i64,
    pub student_id: i64,
    #[validate(length(
        min = 1,
        max = 64,
        message = "Gate label must be between 1 and 64 characters"
    ))]
    pub gate: String,
    pub timestamp: DateTime<Utc>,
}

/// Entry point for gate scans.
///
/// Validates the scan fact, resolves the referenced event and student, and
/// hands the scan to the session manager. Nothing is persisted when the scan
/// fails validation or references unknown ids.
pub async fn record_scan(
    db: &DatabaseConnection,
    scan: ScanRequest,
) -> AttendanceResult<SessionOutcome> {
    if let Err(errors) = scan.validate() {
        return Err(AttendanceError::InvalidScan(common::format_validation_errors(
            &errors,
        )));
    }

    if event::Entity::find_by_id(scan.event_id).one(db).await?.is_none() {
        return Err(AttendanceError::EventNotFound(scan.event_id));
    }
    if user::Entity::find_by_id(scan.student_id)
        .one(db)
        .await?
        .is_none()
    {
        return Err(AttendanceError::StudentNotFound(scan.student_id));
    }

    session::open_or_close(db, &scan).await
}
