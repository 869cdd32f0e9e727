use sea_orm::DbErr;

pub type AttendanceResult<T> = Result<T, AttendanceError>;

/// Errors surfaced by the attendance engine.
///
/// Everything except `Database` is a domain outcome the caller can map to a
/// client response; `Database` means the storage layer itself failed and the
/// whole scan should be retried.
#[derive(Debug, thiserror::Error)]
pub enum AttendanceError {
    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    #[error("Event {0} not found")]
    EventNotFound(i64),

    #[error("Student {0} not found")]
    StudentNotFound(i64),

    #[error("Event {0} has been stopped and no longer accepts check-ins")]
    EventStopped(i64),

    #[error("Invalid scan: {0}")]
    InvalidScan(String),
}
