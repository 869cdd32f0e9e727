use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// One row per check-in attempt in the `attendances` table.
///
/// A row is created by a check-in scan and never deleted; it is mutated
/// exactly once, at close time, by whichever path closes it first (a matching
/// check-out scan or the event-stop sweep).
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "attendances")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub event_id: i64,
    pub student_id: i64,
    /// Gate label the scan came from.
    pub gate: String,
    /// Set at creation, immutable.
    pub check_in_time: DateTime<Utc>,
    /// Null while the session is open; set exactly once at close.
    pub check_out_time: Option<DateTime<Utc>>,
    pub status: AttendanceStatus,
    /// True iff the session was force-closed by the event-stop sweep.
    pub is_nullified: bool,
    /// Seconds discarded by nullification; only set when `is_nullified`.
    pub nullified_duration: Option<i64>,
    pub nullified_reason: Option<String>,
    pub event_stop_time: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Per-session state machine:
/// `checked_in` -> `checked_out` (normal scan) or `auto_checkout` (sweep).
/// Both closed states are terminal.
#[derive(
    Debug, Clone, PartialEq, EnumIter, DeriveActiveEnum, Display, EnumString, Deserialize, Serialize,
)]
#[serde(rename_all = "snake_case")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "attendance_status_type")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum AttendanceStatus {
    #[sea_orm(string_value = "checked_in")]
    CheckedIn,

    #[sea_orm(string_value = "checked_out")]
    CheckedOut,

    #[sea_orm(string_value = "auto_checkout")]
    AutoCheckout,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::event::Entity",
        from = "Column::EventId",
        to = "super::event::Column::Id"
    )]
    Event,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::StudentId",
        to = "super::user::Column::Id"
    )]
    Student,
}

impl Related<super::event::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Event.def()
    }
    fn via() -> Option<RelationDef> {
        None
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Student.def()
    }
    fn via() -> Option<RelationDef> {
        None
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    #[inline]
    pub fn is_open(&self) -> bool {
        self.check_out_time.is_none()
    }
}
