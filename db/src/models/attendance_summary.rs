use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Running per-(event, student) rollup in the `attendance_summaries` table.
///
/// Exactly one row per pair, created lazily on first scan and never deleted.
/// Written only by the summary aggregator; all duration columns are in whole
/// seconds and only ever grow.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "attendance_summaries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub event_id: i64,
    #[sea_orm(primary_key, auto_increment = false)]
    pub student_id: i64,

    /// Seconds from sessions closed by a genuine check-out scan.
    pub total_valid_duration: i64,
    /// Seconds from sessions force-closed by the event-stop sweep.
    pub total_nullified_duration: i64,
    pub total_sessions: i64,
    pub nullified_sessions: i64,
    pub last_check_in_time: Option<DateTime<Utc>>,
    pub current_status: PresenceStatus,
    /// Sticky: set when any session of the pair is nullified, never cleared.
    pub has_improper_checkouts: bool,
    pub last_activity_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Whether the student is currently inside the event.
#[derive(
    Debug, Clone, PartialEq, EnumIter, DeriveActiveEnum, Display, EnumString, Deserialize, Serialize,
)]
#[serde(rename_all = "snake_case")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "presence_status_type")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum PresenceStatus {
    #[sea_orm(string_value = "checked_in")]
    CheckedIn,

    #[sea_orm(string_value = "checked_out")]
    CheckedOut,
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
