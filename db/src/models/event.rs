use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::Serialize;

/// Represents an event in the `events` table.
///
/// Event metadata (name, dates) is owned by the event CRUD layer. The
/// attendance engine reads `is_active` to gate check-ins and writes
/// `is_active`, `stopped_at` and `stop_reason` exactly once when an admin
/// stops the event.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "events")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    pub venue: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// False once the event has been stopped; no new check-ins after that.
    pub is_active: bool,
    pub stopped_at: Option<DateTime<Utc>>,
    pub stop_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::attendance::Entity")]
    Attendances,
    #[sea_orm(has_many = "super::attendance_summary::Entity")]
    Summaries,
}

impl Related<super::attendance::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Attendances.def()
    }
    fn via() -> Option<RelationDef> {
        None
    }
}

impl Related<super::attendance_summary::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Summaries.def()
    }
    fn via() -> Option<RelationDef> {
        None
    }
}

impl ActiveModelBehavior for ActiveModel {}
