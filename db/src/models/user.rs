use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Represents a registered account in the `users` table.
///
/// Accounts are owned by the registration/CRUD layer; the attendance engine
/// only reads this table to resolve scan identities.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Primary key ID (auto-incremented).
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Unique student number or handle.
    pub username: String,
    /// Unique email address.
    pub email: String,
    /// Role within the event platform.
    pub role: Role,
    /// Timestamp when the account was created.
    pub created_at: DateTime<Utc>,
    /// Timestamp when the account was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Platform-wide account role.
#[derive(
    Debug, Clone, PartialEq, EnumIter, DeriveActiveEnum, Display, EnumString, Deserialize, Serialize,
)]
#[serde(rename_all = "snake_case")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "user_role_type")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Role {
    #[sea_orm(string_value = "student")]
    Student,

    #[sea_orm(string_value = "volunteer")]
    Volunteer,

    #[sea_orm(string_value = "stall_owner")]
    StallOwner,

    #[sea_orm(string_value = "admin")]
    Admin,
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
