mod scenario_tests;

use chrono::{DateTime, Duration, TimeZone, Utc};
use db::models::{event, user};
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};

use crate::ScanRequest;

/// A fixed instant all tests offset from, so durations are exact.
pub(crate) fn ts(secs: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 14, 9, 0, 0).unwrap() + Duration::seconds(secs)
}

pub(crate) async fn seed_student(db: &DatabaseConnection, username: &str) -> user::Model {
    user::ActiveModel {
        username: Set(username.to_owned()),
        email: Set(format!("{username}@test.com")),
        role: Set(user::Role::Student),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("create student")
}

pub(crate) async fn seed_event(db: &DatabaseConnection, name: &str) -> event::Model {
    event::ActiveModel {
        name: Set(name.to_owned()),
        start_time: Set(ts(0)),
        end_time: Set(ts(0) + Duration::hours(10)),
        is_active: Set(true),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("create event")
}

pub(crate) fn scan_at(event: &event::Model, student: &user::Model, at: DateTime<Utc>) -> ScanRequest {
    ScanRequest {
        event_id: event.id,
        student_id: student.id,
        gate: "gate-a".into(),
        timestamp: at,
    }
}
