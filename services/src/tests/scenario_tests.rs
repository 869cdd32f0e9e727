//! End-to-end accounting scenarios across the scan and stop paths.

use super::{scan_at, seed_event, seed_student, ts};
use crate::{attended_student_count, get_summary, on_event_stopped, record_scan};
use db::models::attendance::{AttendanceStatus, Entity as Attendance};
use db::models::attendance_summary::PresenceStatus;
use db::test_utils::setup_test_db;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};

#[tokio::test]
async fn single_clean_visit() {
    let db = setup_test_db().await;
    let student = seed_student(&db, "u300001").await;
    let event = seed_event(&db, "Sports Day").await;

    record_scan(&db, scan_at(&event, &student, ts(0)))
        .await
        .unwrap();
    record_scan(&db, scan_at(&event, &student, ts(3600)))
        .await
        .unwrap();

    let summary = get_summary(&db, event.id, student.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(summary.total_valid_duration, 3600);
    assert_eq!(summary.total_nullified_duration, 0);
    assert_eq!(summary.total_sessions, 1);
    assert_eq!(summary.nullified_sessions, 0);
    assert_eq!(summary.current_status, PresenceStatus::CheckedOut);
    assert!(!summary.has_improper_checkouts);
    assert_eq!(summary.last_activity_date, Some(ts(3600).date_naive()));
}

#[tokio::test]
async fn visit_ended_by_stop() {
    let db = setup_test_db().await;
    let student = seed_student(&db, "u300002").await;
    let event = seed_event(&db, "Sports Day").await;

    record_scan(&db, scan_at(&event, &student, ts(0)))
        .await
        .unwrap();
    on_event_stopped(&db, event.id, ts(7200), "stopped by admin")
        .await
        .unwrap();

    let summary = get_summary(&db, event.id, student.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(summary.total_valid_duration, 0);
    assert_eq!(summary.total_nullified_duration, 7200);
    assert_eq!(summary.total_sessions, 1);
    assert_eq!(summary.nullified_sessions, 1);
    assert!(summary.has_improper_checkouts);
    assert_eq!(summary.current_status, PresenceStatus::CheckedOut);
}

#[tokio::test]
async fn three_clean_visits_then_a_swept_fourth() {
    let db = setup_test_db().await;
    let student = seed_student(&db, "u300003").await;
    let event = seed_event(&db, "Sports Day").await;

    // 1h, 2h and 0.5h visits, all closed by genuine scans.
    for (start, end) in [(0, 3600), (4000, 11200), (12000, 13800)] {
        record_scan(&db, scan_at(&event, &student, ts(start)))
            .await
            .unwrap();
        record_scan(&db, scan_at(&event, &student, ts(end)))
            .await
            .unwrap();
    }
    // Fourth visit is still open when the event stops 15 minutes in.
    record_scan(&db, scan_at(&event, &student, ts(14000)))
        .await
        .unwrap();
    on_event_stopped(&db, event.id, ts(14900), "closing time")
        .await
        .unwrap();

    let summary = get_summary(&db, event.id, student.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(summary.total_valid_duration, 12600);
    assert_eq!(summary.total_nullified_duration, 900);
    assert_eq!(summary.total_sessions, 4);
    assert_eq!(summary.nullified_sessions, 1);
    assert!(summary.has_improper_checkouts);
}

#[tokio::test]
async fn summary_accounting_matches_session_rows() {
    let db = setup_test_db().await;
    let student = seed_student(&db, "u300004").await;
    let event = seed_event(&db, "Sports Day").await;

    for (start, end) in [(0, 120), (300, 240), (600, 900)] {
        record_scan(&db, scan_at(&event, &student, ts(start)))
            .await
            .unwrap();
        record_scan(&db, scan_at(&event, &student, ts(end)))
            .await
            .unwrap();
    }
    record_scan(&db, scan_at(&event, &student, ts(1000)))
        .await
        .unwrap();
    on_event_stopped(&db, event.id, ts(1300), "done").await.unwrap();

    let summary = get_summary(&db, event.id, student.id)
        .await
        .unwrap()
        .unwrap();
    let sessions = Attendance::find()
        .filter(db::models::attendance::Column::EventId.eq(event.id))
        .filter(db::models::attendance::Column::StudentId.eq(student.id))
        .all(&db)
        .await
        .unwrap();

    // Every row is closed, and the rollup equals the per-row sum.
    let row_total: i64 = sessions
        .iter()
        .map(|s| {
            crate::duration::duration_seconds(s.check_in_time, s.check_out_time.unwrap())
        })
        .sum();
    assert_eq!(
        summary.total_valid_duration + summary.total_nullified_duration,
        row_total
    );

    let checked_out = sessions
        .iter()
        .filter(|s| s.status == AttendanceStatus::CheckedOut)
        .count() as i64;
    assert_eq!(
        summary.total_sessions,
        summary.nullified_sessions + checked_out
    );
}

#[tokio::test]
async fn open_session_reflects_in_summary_status() {
    let db = setup_test_db().await;
    let student = seed_student(&db, "u300005").await;
    let event = seed_event(&db, "Sports Day").await;

    record_scan(&db, scan_at(&event, &student, ts(0)))
        .await
        .unwrap();

    let summary = get_summary(&db, event.id, student.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(summary.current_status, PresenceStatus::CheckedIn);
    assert_eq!(summary.last_check_in_time, Some(ts(0)));
    // Nothing has closed yet, so no time is banked.
    assert_eq!(summary.total_sessions, 0);
    assert_eq!(summary.total_valid_duration, 0);
}

#[tokio::test]
async fn no_summary_row_before_first_scan() {
    let db = setup_test_db().await;
    let student = seed_student(&db, "u300006").await;
    let event = seed_event(&db, "Sports Day").await;

    assert!(get_summary(&db, event.id, student.id)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn attended_count_is_distinct_students() {
    let db = setup_test_db().await;
    let a = seed_student(&db, "u300007").await;
    let b = seed_student(&db, "u300008").await;
    let event = seed_event(&db, "Sports Day").await;

    // Student A scans twice (one full visit), B scans once and stays inside.
    record_scan(&db, scan_at(&event, &a, ts(0))).await.unwrap();
    record_scan(&db, scan_at(&event, &a, ts(60))).await.unwrap();
    record_scan(&db, scan_at(&event, &b, ts(30))).await.unwrap();

    assert_eq!(attended_student_count(&db, event.id).await.unwrap(), 2);
}

#[tokio::test]
async fn improper_checkout_flag_is_sticky() {
    let db = setup_test_db().await;
    let student = seed_student(&db, "u300009").await;
    let first = seed_event(&db, "Day One").await;

    record_scan(&db, scan_at(&first, &student, ts(0)))
        .await
        .unwrap();
    on_event_stopped(&db, first.id, ts(600), "stopped").await.unwrap();

    // A later clean visit to the same event must not clear the flag.
    // The event is stopped, so the clean visit happens on a second event;
    // the flag lives per (event, student) pair and stays set on the first.
    let summary = get_summary(&db, first.id, student.id)
        .await
        .unwrap()
        .unwrap();
    assert!(summary.has_improper_checkouts);

    let second = seed_event(&db, "Day Two").await;
    record_scan(&db, scan_at(&second, &student, ts(1000)))
        .await
        .unwrap();
    record_scan(&db, scan_at(&second, &student, ts(2000)))
        .await
        .unwrap();

    let clean = get_summary(&db, second.id, student.id)
        .await
        .unwrap()
        .unwrap();
    assert!(!clean.has_improper_checkouts);
    let still_flagged = get_summary(&db, first.id, student.id)
        .await
        .unwrap()
        .unwrap();
    assert!(still_flagged.has_improper_checkouts);
}
