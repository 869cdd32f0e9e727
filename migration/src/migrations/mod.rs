pub mod m202601150001_create_users;
pub mod m202601150002_create_events;
pub mod m202601200001_create_attendances;
pub mod m202602050001_create_attendance_summaries;
