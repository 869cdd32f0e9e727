use sea_orm_migration::prelude::*;

use crate::migrations;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(migrations::m202601150001_create_users::Migration),
            Box::new(migrations::m202601150002_create_events::Migration),
            Box::new(migrations::m202601200001_create_attendances::Migration),
            Box::new(migrations::m202602050001_create_attendance_summaries::Migration),
        ]
    }
}
