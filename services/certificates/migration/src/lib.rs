use sea_orm_migration::prelude::*;

mod m20260601_000001_create_rooms;
mod m20260601_000002_create_certificate_templates;
mod m20260601_000003_create_events;
mod m20260601_000004_create_registrations;
mod m20260601_000005_create_attendees;
mod m20260601_000006_create_certificates;
mod m20260601_000007_create_certificate_sequences;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260601_000001_create_rooms::Migration),
            Box::new(m20260601_000002_create_certificate_templates::Migration),
            Box::new(m20260601_000003_create_events::Migration),
            Box::new(m20260601_000004_create_registrations::Migration),
            Box::new(m20260601_000005_create_attendees::Migration),
            Box::new(m20260601_000006_create_certificates::Migration),
            Box::new(m20260601_000007_create_certificate_sequences::Migration),
        ]
    }
}
