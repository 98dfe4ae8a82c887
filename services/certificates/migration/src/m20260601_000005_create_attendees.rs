use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Attendees::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Attendees::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Attendees::RegistrationId).uuid().not_null())
                    .col(ColumnDef::new(Attendees::Name).string().not_null())
                    .col(ColumnDef::new(Attendees::Phone).string().not_null())
                    .col(ColumnDef::new(Attendees::CheckinSecret).string().not_null())
                    .col(ColumnDef::new(Attendees::AttendedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Attendees::CancelledAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(Attendees::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Attendees::Table, Attendees::RegistrationId)
                            .to(Registrations::Table, Registrations::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(Attendees::Table)
                    .col(Attendees::RegistrationId)
                    .name("idx_attendees_registration_id")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Attendees::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Attendees {
    Table,
    Id,
    RegistrationId,
    Name,
    Phone,
    CheckinSecret,
    AttendedAt,
    CancelledAt,
    CreatedAt,
}

#[derive(Iden)]
enum Registrations {
    Table,
    Id,
}
