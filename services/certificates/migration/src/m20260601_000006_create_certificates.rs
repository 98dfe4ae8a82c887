use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Certificates::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Certificates::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Certificates::AttendeeId).uuid().not_null())
                    .col(ColumnDef::new(Certificates::Number).string().not_null())
                    .col(ColumnDef::new(Certificates::FileKey).string())
                    .col(ColumnDef::new(Certificates::Status).string().not_null())
                    .col(
                        ColumnDef::new(Certificates::IssuedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Certificates::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Certificates::Table, Certificates::AttendeeId)
                            .to(Attendees::Table, Attendees::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Backstop for the allocator: collisions that slip past the year lock
        // must fail loudly instead of issuing a duplicate number.
        manager
            .create_index(
                Index::create()
                    .table(Certificates::Table)
                    .col(Certificates::Number)
                    .name("idx_certificates_number")
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(Certificates::Table)
                    .col(Certificates::AttendeeId)
                    .name("idx_certificates_attendee_id")
                    .to_owned(),
            )
            .await?;

        // At most one valid certificate per attendee; revoked rows are
        // excluded so re-issuance after revocation stays possible.
        manager
            .create_index(
                Index::create()
                    .table(Certificates::Table)
                    .col(Certificates::AttendeeId)
                    .name("idx_certificates_attendee_valid")
                    .unique()
                    .and_where(Expr::col(Certificates::Status).eq("valid"))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(Certificates::Table)
                    .col(Certificates::IssuedAt)
                    .name("idx_certificates_issued_at")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Certificates::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Certificates {
    Table,
    Id,
    AttendeeId,
    Number,
    FileKey,
    Status,
    IssuedAt,
    CreatedAt,
}

#[derive(Iden)]
enum Attendees {
    Table,
    Id,
}
