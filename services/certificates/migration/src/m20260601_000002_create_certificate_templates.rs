use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CertificateTemplates::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CertificateTemplates::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CertificateTemplates::Name).string().not_null())
                    .col(ColumnDef::new(CertificateTemplates::Theme).string().not_null())
                    .col(
                        ColumnDef::new(CertificateTemplates::Config)
                            .json_binary()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CertificateTemplates::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CertificateTemplates::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum CertificateTemplates {
    Table,
    Id,
    Name,
    Theme,
    Config,
    CreatedAt,
}
