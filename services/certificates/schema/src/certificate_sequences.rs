use sea_orm::entity::prelude::*;

/// One row per calendar year, read with `FOR UPDATE` to serialize certificate
/// number allocation. Carries no counter — the allocator counts issued
/// certificates under the lock — but `updated_at` records the last issuance.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "certificate_sequences")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub year: i32,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
