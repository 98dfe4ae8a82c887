use sea_orm::entity::prelude::*;

/// Issued certificate. `id` is the unguessable public identifier used in
/// verification URLs; `number` is the human-facing sequential number (unique
/// per year by allocation, unique globally by index). `file_key` stays null
/// until the PDF has been rendered and stored. `status` is `valid` or
/// `revoked`; an attendee holds at most one valid certificate at a time.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "certificates")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub attendee_id: Uuid,
    #[sea_orm(unique)]
    pub number: String,
    pub file_key: Option<String>,
    pub status: String,
    pub issued_at: chrono::DateTime<chrono::Utc>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
