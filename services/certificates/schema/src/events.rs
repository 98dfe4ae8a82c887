use sea_orm::entity::prelude::*;

/// Event record. Owned by the events service; certificates read it for
/// precondition checks (`certificate_enabled`) and render data.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "events")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub organizer: String,
    pub start_time: chrono::DateTime<chrono::Utc>,
    pub certificate_enabled: bool,
    pub certificate_template_id: Option<Uuid>,
    pub room_id: Option<Uuid>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
