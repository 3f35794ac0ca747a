//! Message thread database entity for SeaORM.

use sea_orm::entity::prelude::*;

use crate::domain::MessageThread;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "message_threads")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub listing_id: Option<Uuid>,
    pub booking_id: Option<Uuid>,
    pub subject: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for MessageThread {
    fn from(model: Model) -> Self {
        MessageThread {
            id: model.id,
            listing_id: model.listing_id,
            booking_id: model.booking_id,
            subject: model.subject,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
