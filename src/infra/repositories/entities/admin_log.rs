//! Admin audit log database entity for SeaORM.

use sea_orm::entity::prelude::*;

use crate::domain::AdminLog;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "admin_logs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub admin_id: Uuid,
    pub action: String,
    pub target_type: String,
    pub target_id: Option<Uuid>,
    pub details: Json,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for AdminLog {
    fn from(model: Model) -> Self {
        AdminLog {
            id: model.id,
            admin_id: model.admin_id,
            action: model.action,
            target_type: model.target_type,
            target_id: model.target_id,
            details: model.details,
            created_at: model.created_at,
        }
    }
}
