//! Host request database entity for SeaORM.

use sea_orm::entity::prelude::*;

use crate::domain::{HostRequest, HostRequestStatus};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "host_requests")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub status: String,
    #[sea_orm(column_type = "Text")]
    pub message: String,
    pub reviewed_by: Option<Uuid>,
    pub reviewed_at: Option<DateTimeUtc>,
    pub rejection_reason: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for HostRequest {
    fn from(model: Model) -> Self {
        HostRequest {
            id: model.id,
            user_id: model.user_id,
            status: HostRequestStatus::from(model.status.as_str()),
            message: model.message,
            reviewed_by: model.reviewed_by,
            reviewed_at: model.reviewed_at,
            rejection_reason: model.rejection_reason,
            created_at: model.created_at,
        }
    }
}
