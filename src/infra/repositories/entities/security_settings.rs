//! Security settings database entity for SeaORM.

use sea_orm::entity::prelude::*;

use crate::domain::SecuritySettings;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "security_settings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: Uuid,
    pub two_factor_enabled: bool,
    pub login_alerts: bool,
    pub password_changed_at: Option<DateTimeUtc>,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for SecuritySettings {
    fn from(model: Model) -> Self {
        SecuritySettings {
            user_id: model.user_id,
            two_factor_enabled: model.two_factor_enabled,
            login_alerts: model.login_alerts,
            password_changed_at: model.password_changed_at,
            updated_at: model.updated_at,
        }
    }
}
