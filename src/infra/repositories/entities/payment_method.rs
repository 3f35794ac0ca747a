//! Payment method database entity for SeaORM.

use sea_orm::entity::prelude::*;

use crate::domain::{CardBrand, PaymentMethod};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "payment_methods")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub brand: String,
    pub last4: String,
    pub exp_month: i32,
    pub exp_year: i32,
    pub holder_name: String,
    pub is_default: bool,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for PaymentMethod {
    fn from(model: Model) -> Self {
        PaymentMethod {
            id: model.id,
            user_id: model.user_id,
            brand: CardBrand::from(model.brand.as_str()),
            last4: model.last4,
            exp_month: model.exp_month,
            exp_year: model.exp_year,
            holder_name: model.holder_name,
            is_default: model.is_default,
            created_at: model.created_at,
        }
    }
}
