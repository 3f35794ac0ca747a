//! Saved payment card repository.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use sea_orm::sea_query::Expr;
use uuid::Uuid;

use super::base::DbHandle;
use super::entities::payment_method::{self, ActiveModel, Entity as PaymentMethodEntity};
use crate::domain::{NewPaymentMethod, PaymentMethod};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait PaymentMethodRepository: Send + Sync {
    /// Cards of a user, default first then newest
    async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<PaymentMethod>>;

    async fn find_for_user(&self, id: Uuid, user_id: Uuid) -> AppResult<Option<PaymentMethod>>;

    async fn count_for_user(&self, user_id: Uuid) -> AppResult<u64>;

    async fn create(&self, card: NewPaymentMethod) -> AppResult<PaymentMethod>;

    /// Clear the default flag on every card of the user
    async fn clear_default(&self, user_id: Uuid) -> AppResult<()>;

    async fn set_default(&self, id: Uuid) -> AppResult<PaymentMethod>;

    async fn delete(&self, id: Uuid) -> AppResult<()>;
}

pub struct PaymentMethodStore<H = DatabaseConnection> {
    db: H,
}

impl<H: DbHandle> PaymentMethodStore<H> {
    pub fn new(db: H) -> Self {
        Self { db }
    }
}

#[async_trait]
impl<H: DbHandle> PaymentMethodRepository for PaymentMethodStore<H> {
    async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<PaymentMethod>> {
        let models = PaymentMethodEntity::find()
            .filter(payment_method::Column::UserId.eq(user_id))
            .order_by_desc(payment_method::Column::IsDefault)
            .order_by_desc(payment_method::Column::CreatedAt)
            .all(self.db.conn())
            .await?;

        Ok(models.into_iter().map(PaymentMethod::from).collect())
    }

    async fn find_for_user(&self, id: Uuid, user_id: Uuid) -> AppResult<Option<PaymentMethod>> {
        let model = PaymentMethodEntity::find_by_id(id)
            .filter(payment_method::Column::UserId.eq(user_id))
            .one(self.db.conn())
            .await?;

        Ok(model.map(PaymentMethod::from))
    }

    async fn count_for_user(&self, user_id: Uuid) -> AppResult<u64> {
        Ok(PaymentMethodEntity::find()
            .filter(payment_method::Column::UserId.eq(user_id))
            .count(self.db.conn())
            .await?)
    }

    async fn create(&self, card: NewPaymentMethod) -> AppResult<PaymentMethod> {
        let active = ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(card.user_id),
            brand: Set(card.brand.as_str().to_string()),
            last4: Set(card.last4),
            exp_month: Set(card.exp_month),
            exp_year: Set(card.exp_year),
            holder_name: Set(card.holder_name),
            is_default: Set(card.is_default),
            created_at: Set(Utc::now()),
        };

        let model = active.insert(self.db.conn()).await?;
        Ok(PaymentMethod::from(model))
    }

    async fn clear_default(&self, user_id: Uuid) -> AppResult<()> {
        PaymentMethodEntity::update_many()
            .col_expr(payment_method::Column::IsDefault, Expr::value(false))
            .filter(payment_method::Column::UserId.eq(user_id))
            .filter(payment_method::Column::IsDefault.eq(true))
            .exec(self.db.conn())
            .await?;
        Ok(())
    }

    async fn set_default(&self, id: Uuid) -> AppResult<PaymentMethod> {
        let model = PaymentMethodEntity::find_by_id(id)
            .one(self.db.conn())
            .await?
            .ok_or(AppError::NotFound)?;

        let mut active: ActiveModel = model.into();
        active.is_default = Set(true);
        let model = active.update(self.db.conn()).await?;
        Ok(PaymentMethod::from(model))
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = PaymentMethodEntity::delete_by_id(id)
            .exec(self.db.conn())
            .await?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }
}
