//! Host request repository.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use super::base::{fetch_page, DbHandle};
use super::entities::host_request::{self, ActiveModel, Entity as HostRequestEntity};
use crate::domain::{HostRequest, HostRequestDecision, HostRequestStatus};
use crate::errors::{AppError, AppResult};
use crate::types::PaginationParams;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait HostRequestRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<HostRequest>>;

    async fn find_pending_for_user(&self, user_id: Uuid) -> AppResult<Option<HostRequest>>;

    /// A user's requests, newest first
    async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<HostRequest>>;

    /// Requests for the admin queue, oldest first
    async fn list(
        &self,
        status: Option<HostRequestStatus>,
        params: PaginationParams,
    ) -> AppResult<(Vec<HostRequest>, u64)>;

    async fn create(&self, user_id: Uuid, message: String) -> AppResult<HostRequest>;

    /// Approve or reject a pending request.
    ///
    /// Conflict if the request was decided in the meantime.
    async fn decide(
        &self,
        id: Uuid,
        reviewer_id: Uuid,
        decision: HostRequestDecision,
    ) -> AppResult<HostRequest>;

    async fn count_pending(&self) -> AppResult<u64>;
}

pub struct HostRequestStore<H = DatabaseConnection> {
    db: H,
}

impl<H: DbHandle> HostRequestStore<H> {
    pub fn new(db: H) -> Self {
        Self { db }
    }
}

#[async_trait]
impl<H: DbHandle> HostRequestRepository for HostRequestStore<H> {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<HostRequest>> {
        let model = HostRequestEntity::find_by_id(id).one(self.db.conn()).await?;
        Ok(model.map(HostRequest::from))
    }

    async fn find_pending_for_user(&self, user_id: Uuid) -> AppResult<Option<HostRequest>> {
        let model = HostRequestEntity::find()
            .filter(host_request::Column::UserId.eq(user_id))
            .filter(host_request::Column::Status.eq(HostRequestStatus::Pending.as_str()))
            .one(self.db.conn())
            .await?;
        Ok(model.map(HostRequest::from))
    }

    async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<HostRequest>> {
        let models = HostRequestEntity::find()
            .filter(host_request::Column::UserId.eq(user_id))
            .order_by_desc(host_request::Column::CreatedAt)
            .all(self.db.conn())
            .await?;
        Ok(models.into_iter().map(HostRequest::from).collect())
    }

    async fn list(
        &self,
        status: Option<HostRequestStatus>,
        params: PaginationParams,
    ) -> AppResult<(Vec<HostRequest>, u64)> {
        let mut query = HostRequestEntity::find().order_by_asc(host_request::Column::CreatedAt);
        if let Some(status) = status {
            query = query.filter(host_request::Column::Status.eq(status.as_str()));
        }

        let (models, total) = fetch_page(query, self.db.conn(), &params).await?;
        Ok((models.into_iter().map(HostRequest::from).collect(), total))
    }

    async fn create(&self, user_id: Uuid, message: String) -> AppResult<HostRequest> {
        let active = ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            status: Set(HostRequestStatus::Pending.as_str().to_string()),
            message: Set(message),
            reviewed_by: Set(None),
            reviewed_at: Set(None),
            rejection_reason: Set(None),
            created_at: Set(Utc::now()),
        };

        let model = active.insert(self.db.conn()).await?;
        Ok(HostRequest::from(model))
    }

    async fn decide(
        &self,
        id: Uuid,
        reviewer_id: Uuid,
        decision: HostRequestDecision,
    ) -> AppResult<HostRequest> {
        let rejection_reason = match decision {
            HostRequestDecision::Approve => None,
            HostRequestDecision::Reject { ref reason } => reason.clone(),
        };
        let result = HostRequestEntity::update_many()
            .col_expr(
                host_request::Column::Status,
                Expr::value(decision.status().as_str()),
            )
            .col_expr(host_request::Column::ReviewedBy, Expr::value(Some(reviewer_id)))
            .col_expr(host_request::Column::ReviewedAt, Expr::value(Some(Utc::now())))
            .col_expr(host_request::Column::RejectionReason, Expr::value(rejection_reason))
            .filter(host_request::Column::Id.eq(id))
            .filter(host_request::Column::Status.eq(HostRequestStatus::Pending.as_str()))
            .exec(self.db.conn())
            .await?;

        let model = HostRequestEntity::find_by_id(id)
            .one(self.db.conn())
            .await?
            .ok_or(AppError::NotFound)?;
        if result.rows_affected == 0 {
            return Err(AppError::state_conflict(format!(
                "Host request was already {}",
                model.status
            )));
        }
        Ok(HostRequest::from(model))
    }

    async fn count_pending(&self) -> AppResult<u64> {
        Ok(HostRequestEntity::find()
            .filter(host_request::Column::Status.eq(HostRequestStatus::Pending.as_str()))
            .count(self.db.conn())
            .await?)
    }
}
