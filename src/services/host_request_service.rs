//! Host onboarding: users apply, admins approve or reject.

use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{
    HostRequest, HostRequestDecision, HostRequestStatus, NewAdminLog, NewNotification,
    NotificationKind, PrivilegeUpdate,
};
use crate::errors::{AppError, AppResult};
use crate::infra::UnitOfWork;
use crate::types::{Paginated, PaginationParams};

#[async_trait]
pub trait HostRequestService: Send + Sync {
    /// Apply for hosting privileges
    async fn apply(&self, user_id: Uuid, message: String) -> AppResult<HostRequest>;

    /// The caller's requests, newest first
    async fn mine(&self, user_id: Uuid) -> AppResult<Vec<HostRequest>>;

    /// Admin queue, oldest first
    async fn list(
        &self,
        status: Option<HostRequestStatus>,
        params: PaginationParams,
    ) -> AppResult<Paginated<HostRequest>>;

    async fn decide(
        &self,
        admin_id: Uuid,
        id: Uuid,
        decision: HostRequestDecision,
    ) -> AppResult<HostRequest>;
}

pub struct HostRequestManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> HostRequestManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> HostRequestService for HostRequestManager<U> {
    async fn apply(&self, user_id: Uuid, message: String) -> AppResult<HostRequest> {
        let user = self
            .uow
            .users()
            .find_by_id(user_id)
            .await?
            .ok_or(AppError::Unauthorized)?;
        if user.is_host {
            return Err(AppError::validation("You are already a host"));
        }
        if self
            .uow
            .host_requests()
            .find_pending_for_user(user_id)
            .await?
            .is_some()
        {
            return Err(AppError::conflict("A pending host request"));
        }

        let request = self
            .uow
            .host_requests()
            .create(user_id, message.trim().to_string())
            .await?;
        tracing::info!(request_id = %request.id, user_id = %user_id, "Host request submitted");
        Ok(request)
    }

    async fn mine(&self, user_id: Uuid) -> AppResult<Vec<HostRequest>> {
        self.uow.host_requests().list_for_user(user_id).await
    }

    async fn list(
        &self,
        status: Option<HostRequestStatus>,
        params: PaginationParams,
    ) -> AppResult<Paginated<HostRequest>> {
        let (requests, total) = self
            .uow
            .host_requests()
            .list(status, params.clone())
            .await?;
        Ok(params.paginate(requests, total))
    }

    async fn decide(
        &self,
        admin_id: Uuid,
        id: Uuid,
        decision: HostRequestDecision,
    ) -> AppResult<HostRequest> {
        let request = self
            .uow
            .host_requests()
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound)?;
        if !request.is_pending() {
            return Err(AppError::validation(format!(
                "Host request was already {}",
                request.status.as_str()
            )));
        }

        let decided = self
            .uow
            .transaction(move |ctx| {
                Box::pin(async move {
                    let decided = ctx
                        .host_requests()
                        .decide(id, admin_id, decision.clone())
                        .await?;

                    let notification = match &decision {
                        HostRequestDecision::Approve => {
                            ctx.users()
                                .set_privileges(
                                    decided.user_id,
                                    PrivilegeUpdate {
                                        is_host: Some(true),
                                        ..Default::default()
                                    },
                                )
                                .await?;
                            NewNotification::new(
                                decided.user_id,
                                NotificationKind::HostRequestApproved,
                                "You are now a host",
                                "Your host application was approved. You can publish listings.",
                            )
                            .with_link("/hosting/listings")
                        }
                        HostRequestDecision::Reject { reason } => NewNotification::new(
                            decided.user_id,
                            NotificationKind::HostRequestRejected,
                            "Host application rejected",
                            reason
                                .clone()
                                .unwrap_or_else(|| "Your host application was not approved.".to_string()),
                        ),
                    };
                    ctx.notifications().create(notification).await?;

                    let action = match decision {
                        HostRequestDecision::Approve => "host_request.approve",
                        HostRequestDecision::Reject { .. } => "host_request.reject",
                    };
                    ctx.admin_logs()
                        .append(
                            NewAdminLog::new(admin_id, action, "host_request", Some(id)).with_details(
                                json!({
                                    "user_id": decided.user_id,
                                    "rejection_reason": decided.rejection_reason,
                                }),
                            ),
                        )
                        .await?;

                    Ok(decided)
                })
            })
            .await?;

        tracing::info!(
            request_id = %id,
            admin_id = %admin_id,
            status = decided.status.as_str(),
            "Host request decided"
        );
        Ok(decided)
    }
}
