//! Admin console: platform stats, analytics, user moderation, backups
//! and the audit log.
//!
//! Every mutation appends an admin log entry in the same transaction.

use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

use super::today;
use crate::config::{ANALYTICS_CACHE_TTL_SECONDS, CACHE_PREFIX_ANALYTICS};
use crate::domain::analytics::build_report;
use crate::domain::{
    AdminLog, AnalyticsRange, AnalyticsReport, NewAdminLog, PlatformStats, PrivilegeUpdate, User,
};
use crate::errors::{AppError, AppResult};
use crate::infra::cache::{read_json, write_json};
use crate::infra::{BackupFile, BackupStorage, CacheStore, UnitOfWork};
use crate::types::{Paginated, PaginationParams};

/// Filters for the admin user list
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserQuery {
    /// Case-insensitive match on name or email
    pub search: Option<String>,
    pub include_deleted: bool,
}

#[async_trait]
pub trait AdminService: Send + Sync {
    async fn stats(&self) -> AppResult<PlatformStats>;

    async fn analytics(&self, range: AnalyticsRange) -> AppResult<AnalyticsReport>;

    async fn list_users(&self, query: UserQuery, params: PaginationParams)
        -> AppResult<Paginated<User>>;

    async fn update_user(&self, admin_id: Uuid, id: Uuid, update: PrivilegeUpdate)
        -> AppResult<User>;

    /// Soft delete; admins cannot delete themselves
    async fn delete_user(&self, admin_id: Uuid, id: Uuid) -> AppResult<()>;

    async fn restore_user(&self, admin_id: Uuid, id: Uuid) -> AppResult<User>;

    async fn create_backup(&self, admin_id: Uuid) -> AppResult<BackupFile>;

    async fn list_backups(&self) -> AppResult<Vec<BackupFile>>;

    async fn logs(&self, admin_id: Option<Uuid>, params: PaginationParams)
        -> AppResult<Paginated<AdminLog>>;
}

pub struct AdminConsole<U: UnitOfWork> {
    uow: Arc<U>,
    cache: Arc<dyn CacheStore>,
    backups: Arc<dyn BackupStorage>,
}

impl<U: UnitOfWork> AdminConsole<U> {
    pub fn new(uow: Arc<U>, cache: Arc<dyn CacheStore>, backups: Arc<dyn BackupStorage>) -> Self {
        Self {
            uow,
            cache,
            backups,
        }
    }
}

#[async_trait]
impl<U: UnitOfWork> AdminService for AdminConsole<U> {
    async fn stats(&self) -> AppResult<PlatformStats> {
        let users = self.uow.users();
        let listings = self.uow.listings();
        let bookings = self.uow.bookings();
        let host_requests = self.uow.host_requests();

        let (users_total, hosts, listings_total, bookings_total, pending, revenue) = tokio::try_join!(
            users.count(false),
            users.count(true),
            listings.count(),
            bookings.count(),
            host_requests.count_pending(),
            bookings.revenue_total(),
        )?;

        Ok(PlatformStats {
            users: users_total,
            hosts,
            listings: listings_total,
            bookings: bookings_total,
            pending_host_requests: pending,
            revenue_cents: revenue,
        })
    }

    async fn analytics(&self, range: AnalyticsRange) -> AppResult<AnalyticsReport> {
        let key = format!("{}{}", CACHE_PREFIX_ANALYTICS, range.as_str());
        if let Some(report) = read_json::<AnalyticsReport>(self.cache.as_ref(), &key).await {
            return Ok(report);
        }

        let today = today();
        let since = range.start(today);
        let unit = range.unit();
        let users = self.uow.users();
        let bookings = self.uow.bookings();

        let (signups, new_bookings, revenue) = tokio::try_join!(
            users.signups_by_bucket(unit, since),
            bookings.bookings_by_bucket(unit, since),
            bookings.revenue_by_bucket(unit, since),
        )?;

        let report = build_report(range, today, &signups, &new_bookings, &revenue);
        write_json(self.cache.as_ref(), &key, &report, ANALYTICS_CACHE_TTL_SECONDS).await;
        Ok(report)
    }

    async fn list_users(
        &self,
        query: UserQuery,
        params: PaginationParams,
    ) -> AppResult<Paginated<User>> {
        let (users, total) = self
            .uow
            .users()
            .list(params.clone(), query.search, query.include_deleted)
            .await?;
        Ok(params.paginate(users, total))
    }

    async fn update_user(
        &self,
        admin_id: Uuid,
        id: Uuid,
        update: PrivilegeUpdate,
    ) -> AppResult<User> {
        if id == admin_id && update.is_admin == Some(false) {
            return Err(AppError::validation("You cannot revoke your own admin access"));
        }

        let user = self
            .uow
            .transaction(move |ctx| {
                Box::pin(async move {
                    let details = json!({
                        "is_admin": update.is_admin,
                        "is_host": update.is_host,
                    });
                    let user = ctx.users().set_privileges(id, update).await?;
                    ctx.admin_logs()
                        .append(
                            NewAdminLog::new(admin_id, "user.update", "user", Some(id))
                                .with_details(details),
                        )
                        .await?;
                    Ok(user)
                })
            })
            .await?;

        tracing::info!(admin_id = %admin_id, user_id = %id, "User privileges updated");
        Ok(user)
    }

    async fn delete_user(&self, admin_id: Uuid, id: Uuid) -> AppResult<()> {
        if id == admin_id {
            return Err(AppError::validation("You cannot delete your own account"));
        }

        self.uow
            .transaction(move |ctx| {
                Box::pin(async move {
                    let user = ctx.users().find_by_id(id).await?.ok_or(AppError::NotFound)?;
                    ctx.users().delete(id).await?;
                    ctx.admin_logs()
                        .append(
                            NewAdminLog::new(admin_id, "user.delete", "user", Some(id))
                                .with_details(json!({ "email": user.email })),
                        )
                        .await?;
                    Ok(())
                })
            })
            .await?;

        tracing::info!(admin_id = %admin_id, user_id = %id, "User deleted");
        Ok(())
    }

    async fn restore_user(&self, admin_id: Uuid, id: Uuid) -> AppResult<User> {
        let user = self
            .uow
            .transaction(move |ctx| {
                Box::pin(async move {
                    let user = ctx.users().restore(id).await?;
                    ctx.admin_logs()
                        .append(NewAdminLog::new(admin_id, "user.restore", "user", Some(id)))
                        .await?;
                    Ok(user)
                })
            })
            .await?;

        tracing::info!(admin_id = %admin_id, user_id = %id, "User restored");
        Ok(user)
    }

    async fn create_backup(&self, admin_id: Uuid) -> AppResult<BackupFile> {
        let backup = self.backups.create().await?;
        self.uow
            .admin_logs()
            .append(
                NewAdminLog::new(admin_id, "backup.create", "backup", None).with_details(json!({
                    "file_name": backup.file_name,
                    "size_bytes": backup.size_bytes,
                })),
            )
            .await?;
        Ok(backup)
    }

    async fn list_backups(&self) -> AppResult<Vec<BackupFile>> {
        self.backups.list().await
    }

    async fn logs(
        &self,
        admin_id: Option<Uuid>,
        params: PaginationParams,
    ) -> AppResult<Paginated<AdminLog>> {
        let (logs, total) = self
            .uow
            .admin_logs()
            .list(admin_id, params.clone())
            .await?;
        Ok(params.paginate(logs, total))
    }
}
