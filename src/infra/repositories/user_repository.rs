//! User repository implementation with soft delete support.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use super::base::{bucket_counts, contains_pattern, fetch_page, DbHandle};
use super::entities::user::{self, ActiveModel, Entity as UserEntity};
use crate::domain::{BucketCount, BucketUnit, PrivilegeUpdate, ProfileUpdate, User};
use crate::errors::{AppError, AppResult};
use crate::types::PaginationParams;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// User repository trait for dependency injection.
///
/// By default, all query methods exclude soft-deleted records.
/// Use `*_with_deleted` variants to include them.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find active user by ID (excludes soft-deleted)
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    /// Find active user by email address (excludes soft-deleted)
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// Find user by email including soft-deleted
    async fn find_by_email_with_deleted(&self, email: &str) -> AppResult<Option<User>>;

    /// Create a new guest account
    async fn create(&self, email: String, password_hash: String, name: String) -> AppResult<User>;

    /// Update self-service profile fields; empty strings clear optional fields
    async fn update_profile(&self, id: Uuid, update: ProfileUpdate) -> AppResult<User>;

    async fn update_password(&self, id: Uuid, password_hash: String) -> AppResult<()>;

    /// Change admin/host flags (only active users)
    async fn set_privileges(&self, id: Uuid, update: PrivilegeUpdate) -> AppResult<User>;

    /// Soft delete user by ID (sets deleted_at timestamp)
    async fn delete(&self, id: Uuid) -> AppResult<()>;

    /// Restore a soft-deleted user
    async fn restore(&self, id: Uuid) -> AppResult<User>;

    /// Page through users, newest first, optionally filtered by name/email
    async fn list(
        &self,
        params: PaginationParams,
        search: Option<String>,
        include_deleted: bool,
    ) -> AppResult<(Vec<User>, u64)>;

    /// Count active users, optionally only hosts
    async fn count(&self, hosts_only: bool) -> AppResult<u64>;

    /// New sign-ups per bucket since `since`
    async fn signups_by_bucket(&self, unit: BucketUnit, since: NaiveDate)
        -> AppResult<Vec<BucketCount>>;
}

/// Concrete implementation of UserRepository with soft delete
pub struct UserStore<H = DatabaseConnection> {
    db: H,
}

impl<H: DbHandle> UserStore<H> {
    /// Create new repository instance
    pub fn new(db: H) -> Self {
        Self { db }
    }

    async fn find_active_model(&self, id: Uuid) -> AppResult<user::Model> {
        UserEntity::find_by_id(id)
            .filter(user::Column::DeletedAt.is_null())
            .one(self.db.conn())
            .await?
            .ok_or(AppError::NotFound)
    }
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

const SIGNUPS_SQL: &str = "SELECT date_trunc($1, created_at)::date AS bucket, \
     COUNT(*)::bigint AS value \
     FROM users WHERE created_at >= $2 AND deleted_at IS NULL \
     GROUP BY 1";

#[async_trait]
impl<H: DbHandle> UserRepository for UserStore<H> {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let result = UserEntity::find_by_id(id)
            .filter(user::Column::DeletedAt.is_null())
            .one(self.db.conn())
            .await?;

        Ok(result.map(User::from))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email.to_lowercase()))
            .filter(user::Column::DeletedAt.is_null())
            .one(self.db.conn())
            .await?;

        Ok(result.map(User::from))
    }

    async fn find_by_email_with_deleted(&self, email: &str) -> AppResult<Option<User>> {
        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email.to_lowercase()))
            .one(self.db.conn())
            .await?;

        Ok(result.map(User::from))
    }

    async fn create(&self, email: String, password_hash: String, name: String) -> AppResult<User> {
        let now = Utc::now();
        let active_model = ActiveModel {
            id: Set(Uuid::new_v4()),
            email: Set(email.to_lowercase()),
            password_hash: Set(password_hash),
            name: Set(name),
            bio: Set(None),
            phone: Set(None),
            avatar_url: Set(None),
            is_admin: Set(false),
            is_host: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
        };

        let model = active_model.insert(self.db.conn()).await?;
        Ok(User::from(model))
    }

    async fn update_profile(&self, id: Uuid, update: ProfileUpdate) -> AppResult<User> {
        let mut active: ActiveModel = self.find_active_model(id).await?.into();

        if let Some(name) = update.name {
            active.name = Set(name);
        }
        if let Some(bio) = update.bio {
            active.bio = Set(non_empty(bio));
        }
        if let Some(phone) = update.phone {
            active.phone = Set(non_empty(phone));
        }
        if let Some(avatar_url) = update.avatar_url {
            active.avatar_url = Set(non_empty(avatar_url));
        }
        active.updated_at = Set(Utc::now());

        let model = active.update(self.db.conn()).await?;
        Ok(User::from(model))
    }

    async fn update_password(&self, id: Uuid, password_hash: String) -> AppResult<()> {
        let mut active: ActiveModel = self.find_active_model(id).await?.into();
        active.password_hash = Set(password_hash);
        active.updated_at = Set(Utc::now());
        active.update(self.db.conn()).await?;
        Ok(())
    }

    async fn set_privileges(&self, id: Uuid, update: PrivilegeUpdate) -> AppResult<User> {
        let mut active: ActiveModel = self.find_active_model(id).await?.into();

        if let Some(is_admin) = update.is_admin {
            active.is_admin = Set(is_admin);
        }
        if let Some(is_host) = update.is_host {
            active.is_host = Set(is_host);
        }
        active.updated_at = Set(Utc::now());

        let model = active.update(self.db.conn()).await?;
        Ok(User::from(model))
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let mut active: ActiveModel = self.find_active_model(id).await?.into();
        let now = Utc::now();
        active.deleted_at = Set(Some(now));
        active.updated_at = Set(now);
        active.update(self.db.conn()).await?;
        Ok(())
    }

    async fn restore(&self, id: Uuid) -> AppResult<User> {
        let user = UserEntity::find_by_id(id)
            .filter(user::Column::DeletedAt.is_not_null())
            .one(self.db.conn())
            .await?
            .ok_or_else(|| AppError::validation("User is not deleted or does not exist"))?;

        let mut active: ActiveModel = user.into();
        active.deleted_at = Set(None);
        active.updated_at = Set(Utc::now());

        let model = active.update(self.db.conn()).await?;
        Ok(User::from(model))
    }

    async fn list(
        &self,
        params: PaginationParams,
        search: Option<String>,
        include_deleted: bool,
    ) -> AppResult<(Vec<User>, u64)> {
        let mut query = UserEntity::find().order_by_desc(user::Column::CreatedAt);

        if !include_deleted {
            query = query.filter(user::Column::DeletedAt.is_null());
        }
        if let Some(term) = search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            query = query.filter(
                Condition::any()
                    .add(Expr::col(user::Column::Email).like(contains_pattern(term)))
                    .add(
                        Expr::expr(Func::lower(Expr::col(user::Column::Name)))
                            .like(contains_pattern(term)),
                    ),
            );
        }

        let (models, total) = fetch_page(query, self.db.conn(), &params).await?;
        Ok((models.into_iter().map(User::from).collect(), total))
    }

    async fn count(&self, hosts_only: bool) -> AppResult<u64> {
        let mut query = UserEntity::find().filter(user::Column::DeletedAt.is_null());
        if hosts_only {
            query = query.filter(user::Column::IsHost.eq(true));
        }
        Ok(query.count(self.db.conn()).await?)
    }

    async fn signups_by_bucket(
        &self,
        unit: BucketUnit,
        since: NaiveDate,
    ) -> AppResult<Vec<BucketCount>> {
        bucket_counts(self.db.conn(), SIGNUPS_SQL, unit, since).await
    }
}
