//! Unit of Work pattern implementation.
//!
//! The Unit of Work:
//! - Centralizes access to all repositories
//! - Manages database transactions (begin, commit, rollback)
//! - Hands the closure a [`TransactionContext`] whose repositories all run
//!   on the same transaction

use async_trait::async_trait;
use sea_orm::{AccessMode, DatabaseConnection, IsolationLevel, TransactionTrait};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use super::repositories::{
    AdminLogRepository, AdminLogStore, BookingRepository, BookingStore, DbHandle,
    FavoriteRepository, FavoriteStore, HostRequestRepository, HostRequestStore,
    ListingRepository, ListingStore, MessageRepository, MessageStore, NotificationRepository,
    NotificationStore, PaymentMethodRepository, PaymentMethodStore, ReviewRepository, ReviewStore,
    SecurityRepository, SecurityStore, UserRepository, UserStore,
};
use crate::errors::{AppError, AppResult};

/// Boxed future returned by transaction closures
pub type TxFuture<'a, T> = Pin<Box<dyn Future<Output = AppResult<T>> + Send + 'a>>;

/// One instance of every repository, bound to the same connection.
#[derive(Clone)]
pub struct Repositories<'a> {
    pub users: Arc<dyn UserRepository + 'a>,
    pub security: Arc<dyn SecurityRepository + 'a>,
    pub payment_methods: Arc<dyn PaymentMethodRepository + 'a>,
    pub listings: Arc<dyn ListingRepository + 'a>,
    pub bookings: Arc<dyn BookingRepository + 'a>,
    pub favorites: Arc<dyn FavoriteRepository + 'a>,
    pub messages: Arc<dyn MessageRepository + 'a>,
    pub reviews: Arc<dyn ReviewRepository + 'a>,
    pub host_requests: Arc<dyn HostRequestRepository + 'a>,
    pub notifications: Arc<dyn NotificationRepository + 'a>,
    pub admin_logs: Arc<dyn AdminLogRepository + 'a>,
}

impl<'a> Repositories<'a> {
    /// Build every store on top of `db`
    pub fn on<H: DbHandle + Clone + 'a>(db: H) -> Self {
        Self {
            users: Arc::new(UserStore::new(db.clone())),
            security: Arc::new(SecurityStore::new(db.clone())),
            payment_methods: Arc::new(PaymentMethodStore::new(db.clone())),
            listings: Arc::new(ListingStore::new(db.clone())),
            bookings: Arc::new(BookingStore::new(db.clone())),
            favorites: Arc::new(FavoriteStore::new(db.clone())),
            messages: Arc::new(MessageStore::new(db.clone())),
            reviews: Arc::new(ReviewStore::new(db.clone())),
            host_requests: Arc::new(HostRequestStore::new(db.clone())),
            notifications: Arc::new(NotificationStore::new(db.clone())),
            admin_logs: Arc::new(AdminLogStore::new(db)),
        }
    }
}

/// Unit of Work trait for dependency injection.
///
/// Provides centralized access to all repositories and transaction management.
/// Not object safe because of the generic transaction methods, so services
/// are generic over it instead.
#[async_trait]
pub trait UnitOfWork: Send + Sync + 'static {
    fn users(&self) -> Arc<dyn UserRepository>;
    fn security(&self) -> Arc<dyn SecurityRepository>;
    fn payment_methods(&self) -> Arc<dyn PaymentMethodRepository>;
    fn listings(&self) -> Arc<dyn ListingRepository>;
    fn bookings(&self) -> Arc<dyn BookingRepository>;
    fn favorites(&self) -> Arc<dyn FavoriteRepository>;
    fn messages(&self) -> Arc<dyn MessageRepository>;
    fn reviews(&self) -> Arc<dyn ReviewRepository>;
    fn host_requests(&self) -> Arc<dyn HostRequestRepository>;
    fn notifications(&self) -> Arc<dyn NotificationRepository>;
    fn admin_logs(&self) -> Arc<dyn AdminLogRepository>;

    /// Execute a closure within a transaction.
    ///
    /// The transaction is committed on success and rolled back on error.
    /// Uses ReadCommitted isolation.
    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> TxFuture<'a, T> + Send,
        T: Send;

    /// Execute a closure within a serializable transaction.
    async fn transaction_serializable<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> TxFuture<'a, T> + Send,
        T: Send;
}

/// Transaction context providing repository access within a transaction.
///
/// Every repository handed out here borrows the same transaction.
pub struct TransactionContext<'a> {
    repos: Repositories<'a>,
}

impl<'a> TransactionContext<'a> {
    pub fn new(repos: Repositories<'a>) -> Self {
        Self { repos }
    }

    pub fn users(&self) -> &(dyn UserRepository + 'a) {
        self.repos.users.as_ref()
    }

    pub fn security(&self) -> &(dyn SecurityRepository + 'a) {
        self.repos.security.as_ref()
    }

    pub fn payment_methods(&self) -> &(dyn PaymentMethodRepository + 'a) {
        self.repos.payment_methods.as_ref()
    }

    pub fn listings(&self) -> &(dyn ListingRepository + 'a) {
        self.repos.listings.as_ref()
    }

    pub fn bookings(&self) -> &(dyn BookingRepository + 'a) {
        self.repos.bookings.as_ref()
    }

    pub fn favorites(&self) -> &(dyn FavoriteRepository + 'a) {
        self.repos.favorites.as_ref()
    }

    pub fn messages(&self) -> &(dyn MessageRepository + 'a) {
        self.repos.messages.as_ref()
    }

    pub fn reviews(&self) -> &(dyn ReviewRepository + 'a) {
        self.repos.reviews.as_ref()
    }

    pub fn host_requests(&self) -> &(dyn HostRequestRepository + 'a) {
        self.repos.host_requests.as_ref()
    }

    pub fn notifications(&self) -> &(dyn NotificationRepository + 'a) {
        self.repos.notifications.as_ref()
    }

    pub fn admin_logs(&self) -> &(dyn AdminLogRepository + 'a) {
        self.repos.admin_logs.as_ref()
    }
}

/// Concrete implementation of UnitOfWork over a SeaORM connection pool
pub struct Persistence {
    db: DatabaseConnection,
    repos: Repositories<'static>,
}

impl Persistence {
    pub fn new(db: DatabaseConnection) -> Self {
        let repos = Repositories::on(db.clone());
        Self { db, repos }
    }

    /// Internal transaction execution with configurable isolation level
    async fn execute_transaction<F, T>(&self, isolation: IsolationLevel, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> TxFuture<'a, T> + Send,
        T: Send,
    {
        let txn = self
            .db
            .begin_with_config(Some(isolation), Some(AccessMode::ReadWrite))
            .await
            .map_err(AppError::from)?;

        let outcome = f(TransactionContext::new(Repositories::on(&txn))).await;

        match outcome {
            Ok(result) => {
                txn.commit().await.map_err(AppError::from)?;
                Ok(result)
            }
            Err(e) => {
                if let Err(rollback_err) = txn.rollback().await {
                    tracing::error!("Transaction rollback failed: {}", rollback_err);
                }
                Err(e)
            }
        }
    }
}

macro_rules! repository_accessors {
    ($($name:ident: $repo:ident),* $(,)?) => {
        $(
            fn $name(&self) -> Arc<dyn $repo> {
                self.repos.$name.clone()
            }
        )*
    };
}

#[async_trait]
impl UnitOfWork for Persistence {
    repository_accessors! {
        users: UserRepository,
        security: SecurityRepository,
        payment_methods: PaymentMethodRepository,
        listings: ListingRepository,
        bookings: BookingRepository,
        favorites: FavoriteRepository,
        messages: MessageRepository,
        reviews: ReviewRepository,
        host_requests: HostRequestRepository,
        notifications: NotificationRepository,
        admin_logs: AdminLogRepository,
    }

    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> TxFuture<'a, T> + Send,
        T: Send,
    {
        self.execute_transaction(IsolationLevel::ReadCommitted, f).await
    }

    async fn transaction_serializable<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> TxFuture<'a, T> + Send,
        T: Send,
    {
        self.execute_transaction(IsolationLevel::Serializable, f).await
    }
}

#[cfg(any(test, feature = "test-utils"))]
pub use mock::MockPersistence;

#[cfg(any(test, feature = "test-utils"))]
mod mock {
    use super::*;
    use crate::infra::repositories::{
        MockAdminLogRepository, MockBookingRepository, MockFavoriteRepository,
        MockHostRequestRepository, MockListingRepository, MockMessageRepository,
        MockNotificationRepository, MockPaymentMethodRepository, MockReviewRepository,
        MockSecurityRepository, MockUserRepository,
    };

    /// Unit of Work backed by mockall repositories.
    ///
    /// Transactions run the closure directly against the same mocks, so a
    /// test sets expectations once regardless of whether the service goes
    /// through a transaction. Repositories without expectations panic when
    /// called.
    pub struct MockPersistence {
        repos: Repositories<'static>,
    }

    impl Default for MockPersistence {
        fn default() -> Self {
            Self {
                repos: Repositories {
                    users: Arc::new(MockUserRepository::new()),
                    security: Arc::new(MockSecurityRepository::new()),
                    payment_methods: Arc::new(MockPaymentMethodRepository::new()),
                    listings: Arc::new(MockListingRepository::new()),
                    bookings: Arc::new(MockBookingRepository::new()),
                    favorites: Arc::new(MockFavoriteRepository::new()),
                    messages: Arc::new(MockMessageRepository::new()),
                    reviews: Arc::new(MockReviewRepository::new()),
                    host_requests: Arc::new(MockHostRequestRepository::new()),
                    notifications: Arc::new(MockNotificationRepository::new()),
                    admin_logs: Arc::new(MockAdminLogRepository::new()),
                },
            }
        }
    }

    macro_rules! mock_setters {
        ($($setter:ident => $field:ident: $mock:ty),* $(,)?) => {
            $(
                pub fn $setter(mut self, repo: $mock) -> Self {
                    self.repos.$field = Arc::new(repo);
                    self
                }
            )*
        };
    }

    impl MockPersistence {
        pub fn new() -> Self {
            Self::default()
        }

        mock_setters! {
            with_users => users: MockUserRepository,
            with_security => security: MockSecurityRepository,
            with_payment_methods => payment_methods: MockPaymentMethodRepository,
            with_listings => listings: MockListingRepository,
            with_bookings => bookings: MockBookingRepository,
            with_favorites => favorites: MockFavoriteRepository,
            with_messages => messages: MockMessageRepository,
            with_reviews => reviews: MockReviewRepository,
            with_host_requests => host_requests: MockHostRequestRepository,
            with_notifications => notifications: MockNotificationRepository,
            with_admin_logs => admin_logs: MockAdminLogRepository,
        }
    }

    #[async_trait]
    impl UnitOfWork for MockPersistence {
        repository_accessors! {
            users: UserRepository,
            security: SecurityRepository,
            payment_methods: PaymentMethodRepository,
            listings: ListingRepository,
            bookings: BookingRepository,
            favorites: FavoriteRepository,
            messages: MessageRepository,
            reviews: ReviewRepository,
            host_requests: HostRequestRepository,
            notifications: NotificationRepository,
            admin_logs: AdminLogRepository,
        }

        async fn transaction<F, T>(&self, f: F) -> AppResult<T>
        where
            F: for<'a> FnOnce(TransactionContext<'a>) -> TxFuture<'a, T> + Send,
            T: Send,
        {
            f(TransactionContext::new(self.repos.clone())).await
        }

        async fn transaction_serializable<F, T>(&self, f: F) -> AppResult<T>
        where
            F: for<'a> FnOnce(TransactionContext<'a>) -> TxFuture<'a, T> + Send,
            T: Send,
        {
            f(TransactionContext::new(self.repos.clone())).await
        }
    }
}
