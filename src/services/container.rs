//! Service container - centralized access to every application service.

use std::sync::Arc;

use super::{
    AdminConsole, AdminService, AuthService, Authenticator, BookingManager, BookingService,
    FavoriteManager, FavoriteService, HostRequestManager, HostRequestService, ListingManager,
    ListingService, MessageManager, MessageService, NotificationManager, NotificationService,
    PaymentMethodManager, PaymentMethodService, ReviewManager, ReviewService, UserManager,
    UserService,
};
use crate::config::Config;
use crate::infra::{BackupStorage, CacheStore, UnitOfWork};
use crate::jobs::EmailDispatcher;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Service container trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait ServiceContainer: Send + Sync {
    fn auth(&self) -> Arc<dyn AuthService>;
    fn users(&self) -> Arc<dyn UserService>;
    fn payment_methods(&self) -> Arc<dyn PaymentMethodService>;
    fn listings(&self) -> Arc<dyn ListingService>;
    fn bookings(&self) -> Arc<dyn BookingService>;
    fn favorites(&self) -> Arc<dyn FavoriteService>;
    fn messages(&self) -> Arc<dyn MessageService>;
    fn reviews(&self) -> Arc<dyn ReviewService>;
    fn host_requests(&self) -> Arc<dyn HostRequestService>;
    fn notifications(&self) -> Arc<dyn NotificationService>;
    fn admin(&self) -> Arc<dyn AdminService>;
}

/// External systems the services talk to besides the database
#[derive(Clone)]
pub struct Backends {
    pub cache: Arc<dyn CacheStore>,
    pub backups: Arc<dyn BackupStorage>,
    pub mailer: Arc<dyn EmailDispatcher>,
}

/// Concrete implementation of ServiceContainer
#[derive(Clone)]
pub struct Services {
    auth: Arc<dyn AuthService>,
    users: Arc<dyn UserService>,
    payment_methods: Arc<dyn PaymentMethodService>,
    listings: Arc<dyn ListingService>,
    bookings: Arc<dyn BookingService>,
    favorites: Arc<dyn FavoriteService>,
    messages: Arc<dyn MessageService>,
    reviews: Arc<dyn ReviewService>,
    host_requests: Arc<dyn HostRequestService>,
    notifications: Arc<dyn NotificationService>,
    admin: Arc<dyn AdminService>,
}

impl Services {
    /// Wire every service on top of one Unit of Work
    pub fn new<U: UnitOfWork>(uow: Arc<U>, backends: Backends, config: Config) -> Self {
        let Backends {
            cache,
            backups,
            mailer,
        } = backends;

        Self {
            auth: Arc::new(Authenticator::new(uow.clone(), mailer.clone(), config)),
            users: Arc::new(UserManager::new(uow.clone())),
            payment_methods: Arc::new(PaymentMethodManager::new(uow.clone())),
            listings: Arc::new(ListingManager::new(uow.clone(), cache.clone())),
            bookings: Arc::new(BookingManager::new(uow.clone(), mailer)),
            favorites: Arc::new(FavoriteManager::new(uow.clone())),
            messages: Arc::new(MessageManager::new(uow.clone())),
            reviews: Arc::new(ReviewManager::new(uow.clone(), cache.clone())),
            host_requests: Arc::new(HostRequestManager::new(uow.clone())),
            notifications: Arc::new(NotificationManager::new(uow.clone())),
            admin: Arc::new(AdminConsole::new(uow, cache, backups)),
        }
    }
}

macro_rules! service_accessors {
    ($($name:ident: $service:ident),* $(,)?) => {
        $(
            fn $name(&self) -> Arc<dyn $service> {
                self.$name.clone()
            }
        )*
    };
}

impl ServiceContainer for Services {
    service_accessors! {
        auth: AuthService,
        users: UserService,
        payment_methods: PaymentMethodService,
        listings: ListingService,
        bookings: BookingService,
        favorites: FavoriteService,
        messages: MessageService,
        reviews: ReviewService,
        host_requests: HostRequestService,
        notifications: NotificationService,
        admin: AdminService,
    }
}
