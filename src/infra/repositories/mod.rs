//! Repository layer - Data access abstraction
//!
//! Repositories provide an abstraction over data persistence,
//! following the Repository pattern for clean separation of concerns.
//! Each store is generic over [`DbHandle`] and works the same on the
//! pooled connection and inside a transaction.

mod admin_log_repository;
mod base;
mod booking_repository;
pub(crate) mod entities;
mod favorite_repository;
mod host_request_repository;
mod listing_repository;
mod message_repository;
mod notification_repository;
mod payment_method_repository;
mod review_repository;
mod security_repository;
mod user_repository;

pub use admin_log_repository::{AdminLogRepository, AdminLogStore};
pub use base::DbHandle;
pub use booking_repository::{BookingRepository, BookingStore};
pub use favorite_repository::{FavoriteRepository, FavoriteStore};
pub use host_request_repository::{HostRequestRepository, HostRequestStore};
pub use listing_repository::{ListingRepository, ListingStore};
pub use message_repository::{MessageRepository, MessageStore};
pub use notification_repository::{NotificationRepository, NotificationStore};
pub use payment_method_repository::{PaymentMethodRepository, PaymentMethodStore};
pub use review_repository::{ReviewRepository, ReviewStore};
pub use security_repository::{SecurityRepository, SecurityStore};
pub use user_repository::{UserRepository, UserStore};

// Export mocks for tests (both unit and integration)
#[cfg(any(test, feature = "test-utils"))]
pub use admin_log_repository::MockAdminLogRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use booking_repository::MockBookingRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use favorite_repository::MockFavoriteRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use host_request_repository::MockHostRequestRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use listing_repository::MockListingRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use message_repository::MockMessageRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use notification_repository::MockNotificationRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use payment_method_repository::MockPaymentMethodRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use review_repository::MockReviewRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use security_repository::MockSecurityRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use user_repository::MockUserRepository;
