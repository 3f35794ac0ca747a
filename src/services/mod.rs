//! Application services layer - Use cases and business logic.
//!
//! Services orchestrate domain rules and infrastructure to fulfil the
//! API's use cases. Each one is a trait plus a concrete implementation
//! generic over the Unit of Work, so handlers only see `Arc<dyn Trait>`.

mod admin_service;
mod auth_service;
mod booking_service;
pub mod container;
mod favorite_service;
mod host_request_service;
mod listing_service;
mod message_service;
mod notification_service;
mod payment_service;
mod review_service;
mod user_service;

use chrono::{NaiveDate, Utc};
use uuid::Uuid;

pub use container::{Backends, ServiceContainer, Services};

pub use admin_service::{AdminConsole, AdminService, UserQuery};
pub use auth_service::{AuthService, Authenticator, Claims, TokenResponse};
pub use booking_service::{BookingManager, BookingRequest, BookingService};
pub use favorite_service::{FavoriteManager, FavoriteService};
pub use host_request_service::{HostRequestManager, HostRequestService};
pub use listing_service::{ListingManager, ListingService};
pub use message_service::{MessageManager, MessageService};
pub use notification_service::{NotificationManager, NotificationService};
pub use payment_service::{CardInput, PaymentMethodManager, PaymentMethodService};
pub use review_service::{ReviewManager, ReviewService};
pub use user_service::{UserManager, UserService};

#[cfg(any(test, feature = "test-utils"))]
pub use container::MockServiceContainer;

/// The authenticated caller of a use case
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub id: Uuid,
    pub is_admin: bool,
}

impl Actor {
    pub fn new(id: Uuid, is_admin: bool) -> Self {
        Self { id, is_admin }
    }
}

/// Calendar date used for stay and refund rules
pub(crate) fn today() -> NaiveDate {
    Utc::now().date_naive()
}
