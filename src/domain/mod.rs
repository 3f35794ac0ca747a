//! Domain layer - Core business entities and rules
//!
//! Entities, value objects and the pure rules of the marketplace:
//! booking pricing and status transitions, the cancellation refund
//! policy and analytics bucketing. Nothing here touches the database.

pub mod admin_log;
pub mod analytics;
pub mod booking;
pub mod cancellation;
pub mod host_request;
pub mod listing;
pub mod message;
pub mod notification;
pub mod password;
pub mod payment_method;
pub mod review;
pub mod security;
pub mod user;

pub use admin_log::{AdminLog, NewAdminLog};
pub use analytics::{AnalyticsRange, AnalyticsReport, BucketCount, BucketUnit, PlatformStats};
pub use booking::{
    Booking, BookingResponse, BookingStatus, CancellationRecord, NewBooking, PriceQuote,
};
pub use cancellation::{refund_quote, RefundQuote, RefundTier};
pub use host_request::{HostRequest, HostRequestDecision, HostRequestStatus};
pub use listing::{
    BookedRange, Listing, ListingDetail, ListingFilter, ListingResponse, ListingUpdate,
    NewListing, PropertyType, RatingSummary,
};
pub use message::{Message, MessageThread, NewConversation, Participant, ThreadDetail, ThreadSummary};
pub use notification::{NewNotification, Notification, NotificationKind};
pub use password::Password;
pub use payment_method::{CardBrand, NewPaymentMethod, PaymentMethod};
pub use review::{NewReview, Review};
pub use security::{SecuritySettings, SecurityUpdate};
pub use user::{PrivilegeUpdate, ProfileUpdate, PublicProfile, User, UserResponse};
