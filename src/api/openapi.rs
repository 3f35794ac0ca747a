//! OpenAPI documentation configuration.
//!
//! Served by Swagger UI at `/swagger-ui`.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers::{
    admin_handler, auth_handler, booking_handler, favorite_handler, host_request_handler,
    listing_handler, message_handler, notification_handler, payment_handler, review_handler,
    user_handler,
};
use crate::domain::analytics::SeriesPoint;
use crate::domain::{
    AdminLog, AnalyticsRange, AnalyticsReport, BookedRange, BookingResponse, BookingStatus,
    BucketUnit, CardBrand, HostRequest, HostRequestStatus, ListingDetail, ListingResponse,
    Message, MessageThread, Notification, NotificationKind, PaymentMethod, PlatformStats,
    PropertyType, PublicProfile, RefundQuote, RefundTier, Review, SecuritySettings,
    ThreadDetail, ThreadSummary, UserResponse,
};
use crate::infra::BackupFile;
use crate::services::TokenResponse;
use crate::types::{
    MessageResponse, PaginatedAdminLogs, PaginatedBookings, PaginatedHostRequests,
    PaginatedListings, PaginatedNotifications, PaginatedReviews, PaginatedUsers, PaginationMeta,
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "StayHub API",
        version = "0.1.0",
        description = "Vacation rental marketplace: listings, bookings, messaging, reviews and the admin console",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development server")
    ),
    paths(
        auth_handler::register,
        auth_handler::login,
        auth_handler::logout,
        auth_handler::session,
        user_handler::get_me,
        user_handler::update_me,
        user_handler::change_password,
        user_handler::get_security,
        user_handler::update_security,
        user_handler::get_public_profile,
        payment_handler::list_cards,
        payment_handler::add_card,
        payment_handler::set_default_card,
        payment_handler::delete_card,
        listing_handler::search_listings,
        listing_handler::get_listing,
        listing_handler::create_listing,
        listing_handler::update_listing,
        listing_handler::delete_listing,
        listing_handler::get_availability,
        listing_handler::list_listing_reviews,
        listing_handler::host_listings,
        booking_handler::create_booking,
        booking_handler::list_my_bookings,
        booking_handler::host_bookings,
        booking_handler::get_booking,
        booking_handler::update_booking_status,
        booking_handler::get_refund_quote,
        booking_handler::cancel_booking,
        favorite_handler::toggle_favorite,
        favorite_handler::list_favorites,
        message_handler::start_conversation,
        message_handler::list_threads,
        message_handler::get_thread,
        message_handler::send_message,
        review_handler::create_review,
        review_handler::delete_review,
        host_request_handler::apply_for_hosting,
        host_request_handler::my_host_requests,
        notification_handler::list_notifications,
        notification_handler::unread_count,
        notification_handler::mark_read,
        notification_handler::mark_all_read,
        notification_handler::delete_notification,
        admin_handler::get_stats,
        admin_handler::get_analytics,
        admin_handler::list_users,
        admin_handler::update_user,
        admin_handler::delete_user,
        admin_handler::restore_user,
        admin_handler::list_host_requests,
        admin_handler::approve_host_request,
        admin_handler::reject_host_request,
        admin_handler::create_backup,
        admin_handler::list_backups,
        admin_handler::list_logs,
    ),
    components(
        schemas(
            UserResponse,
            PublicProfile,
            SecuritySettings,
            TokenResponse,
            MessageResponse,
            PaginationMeta,
            PaymentMethod,
            CardBrand,
            ListingResponse,
            ListingDetail,
            PropertyType,
            BookedRange,
            BookingResponse,
            BookingStatus,
            RefundQuote,
            RefundTier,
            Review,
            MessageThread,
            Message,
            ThreadSummary,
            ThreadDetail,
            Notification,
            NotificationKind,
            HostRequest,
            HostRequestStatus,
            AdminLog,
            PlatformStats,
            AnalyticsRange,
            AnalyticsReport,
            BucketUnit,
            SeriesPoint,
            BackupFile,
            PaginatedListings,
            PaginatedBookings,
            PaginatedReviews,
            PaginatedNotifications,
            PaginatedUsers,
            PaginatedHostRequests,
            PaginatedAdminLogs,
            auth_handler::RegisterRequest,
            auth_handler::LoginRequest,
            user_handler::UpdateProfileRequest,
            user_handler::ChangePasswordRequest,
            user_handler::UpdateSecurityRequest,
            payment_handler::AddCardRequest,
            listing_handler::CreateListingRequest,
            listing_handler::UpdateListingRequest,
            booking_handler::CreateBookingRequest,
            booking_handler::UpdateBookingStatusRequest,
            favorite_handler::FavoriteToggleResponse,
            message_handler::StartConversationRequest,
            message_handler::SendMessageRequest,
            review_handler::CreateReviewRequest,
            host_request_handler::HostApplicationRequest,
            notification_handler::UnreadCountResponse,
            notification_handler::MarkAllReadResponse,
            admin_handler::UpdateUserRequest,
            admin_handler::RejectHostRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Registration, login and sessions"),
        (name = "Users", description = "Profiles, passwords and security settings"),
        (name = "Payment methods", description = "Saved cards"),
        (name = "Listings", description = "Search, detail and host management"),
        (name = "Hosting", description = "The host's own listings and bookings"),
        (name = "Bookings", description = "Reservations and cancellations"),
        (name = "Favorites", description = "Saved listings"),
        (name = "Messages", description = "Conversations between users"),
        (name = "Reviews", description = "Guest reviews of stays"),
        (name = "Host requests", description = "Applications for hosting"),
        (name = "Notifications", description = "In-app notifications"),
        (name = "Admin", description = "Admin console")
    )
)]
pub struct ApiDoc;

/// Security scheme modifier for JWT Bearer authentication
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT from /api/auth/login (also sent as the session cookie)"))
                        .build(),
                ),
            );
        }
    }
}
