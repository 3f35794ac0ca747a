//! HTTP request handlers.

pub mod admin_handler;
pub mod auth_handler;
pub mod booking_handler;
pub mod favorite_handler;
pub mod host_request_handler;
pub mod listing_handler;
pub mod message_handler;
pub mod notification_handler;
pub mod payment_handler;
pub mod review_handler;
pub mod user_handler;

pub use admin_handler::admin_routes;
pub use auth_handler::{auth_routes, session_routes};
pub use booking_handler::booking_routes;
pub use favorite_handler::favorite_routes;
pub use host_request_handler::host_request_routes;
pub use listing_handler::listing_routes;
pub use message_handler::message_routes;
pub use notification_handler::notification_routes;
pub use payment_handler::payment_routes;
pub use review_handler::review_routes;
pub use user_handler::user_routes;
