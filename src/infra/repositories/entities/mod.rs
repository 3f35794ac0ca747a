//! SeaORM entity definitions
//!
//! These are database-specific entities separate from domain models.

pub mod admin_log;
pub mod booking;
pub mod favorite;
pub mod host_request;
pub mod listing;
pub mod message;
pub mod message_thread;
pub mod notification;
pub mod payment_method;
pub mod review;
pub mod security_settings;
pub mod thread_participant;
pub mod user;
