//! Shared API types.

mod pagination;
mod response;

pub use pagination::{
    Paginated, PaginatedAdminLogs, PaginatedBookings, PaginatedHostRequests, PaginatedListings,
    PaginatedNotifications, PaginatedReviews, PaginatedUsers, PaginationMeta, PaginationParams,
};
pub use response::{Created, MessageResponse, NoContent};
