//! In-app notifications.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::booking::BookingStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    BookingRequested,
    BookingConfirmed,
    BookingRejected,
    BookingCancelled,
    BookingCompleted,
    NewMessage,
    NewReview,
    HostRequestApproved,
    HostRequestRejected,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::BookingRequested => "booking_requested",
            NotificationKind::BookingConfirmed => "booking_confirmed",
            NotificationKind::BookingRejected => "booking_rejected",
            NotificationKind::BookingCancelled => "booking_cancelled",
            NotificationKind::BookingCompleted => "booking_completed",
            NotificationKind::NewMessage => "new_message",
            NotificationKind::NewReview => "new_review",
            NotificationKind::HostRequestApproved => "host_request_approved",
            NotificationKind::HostRequestRejected => "host_request_rejected",
        }
    }

    /// Notification sent to the guest when a booking reaches `status`
    pub fn for_booking_status(status: BookingStatus) -> Option<Self> {
        match status {
            BookingStatus::Confirmed => Some(NotificationKind::BookingConfirmed),
            BookingStatus::Rejected => Some(NotificationKind::BookingRejected),
            BookingStatus::Cancelled => Some(NotificationKind::BookingCancelled),
            BookingStatus::Completed => Some(NotificationKind::BookingCompleted),
            BookingStatus::Pending => None,
        }
    }
}

impl From<&str> for NotificationKind {
    fn from(s: &str) -> Self {
        match s {
            "booking_requested" => NotificationKind::BookingRequested,
            "booking_confirmed" => NotificationKind::BookingConfirmed,
            "booking_rejected" => NotificationKind::BookingRejected,
            "booking_cancelled" => NotificationKind::BookingCancelled,
            "booking_completed" => NotificationKind::BookingCompleted,
            "new_review" => NotificationKind::NewReview,
            "host_request_approved" => NotificationKind::HostRequestApproved,
            "host_request_rejected" => NotificationKind::HostRequestRejected,
            _ => NotificationKind::NewMessage,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: NotificationKind,
    pub title: String,
    pub body: String,
    /// Frontend route the notification points at
    #[schema(example = "/bookings/550e8400-e29b-41d4-a716-446655440000")]
    pub link: Option<String>,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Notification to be stored
#[derive(Debug, Clone, PartialEq)]
pub struct NewNotification {
    pub user_id: Uuid,
    pub kind: NotificationKind,
    pub title: String,
    pub body: String,
    pub link: Option<String>,
}

impl NewNotification {
    pub fn new(
        user_id: Uuid,
        kind: NotificationKind,
        title: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            user_id,
            kind,
            title: title.into(),
            body: body.into(),
            link: None,
        }
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }
}
