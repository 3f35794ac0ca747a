//! Message threads between users.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

/// Conversation container, optionally tied to a listing or booking
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MessageThread {
    pub id: Uuid,
    pub listing_id: Option<Uuid>,
    pub booking_id: Option<Uuid>,
    pub subject: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Time of the latest activity in the thread
    pub updated_at: DateTime<Utc>,
}

/// A thread member and how far they have read
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Participant {
    pub thread_id: Uuid,
    pub user_id: Uuid,
    pub last_read_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Message {
    pub id: Uuid,
    pub thread_id: Uuid,
    pub sender_id: Uuid,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// Thread entry in the inbox
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ThreadSummary {
    #[serde(flatten)]
    pub thread: MessageThread,
    pub participant_ids: Vec<Uuid>,
    pub last_message: Option<Message>,
    pub unread_count: u64,
}

/// A full conversation
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ThreadDetail {
    #[serde(flatten)]
    pub thread: MessageThread,
    pub participant_ids: Vec<Uuid>,
    pub messages: Vec<Message>,
}

/// Opening message of a conversation
#[derive(Debug, Clone, PartialEq)]
pub struct NewConversation {
    pub sender_id: Uuid,
    pub recipient_id: Uuid,
    pub listing_id: Option<Uuid>,
    pub booking_id: Option<Uuid>,
    pub subject: Option<String>,
    pub body: String,
}
