//! Messaging handlers: threads and messages.

use axum::{
    extract::{Path, State},
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::{Message, NewConversation, ThreadDetail, ThreadSummary};
use crate::errors::AppResult;
use crate::types::Created;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct StartConversationRequest {
    pub recipient_id: Uuid,
    pub listing_id: Option<Uuid>,
    pub booking_id: Option<Uuid>,
    #[validate(length(max = 200, message = "Subject is too long"))]
    pub subject: Option<String>,
    #[validate(length(min = 1, max = 5000, message = "Message must be 1 to 5000 characters"))]
    #[schema(example = "Hi! Is the loft available over New Year?")]
    pub body: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SendMessageRequest {
    #[validate(length(min = 1, max = 5000, message = "Message must be 1 to 5000 characters"))]
    pub body: String,
}

pub fn message_routes() -> Router<AppState> {
    Router::new()
        .route("/threads", get(list_threads).post(start_conversation))
        .route("/threads/:id", get(get_thread))
        .route("/threads/:id/messages", post(send_message))
}

/// Start (or continue) a conversation with another user
#[utoipa::path(
    post,
    path = "/api/messages/threads",
    tag = "Messages",
    security(("bearer_auth" = [])),
    request_body = StartConversationRequest,
    responses(
        (status = 201, description = "Thread with the new message", body = ThreadDetail),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Recipient not found")
    )
)]
pub async fn start_conversation(
    current_user: CurrentUser,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<StartConversationRequest>,
) -> AppResult<Created<ThreadDetail>> {
    let conversation = NewConversation {
        sender_id: current_user.id,
        recipient_id: payload.recipient_id,
        listing_id: payload.listing_id,
        booking_id: payload.booking_id,
        subject: payload.subject,
        body: payload.body,
    };
    let thread = state
        .services
        .messages()
        .start_conversation(conversation)
        .await?;
    Ok(Created(thread))
}

/// Inbox with last message and unread count per thread
#[utoipa::path(
    get,
    path = "/api/messages/threads",
    tag = "Messages",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Threads", body = Vec<ThreadSummary>),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn list_threads(
    current_user: CurrentUser,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<ThreadSummary>>> {
    let threads = state.services.messages().threads(current_user.id).await?;
    Ok(Json(threads))
}

/// Read a thread; marks it read for the caller
#[utoipa::path(
    get,
    path = "/api/messages/threads/{id}",
    tag = "Messages",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Thread ID")),
    responses(
        (status = 200, description = "Thread with messages", body = ThreadDetail),
        (status = 404, description = "Thread not found")
    )
)]
pub async fn get_thread(
    current_user: CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ThreadDetail>> {
    let thread = state
        .services
        .messages()
        .thread(current_user.id, id)
        .await?;
    Ok(Json(thread))
}

/// Reply in a thread
#[utoipa::path(
    post,
    path = "/api/messages/threads/{id}/messages",
    tag = "Messages",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Thread ID")),
    request_body = SendMessageRequest,
    responses(
        (status = 201, description = "Message sent", body = Message),
        (status = 404, description = "Thread not found")
    )
)]
pub async fn send_message(
    current_user: CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<SendMessageRequest>,
) -> AppResult<Created<Message>> {
    let message = state
        .services
        .messages()
        .send(current_user.id, id, payload.body)
        .await?;
    Ok(Created(message))
}
