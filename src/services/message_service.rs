//! Messaging between guests, hosts and admins.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{
    Message, MessageThread, NewConversation, NewNotification, NotificationKind, ThreadDetail,
    ThreadSummary,
};
use crate::errors::{AppError, AppResult};
use crate::infra::{TransactionContext, UnitOfWork};

#[async_trait]
pub trait MessageService: Send + Sync {
    /// Open (or reuse) the thread with the recipient and post the first message
    async fn start_conversation(&self, conversation: NewConversation) -> AppResult<ThreadDetail>;

    /// Inbox of the user, latest activity first
    async fn threads(&self, user_id: Uuid) -> AppResult<Vec<ThreadSummary>>;

    /// Full thread for a participant; marks it read
    async fn thread(&self, user_id: Uuid, thread_id: Uuid) -> AppResult<ThreadDetail>;

    async fn send(&self, user_id: Uuid, thread_id: Uuid, body: String) -> AppResult<Message>;
}

pub struct MessageManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> MessageManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }

    async fn detail(&self, thread: MessageThread) -> AppResult<ThreadDetail> {
        let participants = self.uow.messages().participants(thread.id).await?;
        let messages = self.uow.messages().messages(thread.id).await?;
        Ok(ThreadDetail {
            thread,
            participant_ids: participants.into_iter().map(|p| p.user_id).collect(),
            messages,
        })
    }
}

fn clean_body(body: &str) -> AppResult<String> {
    let body = body.trim();
    if body.is_empty() {
        return Err(AppError::validation("Message cannot be empty"));
    }
    Ok(body.to_string())
}

/// Notify every other participant about a new message
async fn notify_participants(
    ctx: &TransactionContext<'_>,
    message: &Message,
    recipients: &[Uuid],
) -> AppResult<()> {
    let preview: String = message.body.chars().take(120).collect();
    for recipient in recipients.iter().filter(|id| **id != message.sender_id) {
        ctx.notifications()
            .create(
                NewNotification::new(*recipient, NotificationKind::NewMessage, "New message", preview.clone())
                    .with_link(format!("/messages/{}", message.thread_id)),
            )
            .await?;
    }
    Ok(())
}

#[async_trait]
impl<U: UnitOfWork> MessageService for MessageManager<U> {
    async fn start_conversation(&self, conversation: NewConversation) -> AppResult<ThreadDetail> {
        if conversation.recipient_id == conversation.sender_id {
            return Err(AppError::validation("You cannot message yourself"));
        }
        let body = clean_body(&conversation.body)?;
        self.uow
            .users()
            .find_by_id(conversation.recipient_id)
            .await?
            .ok_or(AppError::NotFound)?;

        let thread = self
            .uow
            .transaction(move |ctx| {
                Box::pin(async move {
                    let NewConversation {
                        sender_id,
                        recipient_id,
                        listing_id,
                        booking_id,
                        subject,
                        ..
                    } = conversation;

                    let thread = match ctx
                        .messages()
                        .find_direct_thread(sender_id, recipient_id, listing_id)
                        .await?
                    {
                        Some(thread) => thread,
                        None => {
                            ctx.messages()
                                .create_thread(listing_id, booking_id, subject, vec![sender_id, recipient_id])
                                .await?
                        }
                    };

                    let message = ctx.messages().append(thread.id, sender_id, body).await?;
                    notify_participants(&ctx, &message, &[recipient_id]).await?;
                    Ok(thread)
                })
            })
            .await?;

        self.detail(thread).await
    }

    async fn threads(&self, user_id: Uuid) -> AppResult<Vec<ThreadSummary>> {
        self.uow.messages().summaries_for_user(user_id).await
    }

    async fn thread(&self, user_id: Uuid, thread_id: Uuid) -> AppResult<ThreadDetail> {
        let thread = self
            .uow
            .messages()
            .find_thread(thread_id)
            .await?
            .ok_or(AppError::NotFound)?;
        if !self.uow.messages().is_participant(thread_id, user_id).await? {
            return Err(AppError::NotFound);
        }

        self.uow
            .messages()
            .mark_read(thread_id, user_id, Utc::now())
            .await?;
        self.detail(thread).await
    }

    async fn send(&self, user_id: Uuid, thread_id: Uuid, body: String) -> AppResult<Message> {
        let body = clean_body(&body)?;
        self.uow
            .messages()
            .find_thread(thread_id)
            .await?
            .ok_or(AppError::NotFound)?;

        let participants = self.uow.messages().participants(thread_id).await?;
        if !participants.iter().any(|p| p.user_id == user_id) {
            return Err(AppError::NotFound);
        }
        let recipients: Vec<Uuid> = participants.into_iter().map(|p| p.user_id).collect();

        self.uow
            .transaction(move |ctx| {
                Box::pin(async move {
                    let message = ctx.messages().append(thread_id, user_id, body).await?;
                    notify_participants(&ctx, &message, &recipients).await?;
                    Ok(message)
                })
            })
            .await
    }
}
