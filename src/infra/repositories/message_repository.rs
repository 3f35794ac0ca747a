//! Message threads, participants and messages.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::future::try_join_all;
use sea_orm::sea_query::Query;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use super::base::DbHandle;
use super::entities::message::{self, Entity as MessageEntity};
use super::entities::message_thread::{self, Entity as ThreadEntity};
use super::entities::thread_participant::{self, Entity as ParticipantEntity};
use crate::domain::{Message, MessageThread, Participant, ThreadSummary};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait MessageRepository: Send + Sync {
    async fn find_thread(&self, id: Uuid) -> AppResult<Option<MessageThread>>;

    /// Existing thread shared by exactly these two users about the same listing
    async fn find_direct_thread(
        &self,
        first: Uuid,
        second: Uuid,
        listing_id: Option<Uuid>,
    ) -> AppResult<Option<MessageThread>>;

    async fn create_thread(
        &self,
        listing_id: Option<Uuid>,
        booking_id: Option<Uuid>,
        subject: Option<String>,
        participant_ids: Vec<Uuid>,
    ) -> AppResult<MessageThread>;

    async fn participants(&self, thread_id: Uuid) -> AppResult<Vec<Participant>>;

    async fn is_participant(&self, thread_id: Uuid, user_id: Uuid) -> AppResult<bool>;

    /// Append a message and bump the thread's activity timestamp
    async fn append(&self, thread_id: Uuid, sender_id: Uuid, body: String) -> AppResult<Message>;

    /// Messages of a thread, oldest first
    async fn messages(&self, thread_id: Uuid) -> AppResult<Vec<Message>>;

    /// Threads of a user, most recently active first
    async fn summaries_for_user(&self, user_id: Uuid) -> AppResult<Vec<ThreadSummary>>;

    async fn mark_read(&self, thread_id: Uuid, user_id: Uuid, at: DateTime<Utc>) -> AppResult<()>;
}

pub struct MessageStore<H = DatabaseConnection> {
    db: H,
}

impl<H: DbHandle> MessageStore<H> {
    pub fn new(db: H) -> Self {
        Self { db }
    }

    async fn unread_count(&self, thread_id: Uuid, reader: &Participant) -> AppResult<u64> {
        let mut query = MessageEntity::find()
            .filter(message::Column::ThreadId.eq(thread_id))
            .filter(message::Column::SenderId.ne(reader.user_id));
        if let Some(last_read_at) = reader.last_read_at {
            query = query.filter(message::Column::CreatedAt.gt(last_read_at));
        }
        Ok(query.count(self.db.conn()).await?)
    }

    async fn summary(&self, thread: message_thread::Model, user_id: Uuid) -> AppResult<ThreadSummary> {
        let participants = self.participants(thread.id).await?;
        let last_message = MessageEntity::find()
            .filter(message::Column::ThreadId.eq(thread.id))
            .order_by_desc(message::Column::CreatedAt)
            .one(self.db.conn())
            .await?
            .map(Message::from);
        let unread_count = match participants.iter().find(|p| p.user_id == user_id) {
            Some(reader) => self.unread_count(thread.id, reader).await?,
            None => 0,
        };

        Ok(ThreadSummary {
            participant_ids: participants.iter().map(|p| p.user_id).collect(),
            thread: MessageThread::from(thread),
            last_message,
            unread_count,
        })
    }
}

fn threads_of(user_id: Uuid) -> sea_orm::sea_query::SelectStatement {
    Query::select()
        .column(thread_participant::Column::ThreadId)
        .from(thread_participant::Entity)
        .and_where(thread_participant::Column::UserId.eq(user_id))
        .to_owned()
}

#[async_trait]
impl<H: DbHandle> MessageRepository for MessageStore<H> {
    async fn find_thread(&self, id: Uuid) -> AppResult<Option<MessageThread>> {
        let model = ThreadEntity::find_by_id(id).one(self.db.conn()).await?;
        Ok(model.map(MessageThread::from))
    }

    async fn find_direct_thread(
        &self,
        first: Uuid,
        second: Uuid,
        listing_id: Option<Uuid>,
    ) -> AppResult<Option<MessageThread>> {
        let listing_condition = match listing_id {
            Some(id) => Condition::all().add(message_thread::Column::ListingId.eq(id)),
            None => Condition::all().add(message_thread::Column::ListingId.is_null()),
        };

        let candidates = ThreadEntity::find()
            .filter(message_thread::Column::Id.in_subquery(threads_of(first)))
            .filter(message_thread::Column::Id.in_subquery(threads_of(second)))
            .filter(listing_condition)
            .order_by_desc(message_thread::Column::UpdatedAt)
            .all(self.db.conn())
            .await?;

        for thread in candidates {
            let members = ParticipantEntity::find()
                .filter(thread_participant::Column::ThreadId.eq(thread.id))
                .count(self.db.conn())
                .await?;
            if members == 2 {
                return Ok(Some(MessageThread::from(thread)));
            }
        }
        Ok(None)
    }

    async fn create_thread(
        &self,
        listing_id: Option<Uuid>,
        booking_id: Option<Uuid>,
        subject: Option<String>,
        participant_ids: Vec<Uuid>,
    ) -> AppResult<MessageThread> {
        let now = Utc::now();
        let thread = message_thread::ActiveModel {
            id: Set(Uuid::new_v4()),
            listing_id: Set(listing_id),
            booking_id: Set(booking_id),
            subject: Set(subject),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(self.db.conn())
        .await?;

        let members: Vec<thread_participant::ActiveModel> = participant_ids
            .into_iter()
            .map(|user_id| thread_participant::ActiveModel {
                thread_id: Set(thread.id),
                user_id: Set(user_id),
                last_read_at: Set(None),
            })
            .collect();
        ParticipantEntity::insert_many(members)
            .exec(self.db.conn())
            .await?;

        Ok(MessageThread::from(thread))
    }

    async fn participants(&self, thread_id: Uuid) -> AppResult<Vec<Participant>> {
        let models = ParticipantEntity::find()
            .filter(thread_participant::Column::ThreadId.eq(thread_id))
            .all(self.db.conn())
            .await?;
        Ok(models.into_iter().map(Participant::from).collect())
    }

    async fn is_participant(&self, thread_id: Uuid, user_id: Uuid) -> AppResult<bool> {
        let found = ParticipantEntity::find_by_id((thread_id, user_id))
            .one(self.db.conn())
            .await?;
        Ok(found.is_some())
    }

    async fn append(&self, thread_id: Uuid, sender_id: Uuid, body: String) -> AppResult<Message> {
        let now = Utc::now();
        let model = message::ActiveModel {
            id: Set(Uuid::new_v4()),
            thread_id: Set(thread_id),
            sender_id: Set(sender_id),
            body: Set(body),
            created_at: Set(now),
        }
        .insert(self.db.conn())
        .await?;

        let thread = ThreadEntity::find_by_id(thread_id)
            .one(self.db.conn())
            .await?
            .ok_or(AppError::NotFound)?;
        let mut thread: message_thread::ActiveModel = thread.into();
        thread.updated_at = Set(now);
        thread.update(self.db.conn()).await?;

        // Sending implies having read everything before it
        self.mark_read(thread_id, sender_id, now).await?;

        Ok(Message::from(model))
    }

    async fn messages(&self, thread_id: Uuid) -> AppResult<Vec<Message>> {
        let models = MessageEntity::find()
            .filter(message::Column::ThreadId.eq(thread_id))
            .order_by_asc(message::Column::CreatedAt)
            .all(self.db.conn())
            .await?;
        Ok(models.into_iter().map(Message::from).collect())
    }

    async fn summaries_for_user(&self, user_id: Uuid) -> AppResult<Vec<ThreadSummary>> {
        let threads = ThreadEntity::find()
            .filter(message_thread::Column::Id.in_subquery(threads_of(user_id)))
            .order_by_desc(message_thread::Column::UpdatedAt)
            .all(self.db.conn())
            .await?;

        try_join_all(threads.into_iter().map(|thread| self.summary(thread, user_id))).await
    }

    async fn mark_read(&self, thread_id: Uuid, user_id: Uuid, at: DateTime<Utc>) -> AppResult<()> {
        let member = ParticipantEntity::find_by_id((thread_id, user_id))
            .one(self.db.conn())
            .await?
            .ok_or(AppError::NotFound)?;

        let mut member: thread_participant::ActiveModel = member.into();
        member.last_read_at = Set(Some(at));
        member.update(self.db.conn()).await?;
        Ok(())
    }
}
