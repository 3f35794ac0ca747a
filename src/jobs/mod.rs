//! Background jobs backed by apalis and PostgreSQL.

mod email_job;

use apalis::prelude::Storage;
use apalis_sql::postgres::PostgresStorage;
use apalis_sql::Config as StorageConfig;
use async_trait::async_trait;

use crate::config::JOB_NAME_EMAIL;
use crate::errors::{AppError, AppResult};

pub use email_job::{dispatch_quietly, email_job_handler, EmailDispatcher, EmailJob};

#[cfg(any(test, feature = "test-utils"))]
pub use email_job::MockEmailDispatcher;

/// Email storage under the email job namespace
pub fn email_storage(pool: apalis_sql::sqlx::PgPool) -> PostgresStorage<EmailJob> {
    PostgresStorage::new_with_config(pool, StorageConfig::new(JOB_NAME_EMAIL))
}

/// [`EmailDispatcher`] that pushes onto the apalis queue.
#[derive(Clone)]
pub struct EmailQueue {
    storage: PostgresStorage<EmailJob>,
}

impl EmailQueue {
    pub fn new(storage: PostgresStorage<EmailJob>) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl EmailDispatcher for EmailQueue {
    async fn dispatch(&self, job: EmailJob) -> AppResult<()> {
        let mut storage = self.storage.clone();
        storage
            .push(job)
            .await
            .map_err(|e| AppError::internal(format!("Failed to enqueue email: {}", e)))?;
        Ok(())
    }
}
