//! Infrastructure layer - External systems integration
//!
//! This module handles all external system concerns:
//! - Database connections, migrations and repositories
//! - Caching and rate-limit counters (Redis)
//! - SQL backups
//! - Unit of Work for transaction management

pub mod backup;
pub mod cache;
pub mod db;
pub mod repositories;
pub mod unit_of_work;

pub use backup::{BackupFile, BackupStorage, PgDumpBackups};
pub use cache::{Cache, CacheStore};
pub use db::{Database, Migrator};
pub use repositories::*;
pub use unit_of_work::{Persistence, Repositories, TransactionContext, TxFuture, UnitOfWork};

#[cfg(any(test, feature = "test-utils"))]
pub use backup::MockBackupStorage;
#[cfg(any(test, feature = "test-utils"))]
pub use cache::MockCacheStore;
#[cfg(any(test, feature = "test-utils"))]
pub use unit_of_work::MockPersistence;
