//! SQL backups through `pg_dump`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;
use tokio::process::Command;
use utoipa::ToSchema;

use crate::config::BACKUP_FILE_PREFIX;
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// A backup file on disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct BackupFile {
    #[schema(example = "stayhub-backup-20260101T020000Z.sql")]
    pub file_name: String,
    pub size_bytes: u64,
    pub created_at: DateTime<Utc>,
}

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait BackupStorage: Send + Sync {
    /// Dump the database into a new file
    async fn create(&self) -> AppResult<BackupFile>;

    /// Existing backups, newest first
    async fn list(&self) -> AppResult<Vec<BackupFile>>;
}

/// Writes plain-SQL dumps into a directory.
pub struct PgDumpBackups {
    database_url: String,
    dir: PathBuf,
}

impl PgDumpBackups {
    pub fn new(database_url: String, dir: PathBuf) -> Self {
        Self { database_url, dir }
    }
}

pub(crate) fn backup_file_name(at: DateTime<Utc>) -> String {
    format!("{}{}.sql", BACKUP_FILE_PREFIX, at.format("%Y%m%dT%H%M%SZ"))
}

async fn describe(path: &std::path::Path) -> AppResult<BackupFile> {
    let metadata = tokio::fs::metadata(path).await?;
    let created_at = metadata
        .modified()
        .map(DateTime::<Utc>::from)
        .unwrap_or_else(|_| Utc::now());

    Ok(BackupFile {
        file_name: path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
        size_bytes: metadata.len(),
        created_at,
    })
}

#[async_trait]
impl BackupStorage for PgDumpBackups {
    async fn create(&self) -> AppResult<BackupFile> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(backup_file_name(Utc::now()));

        tracing::info!(path = %path.display(), "Starting database backup");

        let output = Command::new("pg_dump")
            .arg("--no-owner")
            .arg("--format=plain")
            .arg("--file")
            .arg(&path)
            .arg("--dbname")
            .arg(&self.database_url)
            .output()
            .await
            .map_err(|e| AppError::internal(format!("Failed to run pg_dump: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::error!(status = %output.status, stderr = %stderr.trim(), "pg_dump failed");
            // Leave no truncated dump behind
            let _ = tokio::fs::remove_file(&path).await;
            return Err(AppError::internal("Database backup failed"));
        }

        let file = describe(&path).await?;
        tracing::info!(file = %file.file_name, size = file.size_bytes, "Database backup written");
        Ok(file)
    }

    async fn list(&self) -> AppResult<Vec<BackupFile>> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if name.starts_with(BACKUP_FILE_PREFIX) && name.ends_with(".sql") {
                files.push(describe(&entry.path()).await?);
            }
        }

        files.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_backup_file_name_is_sortable_timestamp() {
        let at = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(backup_file_name(at), "stayhub-backup-20260102T030405Z.sql");
    }

    #[tokio::test]
    async fn test_list_of_missing_directory_is_empty() {
        let store = PgDumpBackups::new(
            "postgres://localhost/none".to_string(),
            std::env::temp_dir().join(format!("stayhub-missing-{}", uuid::Uuid::new_v4())),
        );
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_ignores_foreign_files() {
        let dir = std::env::temp_dir().join(format!("stayhub-backups-{}", uuid::Uuid::new_v4()));
        tokio::fs::create_dir_all(&dir).await.unwrap();
        tokio::fs::write(dir.join("stayhub-backup-20260101T000000Z.sql"), b"-- dump")
            .await
            .unwrap();
        tokio::fs::write(dir.join("notes.txt"), b"hello").await.unwrap();

        let store = PgDumpBackups::new("postgres://localhost/none".to_string(), dir.clone());
        let files = store.list().await.unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].size_bytes, 7);

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }
}
