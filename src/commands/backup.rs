//! Backup command - database dumps from the command line.

use crate::cli::args::{BackupAction, BackupArgs};
use crate::config::Config;
use crate::errors::AppResult;
use crate::infra::{BackupStorage, PgDumpBackups};

/// Execute the backup command
pub async fn execute(args: BackupArgs, config: Config) -> AppResult<()> {
    let storage = PgDumpBackups::new(config.database_url.clone(), config.backup_dir.clone());

    match args.action {
        BackupAction::Create => {
            tracing::info!(dir = %config.backup_dir.display(), "Creating backup...");
            let backup = storage.create().await?;
            println!("{} ({} bytes)", backup.file_name, backup.size_bytes);
        }
        BackupAction::List => {
            let backups = storage.list().await?;
            if backups.is_empty() {
                println!("No backups in {}", config.backup_dir.display());
            }
            for backup in backups {
                println!(
                    "{}  {:>12} bytes  {}",
                    backup.created_at.format("%Y-%m-%d %H:%M:%S"),
                    backup.size_bytes,
                    backup.file_name
                );
            }
        }
    }

    Ok(())
}
