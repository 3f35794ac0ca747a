//! Jobs command - email queue worker and maintenance.
//!
//! ```bash
//! stayhub jobs work    # process queued emails
//! stayhub jobs list    # queue counts by status
//! stayhub jobs clear   # drop failed emails
//! ```

use apalis::prelude::*;
use apalis_sql::postgres::PostgresStorage;
use apalis_sql::sqlx::postgres::PgPoolOptions;
use sea_orm::{ConnectionTrait, DatabaseBackend, DatabaseConnection, Statement};

use crate::cli::args::{JobsAction, JobsArgs};
use crate::config::{Config, JOB_NAME_EMAIL};
use crate::errors::{AppError, AppResult};
use crate::infra::Database;
use crate::jobs::{email_job_handler, email_storage};

/// Execute the jobs command
pub async fn execute(args: JobsArgs, config: Config) -> AppResult<()> {
    match args.action {
        JobsAction::Work => run_worker(&config).await,
        JobsAction::List => list_jobs(&config).await,
        JobsAction::Clear => clear_failed_jobs(&config).await,
    }
}

/// Process queued emails until Ctrl+C
async fn run_worker(config: &Config) -> AppResult<()> {
    tracing::info!("Connecting to database for job worker...");

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await
        .map_err(|e| AppError::internal(format!("Failed to connect to database: {}", e)))?;

    PostgresStorage::setup(&pool)
        .await
        .map_err(|e| AppError::internal(format!("Failed to setup job storage: {}", e)))?;

    let worker = WorkerBuilder::new("stayhub-email-worker")
        .backend(email_storage(pool))
        .build_fn(email_job_handler);

    tracing::info!("Email worker started. Press Ctrl+C to stop.");

    let monitor = Monitor::new().register(worker);

    tokio::select! {
        result = monitor.run() => {
            if let Err(e) = result {
                tracing::error!("Worker error: {}", e);
                return Err(AppError::internal(format!("Worker failed: {}", e)));
            }
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Received shutdown signal, stopping worker...");
        }
    }

    tracing::info!("Email worker stopped.");
    Ok(())
}

async fn connect(config: &Config) -> AppResult<DatabaseConnection> {
    let db = Database::connect_without_migrations(config)
        .await
        .map_err(|e| AppError::internal(format!("Failed to connect to database: {}", e)))?;
    Ok(db.get_connection())
}

/// The apalis schema only exists once a worker or server has started
async fn queue_exists(db: &DatabaseConnection) -> AppResult<bool> {
    let row = db
        .query_one(Statement::from_string(
            DatabaseBackend::Postgres,
            "SELECT EXISTS(SELECT 1 FROM information_schema.schemata WHERE schema_name = 'apalis') AS exists",
        ))
        .await?;

    Ok(row
        .and_then(|r| r.try_get::<bool>("", "exists").ok())
        .unwrap_or(false))
}

/// Show email job counts by status
async fn list_jobs(config: &Config) -> AppResult<()> {
    let db = connect(config).await?;

    if !queue_exists(&db).await? {
        println!("Job queue not initialized. Run 'stayhub jobs work' or 'stayhub serve' first.");
        return Ok(());
    }

    let rows = db
        .query_all(Statement::from_sql_and_values(
            DatabaseBackend::Postgres,
            "SELECT status::text AS status, COUNT(*)::bigint AS count \
             FROM apalis.jobs WHERE job_type = $1 GROUP BY status ORDER BY status",
            [JOB_NAME_EMAIL.into()],
        ))
        .await?;

    println!("\n=== Email queue ===");
    if rows.is_empty() {
        println!("(empty)");
    }
    for row in rows {
        if let (Ok(status), Ok(count)) = (
            row.try_get::<String>("", "status"),
            row.try_get::<i64>("", "count"),
        ) {
            println!("{:<10} {}", format!("{}:", status), count);
        }
    }
    println!("===================\n");

    Ok(())
}

/// Delete failed email jobs
async fn clear_failed_jobs(config: &Config) -> AppResult<()> {
    let db = connect(config).await?;

    if !queue_exists(&db).await? {
        println!("Job queue not initialized. Nothing to clear.");
        return Ok(());
    }

    let result = db
        .execute(Statement::from_sql_and_values(
            DatabaseBackend::Postgres,
            "DELETE FROM apalis.jobs WHERE job_type = $1 AND status = 'Failed'",
            [JOB_NAME_EMAIL.into()],
        ))
        .await?;

    println!("Cleared {} failed email job(s).", result.rows_affected());
    Ok(())
}
