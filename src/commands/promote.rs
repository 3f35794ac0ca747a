//! Promote command - grant admin access to an account.
//!
//! The only way to create the first admin; later admins can be
//! promoted from the admin console.

use crate::cli::args::PromoteArgs;
use crate::config::Config;
use crate::domain::PrivilegeUpdate;
use crate::errors::{AppError, AppResult};
use crate::infra::{Database, UserRepository, UserStore};

/// Execute the promote command
pub async fn execute(args: PromoteArgs, config: Config) -> AppResult<()> {
    let db = Database::connect_without_migrations(&config)
        .await
        .map_err(|e| AppError::internal(format!("Database connection failed: {}", e)))?;
    let users = UserStore::new(db.get_connection());

    let user = users
        .find_by_email(&args.email)
        .await?
        .ok_or_else(|| AppError::validation(format!("No active account for {}", args.email)))?;

    if user.is_admin {
        println!("{} is already an admin", user.email);
        return Ok(());
    }

    let update = PrivilegeUpdate {
        is_admin: Some(true),
        is_host: None,
    };
    users.set_privileges(user.id, update).await?;

    tracing::info!(user_id = %user.id, "User promoted to admin");
    println!("{} is now an admin", user.email);
    Ok(())
}
