//! CLI argument definitions.

use clap::{Parser, Subcommand};

/// StayHub - vacation rental marketplace API
#[derive(Parser, Debug)]
#[command(name = "stayhub")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP server
    Serve(ServeArgs),

    /// Run database migrations
    Migrate(MigrateArgs),

    /// Manage background jobs
    Jobs(JobsArgs),

    /// Create or list database backups
    Backup(BackupArgs),

    /// Grant admin access to an existing account
    Promote(PromoteArgs),
}

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Host to bind to (overrides SERVER_HOST)
    #[arg(short = 'H', long)]
    pub host: Option<String>,

    /// Port to listen on (overrides SERVER_PORT)
    #[arg(short, long)]
    pub port: Option<u16>,
}

/// Arguments for the migrate command
#[derive(Parser, Debug)]
pub struct MigrateArgs {
    #[command(subcommand)]
    pub action: MigrateAction,
}

/// Migration actions
#[derive(Subcommand, Debug)]
pub enum MigrateAction {
    /// Run pending migrations
    Up,
    /// Rollback last migration
    Down,
    /// Show migration status
    Status,
    /// Reset and re-run all migrations
    Fresh,
}

/// Arguments for the jobs command
#[derive(Parser, Debug)]
pub struct JobsArgs {
    #[command(subcommand)]
    pub action: JobsAction,
}

/// Job management actions
#[derive(Subcommand, Debug)]
pub enum JobsAction {
    /// Start the email worker
    Work,
    /// Show email queue counts by status
    List,
    /// Remove failed email jobs
    Clear,
}

#[derive(Parser, Debug)]
pub struct BackupArgs {
    #[command(subcommand)]
    pub action: BackupAction,
}

#[derive(Subcommand, Debug)]
pub enum BackupAction {
    /// Dump the database into the backup directory
    Create,
    /// List backup files, newest first
    List,
}

#[derive(Parser, Debug)]
pub struct PromoteArgs {
    /// Email of the account to promote
    pub email: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_serve_with_port() {
        let cli = Cli::try_parse_from(["stayhub", "serve", "--port", "8080"]).unwrap();
        match cli.command {
            Commands::Serve(args) => assert_eq!(args.port, Some(8080)),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_promote() {
        let cli = Cli::try_parse_from(["stayhub", "-v", "promote", "admin@example.com"]).unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Promote(args) => assert_eq!(args.email, "admin@example.com"),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_backup_list() {
        let cli = Cli::try_parse_from(["stayhub", "backup", "list"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Backup(BackupArgs {
                action: BackupAction::List
            })
        ));
    }
}
