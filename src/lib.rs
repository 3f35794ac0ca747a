//! StayHub - vacation rental marketplace API
//!
//! Guests search and book listings, hosts manage their properties and
//! bookings, users message each other and review finished stays, and
//! admins moderate accounts, approve hosts and watch platform analytics.
//!
//! # Architecture Layers
//!
//! - **cli**: Command-line interface
//! - **commands**: CLI command implementations
//! - **config**: Application configuration and constants
//! - **domain**: Entities and pure business rules (pricing, refunds, analytics)
//! - **services**: Use cases on top of the Unit of Work
//! - **infra**: Database, Redis, backups and repositories
//! - **jobs**: Email queue (apalis)
//! - **api**: HTTP handlers, middleware, and routes
//! - **types**: Shared types (pagination, responses)
//! - **errors**: Centralized error handling
//!
//! # CLI Usage
//!
//! ```bash
//! # Start the server
//! stayhub serve
//!
//! # Run migrations
//! stayhub migrate up
//!
//! # Make the first admin
//! stayhub promote admin@example.com
//! ```

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod jobs;
pub mod services;
pub mod types;

// Re-export commonly used types at crate root
pub use api::AppState;
pub use config::Config;
pub use domain::{Password, User};
pub use errors::{AppError, AppResult};
pub use infra::Cache;
