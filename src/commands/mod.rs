//! Commands module - CLI command implementations.

pub mod backup;
pub mod jobs;
pub mod migrate;
pub mod promote;
pub mod serve;
