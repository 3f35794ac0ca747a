//! Database migrations.
//!
//! Each migration is a separate module following SeaORM conventions.
//! Migration names follow the pattern: m{YYYYMMDD}_{NNNNNN}_{description}

use sea_orm_migration::prelude::*;

mod m20240101_000001_create_users_table;
mod m20240102_000001_create_listings_and_bookings;
mod m20240103_000001_create_messaging;
mod m20240104_000001_create_host_requests_and_admin_logs;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_users_table::Migration),
            Box::new(m20240102_000001_create_listings_and_bookings::Migration),
            Box::new(m20240103_000001_create_messaging::Migration),
            Box::new(m20240104_000001_create_host_requests_and_admin_logs::Migration),
        ]
    }
}
