//! Migration: host requests and the admin audit log.

use sea_orm_migration::prelude::*;

use super::m20240101_000001_create_users_table::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(HostRequests::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(HostRequests::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(HostRequests::UserId).uuid().not_null())
                    .col(ColumnDef::new(HostRequests::Status).string().not_null())
                    .col(ColumnDef::new(HostRequests::Message).text().not_null())
                    .col(ColumnDef::new(HostRequests::ReviewedBy).uuid().null())
                    .col(
                        ColumnDef::new(HostRequests::ReviewedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(ColumnDef::new(HostRequests::RejectionReason).text().null())
                    .col(
                        ColumnDef::new(HostRequests::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_host_requests_user")
                            .from(HostRequests::Table, HostRequests::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // At most one pending request per user
        manager
            .get_connection()
            .execute_unprepared(
                "CREATE UNIQUE INDEX IF NOT EXISTS idx_host_requests_one_pending \
                 ON host_requests (user_id) WHERE status = 'pending'",
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AdminLogs::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(AdminLogs::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(AdminLogs::AdminId).uuid().not_null())
                    .col(ColumnDef::new(AdminLogs::Action).string().not_null())
                    .col(ColumnDef::new(AdminLogs::TargetType).string().not_null())
                    .col(ColumnDef::new(AdminLogs::TargetId).uuid().null())
                    .col(ColumnDef::new(AdminLogs::Details).json_binary().not_null())
                    .col(
                        ColumnDef::new(AdminLogs::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_admin_logs_admin")
                            .from(AdminLogs::Table, AdminLogs::AdminId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_admin_logs_created_at")
                    .table(AdminLogs::Table)
                    .col(AdminLogs::CreatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AdminLogs::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(HostRequests::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum HostRequests {
    Table,
    Id,
    UserId,
    Status,
    Message,
    ReviewedBy,
    ReviewedAt,
    RejectionReason,
    CreatedAt,
}

#[derive(Iden)]
enum AdminLogs {
    Table,
    Id,
    AdminId,
    Action,
    TargetType,
    TargetId,
    Details,
    CreatedAt,
}
