//! Migration: listings, bookings, favorites and reviews.

use sea_orm_migration::prelude::*;

use super::m20240101_000001_create_users_table::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

fn timestamp(column: impl IntoIden) -> ColumnDef {
    ColumnDef::new(column)
        .timestamp_with_time_zone()
        .not_null()
        .default(Expr::current_timestamp())
        .to_owned()
}

fn user_fk(name: &str, table: impl IntoIden + 'static, column: impl IntoIden + 'static) -> ForeignKeyCreateStatement {
    ForeignKey::create()
        .name(name)
        .from(table, column)
        .to(Users::Table, Users::Id)
        .on_delete(ForeignKeyAction::Cascade)
        .to_owned()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Listings::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Listings::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Listings::HostId).uuid().not_null())
                    .col(ColumnDef::new(Listings::Title).string().not_null())
                    .col(ColumnDef::new(Listings::Description).text().not_null())
                    .col(ColumnDef::new(Listings::PropertyType).string().not_null())
                    .col(ColumnDef::new(Listings::Address).string().not_null())
                    .col(ColumnDef::new(Listings::City).string().not_null())
                    .col(ColumnDef::new(Listings::Country).string().not_null())
                    .col(ColumnDef::new(Listings::Latitude).double().null())
                    .col(ColumnDef::new(Listings::Longitude).double().null())
                    .col(ColumnDef::new(Listings::NightlyPriceCents).big_integer().not_null())
                    .col(
                        ColumnDef::new(Listings::CleaningFeeCents)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Listings::MaxGuests).integer().not_null())
                    .col(ColumnDef::new(Listings::Bedrooms).integer().not_null().default(0))
                    .col(ColumnDef::new(Listings::Bathrooms).integer().not_null().default(0))
                    .col(ColumnDef::new(Listings::Amenities).json_binary().not_null())
                    .col(ColumnDef::new(Listings::ImageUrls).json_binary().not_null())
                    .col(
                        ColumnDef::new(Listings::IsPublished)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(&mut timestamp(Listings::CreatedAt))
                    .col(&mut timestamp(Listings::UpdatedAt))
                    .col(ColumnDef::new(Listings::DeletedAt).timestamp_with_time_zone().null())
                    .check(Expr::col(Listings::NightlyPriceCents).gt(0))
                    .check(Expr::col(Listings::MaxGuests).gt(0))
                    .foreign_key(&mut user_fk("fk_listings_host", Listings::Table, Listings::HostId))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_listings_host_id")
                    .table(Listings::Table)
                    .col(Listings::HostId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Bookings::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Bookings::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Bookings::ListingId).uuid().not_null())
                    .col(ColumnDef::new(Bookings::GuestId).uuid().not_null())
                    .col(ColumnDef::new(Bookings::HostId).uuid().not_null())
                    .col(ColumnDef::new(Bookings::CheckIn).date().not_null())
                    .col(ColumnDef::new(Bookings::CheckOut).date().not_null())
                    .col(ColumnDef::new(Bookings::Guests).integer().not_null())
                    .col(ColumnDef::new(Bookings::NightlyPriceCents).big_integer().not_null())
                    .col(ColumnDef::new(Bookings::CleaningFeeCents).big_integer().not_null())
                    .col(ColumnDef::new(Bookings::TotalCents).big_integer().not_null())
                    .col(ColumnDef::new(Bookings::Status).string().not_null())
                    .col(ColumnDef::new(Bookings::RefundCents).big_integer().null())
                    .col(ColumnDef::new(Bookings::CancelledBy).uuid().null())
                    .col(
                        ColumnDef::new(Bookings::CancelledAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(&mut timestamp(Bookings::CreatedAt))
                    .col(&mut timestamp(Bookings::UpdatedAt))
                    .check(Expr::col(Bookings::CheckOut).gt(Expr::col(Bookings::CheckIn)))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_bookings_listing")
                            .from(Bookings::Table, Bookings::ListingId)
                            .to(Listings::Table, Listings::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(&mut user_fk("fk_bookings_guest", Bookings::Table, Bookings::GuestId))
                    .foreign_key(&mut user_fk("fk_bookings_host", Bookings::Table, Bookings::HostId))
                    .to_owned(),
            )
            .await?;

        // Overlap checks scan a listing's stays
        manager
            .create_index(
                Index::create()
                    .name("idx_bookings_listing_dates")
                    .table(Bookings::Table)
                    .col(Bookings::ListingId)
                    .col(Bookings::CheckIn)
                    .col(Bookings::CheckOut)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_bookings_guest_id")
                    .table(Bookings::Table)
                    .col(Bookings::GuestId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_bookings_host_id")
                    .table(Bookings::Table)
                    .col(Bookings::HostId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Favorites::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Favorites::UserId).uuid().not_null())
                    .col(ColumnDef::new(Favorites::ListingId).uuid().not_null())
                    .col(&mut timestamp(Favorites::CreatedAt))
                    .primary_key(
                        Index::create()
                            .col(Favorites::UserId)
                            .col(Favorites::ListingId),
                    )
                    .foreign_key(&mut user_fk("fk_favorites_user", Favorites::Table, Favorites::UserId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_favorites_listing")
                            .from(Favorites::Table, Favorites::ListingId)
                            .to(Listings::Table, Listings::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Reviews::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Reviews::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Reviews::ListingId).uuid().not_null())
                    .col(ColumnDef::new(Reviews::BookingId).uuid().not_null().unique_key())
                    .col(ColumnDef::new(Reviews::AuthorId).uuid().not_null())
                    .col(ColumnDef::new(Reviews::Rating).integer().not_null())
                    .col(ColumnDef::new(Reviews::Comment).text().not_null())
                    .col(&mut timestamp(Reviews::CreatedAt))
                    .check(Expr::col(Reviews::Rating).between(1, 5))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_reviews_listing")
                            .from(Reviews::Table, Reviews::ListingId)
                            .to(Listings::Table, Listings::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_reviews_booking")
                            .from(Reviews::Table, Reviews::BookingId)
                            .to(Bookings::Table, Bookings::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(&mut user_fk("fk_reviews_author", Reviews::Table, Reviews::AuthorId))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_reviews_listing_id")
                    .table(Reviews::Table)
                    .col(Reviews::ListingId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for table in [
            Reviews::Table.into_iden(),
            Favorites::Table.into_iden(),
            Bookings::Table.into_iden(),
            Listings::Table.into_iden(),
        ] {
            manager
                .drop_table(Table::drop().table(table).to_owned())
                .await?;
        }
        Ok(())
    }
}

#[derive(Iden)]
enum Listings {
    Table,
    Id,
    HostId,
    Title,
    Description,
    PropertyType,
    Address,
    City,
    Country,
    Latitude,
    Longitude,
    NightlyPriceCents,
    CleaningFeeCents,
    MaxGuests,
    Bedrooms,
    Bathrooms,
    Amenities,
    ImageUrls,
    IsPublished,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}

#[derive(Iden)]
enum Bookings {
    Table,
    Id,
    ListingId,
    GuestId,
    HostId,
    CheckIn,
    CheckOut,
    Guests,
    NightlyPriceCents,
    CleaningFeeCents,
    TotalCents,
    Status,
    RefundCents,
    CancelledBy,
    CancelledAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Favorites {
    Table,
    UserId,
    ListingId,
    CreatedAt,
}

#[derive(Iden)]
enum Reviews {
    Table,
    Id,
    ListingId,
    BookingId,
    AuthorId,
    Rating,
    Comment,
    CreatedAt,
}
