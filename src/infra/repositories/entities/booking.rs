//! Booking database entity for SeaORM.

use sea_orm::entity::prelude::*;

use crate::domain::{Booking, BookingStatus};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "bookings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub listing_id: Uuid,
    pub guest_id: Uuid,
    pub host_id: Uuid,
    pub check_in: Date,
    pub check_out: Date,
    pub guests: i32,
    pub nightly_price_cents: i64,
    pub cleaning_fee_cents: i64,
    pub total_cents: i64,
    pub status: String,
    pub refund_cents: Option<i64>,
    pub cancelled_by: Option<Uuid>,
    pub cancelled_at: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Booking {
    fn from(model: Model) -> Self {
        Booking {
            id: model.id,
            listing_id: model.listing_id,
            guest_id: model.guest_id,
            host_id: model.host_id,
            check_in: model.check_in,
            check_out: model.check_out,
            guests: model.guests,
            nightly_price_cents: model.nightly_price_cents,
            cleaning_fee_cents: model.cleaning_fee_cents,
            total_cents: model.total_cents,
            status: BookingStatus::from(model.status.as_str()),
            refund_cents: model.refund_cents,
            cancelled_by: model.cancelled_by,
            cancelled_at: model.cancelled_at,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
