//! Booking service - reservations, host decisions and cancellations.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use std::sync::Arc;
use uuid::Uuid;

use super::{today, Actor};
use crate::domain::booking::quote_stay;
use crate::domain::{
    refund_quote, Booking, BookingStatus, CancellationRecord, Listing, NewBooking,
    NewNotification, NotificationKind, RefundQuote,
};
use crate::errors::{AppError, AppResult};
use crate::infra::UnitOfWork;
use crate::jobs::{dispatch_quietly, EmailDispatcher, EmailJob};
use crate::types::{Paginated, PaginationParams};

/// A guest's reservation request
#[derive(Debug, Clone, PartialEq)]
pub struct BookingRequest {
    pub listing_id: Uuid,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guests: i32,
}

#[async_trait]
pub trait BookingService: Send + Sync {
    /// Reserve a listing; the booking starts out pending
    async fn create(&self, guest_id: Uuid, request: BookingRequest) -> AppResult<Booking>;

    async fn list_as_guest(
        &self,
        guest_id: Uuid,
        params: PaginationParams,
    ) -> AppResult<Paginated<Booking>>;

    async fn list_as_host(
        &self,
        host_id: Uuid,
        status: Option<BookingStatus>,
        params: PaginationParams,
    ) -> AppResult<Paginated<Booking>>;

    /// Guest, host or admin
    async fn get(&self, actor: Actor, id: Uuid) -> AppResult<Booking>;

    /// Host or admin: confirm, reject or complete
    async fn update_status(&self, actor: Actor, id: Uuid, status: BookingStatus)
        -> AppResult<Booking>;

    /// What cancelling now would refund the guest
    async fn refund_quote(&self, actor: Actor, id: Uuid) -> AppResult<RefundQuote>;

    /// Cancel as guest or host, recording the refund. Admins cannot cancel.
    async fn cancel(&self, actor: Actor, id: Uuid) -> AppResult<Booking>;
}

pub struct BookingManager<U: UnitOfWork> {
    uow: Arc<U>,
    mailer: Arc<dyn EmailDispatcher>,
}

impl<U: UnitOfWork> BookingManager<U> {
    pub fn new(uow: Arc<U>, mailer: Arc<dyn EmailDispatcher>) -> Self {
        Self { uow, mailer }
    }

    async fn find_visible(&self, actor: Actor, id: Uuid) -> AppResult<Booking> {
        let booking = self
            .uow
            .bookings()
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound)?;

        if !booking.is_visible_to(actor.id, actor.is_admin) {
            return Err(AppError::NotFound);
        }
        Ok(booking)
    }

    /// A cancellable booking of which the actor is the guest or the host
    async fn find_cancellable(&self, actor: Actor, id: Uuid) -> AppResult<Booking> {
        let booking = self.find_visible(actor, id).await?;
        if actor.id != booking.guest_id && actor.id != booking.host_id {
            return Err(AppError::Forbidden);
        }
        if !booking.status.can_transition_to(BookingStatus::Cancelled) {
            return Err(AppError::validation(format!(
                "A {} booking cannot be cancelled",
                booking.status
            )));
        }
        Ok(booking)
    }

    async fn listing_title(&self, listing_id: Uuid) -> String {
        match self.uow.listings().find_by_id(listing_id).await {
            Ok(Some(listing)) => listing.title,
            _ => "your stay".to_string(),
        }
    }

    /// Email a user about a booking, skipping accounts that are gone
    async fn email_user(&self, user_id: Uuid, build: impl FnOnce(&str, &str) -> EmailJob) {
        match self.uow.users().find_by_id(user_id).await {
            Ok(Some(user)) => dispatch_quietly(self.mailer.as_ref(), build(&user.email, &user.name)).await,
            Ok(None) => {}
            Err(e) => tracing::warn!(user_id = %user_id, error = %e, "Skipping booking email"),
        }
    }
}

fn validate_request(listing: &Listing, guest_id: Uuid, request: &BookingRequest) -> AppResult<()> {
    if listing.host_id == guest_id {
        return Err(AppError::validation("You cannot book your own listing"));
    }
    if request.check_in < today() {
        return Err(AppError::validation("Check-in cannot be in the past"));
    }
    if request.guests < 1 {
        return Err(AppError::validation("At least one guest is required"));
    }
    if request.guests > listing.max_guests {
        return Err(AppError::validation(format!(
            "This listing hosts at most {} guests",
            listing.max_guests
        )));
    }
    Ok(())
}

#[async_trait]
impl<U: UnitOfWork> BookingService for BookingManager<U> {
    async fn create(&self, guest_id: Uuid, request: BookingRequest) -> AppResult<Booking> {
        let listing = self
            .uow
            .listings()
            .find_by_id(request.listing_id)
            .await?
            .filter(Listing::is_bookable)
            .ok_or(AppError::NotFound)?;

        validate_request(&listing, guest_id, &request)?;
        let quote = quote_stay(
            request.check_in,
            request.check_out,
            listing.nightly_price_cents,
            listing.cleaning_fee_cents,
        )?;

        let new_booking = NewBooking {
            listing_id: listing.id,
            guest_id,
            host_id: listing.host_id,
            check_in: request.check_in,
            check_out: request.check_out,
            guests: request.guests,
            quote,
        };
        let title = listing.title.clone();

        let booking = self
            .uow
            .transaction_serializable(move |ctx| {
                Box::pin(async move {
                    if ctx
                        .bookings()
                        .has_overlap(new_booking.listing_id, new_booking.check_in, new_booking.check_out)
                        .await?
                    {
                        return Err(AppError::conflict("A booking for these dates"));
                    }

                    let booking = ctx.bookings().create(new_booking).await?;
                    ctx.notifications()
                        .create(
                            NewNotification::new(
                                booking.host_id,
                                NotificationKind::BookingRequested,
                                "New booking request",
                                format!(
                                    "{} from {} to {}",
                                    title, booking.check_in, booking.check_out
                                ),
                            )
                            .with_link(format!("/hosting/bookings/{}", booking.id)),
                        )
                        .await?;
                    Ok(booking)
                })
            })
            .await?;

        tracing::info!(
            booking_id = %booking.id,
            listing_id = %booking.listing_id,
            guest_id = %guest_id,
            "Booking requested"
        );

        let (check_in, check_out) = (booking.check_in, booking.check_out);
        self.email_user(booking.host_id, |email, name| {
            EmailJob::booking_requested(email, name, &listing.title, check_in, check_out)
        })
        .await;

        Ok(booking)
    }

    async fn list_as_guest(
        &self,
        guest_id: Uuid,
        params: PaginationParams,
    ) -> AppResult<Paginated<Booking>> {
        let (bookings, total) = self
            .uow
            .bookings()
            .list_for_guest(guest_id, params.clone())
            .await?;
        Ok(params.paginate(bookings, total))
    }

    async fn list_as_host(
        &self,
        host_id: Uuid,
        status: Option<BookingStatus>,
        params: PaginationParams,
    ) -> AppResult<Paginated<Booking>> {
        let (bookings, total) = self
            .uow
            .bookings()
            .list_for_host(host_id, status, params.clone())
            .await?;
        Ok(params.paginate(bookings, total))
    }

    async fn get(&self, actor: Actor, id: Uuid) -> AppResult<Booking> {
        self.find_visible(actor, id).await
    }

    async fn update_status(
        &self,
        actor: Actor,
        id: Uuid,
        status: BookingStatus,
    ) -> AppResult<Booking> {
        let booking = self.find_visible(actor, id).await?;

        if booking.host_id != actor.id && !actor.is_admin {
            return Err(AppError::Forbidden);
        }
        if matches!(status, BookingStatus::Cancelled | BookingStatus::Pending) {
            return Err(AppError::validation(
                "Use the cancel action to cancel a booking",
            ));
        }
        if !booking.status.can_transition_to(status) {
            return Err(AppError::validation(format!(
                "Cannot change a {} booking to {}",
                booking.status, status
            )));
        }
        if status == BookingStatus::Completed && !booking.stay_ended(today()) {
            return Err(AppError::validation(
                "A booking can only be completed after check-out",
            ));
        }

        let title = self.listing_title(booking.listing_id).await;
        let notice_title = title.clone();
        let from = booking.status;

        let updated = self
            .uow
            .transaction(move |ctx| {
                Box::pin(async move {
                    let updated = ctx.bookings().update_status(id, from, status).await?;
                    if let Some(kind) = NotificationKind::for_booking_status(status) {
                        ctx.notifications()
                            .create(
                                NewNotification::new(
                                    updated.guest_id,
                                    kind,
                                    format!("Booking {}", status),
                                    format!("Your booking for {} is now {}", notice_title, status),
                                )
                                .with_link(format!("/bookings/{}", updated.id)),
                            )
                            .await?;
                    }
                    Ok(updated)
                })
            })
            .await?;

        tracing::info!(booking_id = %id, status = %status, actor_id = %actor.id, "Booking status changed");

        self.email_user(updated.guest_id, |email, name| {
            EmailJob::booking_update(email, name, &title, status.as_str())
        })
        .await;

        Ok(updated)
    }

    async fn refund_quote(&self, actor: Actor, id: Uuid) -> AppResult<RefundQuote> {
        let booking = self.find_cancellable(actor, id).await?;

        let by_host = actor.id != booking.guest_id;
        Ok(refund_quote(&booking, today(), by_host))
    }

    async fn cancel(&self, actor: Actor, id: Uuid) -> AppResult<Booking> {
        let booking = self.find_cancellable(actor, id).await?;

        let by_host = actor.id != booking.guest_id;
        let quote = refund_quote(&booking, today(), by_host);
        let notify = booking.counterpart_of(actor.id);
        let title = self.listing_title(booking.listing_id).await;
        let notice_title = title.clone();

        let from = booking.status;
        let record = CancellationRecord {
            cancelled_by: actor.id,
            refund_cents: quote.refund_cents,
            cancelled_at: Utc::now(),
        };

        let cancelled = self
            .uow
            .transaction(move |ctx| {
                Box::pin(async move {
                    let cancelled = ctx.bookings().cancel(id, from, record).await?;
                    ctx.notifications()
                        .create(
                            NewNotification::new(
                                notify,
                                NotificationKind::BookingCancelled,
                                "Booking cancelled",
                                format!(
                                    "The booking for {} from {} to {} was cancelled",
                                    notice_title, cancelled.check_in, cancelled.check_out
                                ),
                            )
                            .with_link(format!("/bookings/{}", cancelled.id)),
                        )
                        .await?;
                    Ok(cancelled)
                })
            })
            .await?;

        tracing::info!(
            booking_id = %id,
            actor_id = %actor.id,
            refund_cents = quote.refund_cents,
            "Booking cancelled"
        );

        self.email_user(notify, |email, name| {
            EmailJob::booking_update(email, name, &title, BookingStatus::Cancelled.as_str())
        })
        .await;

        Ok(cancelled)
    }
}
