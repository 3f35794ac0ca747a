//! Saved payment cards.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use super::today;
use crate::domain::payment_method::{is_expired, is_valid_last4};
use crate::domain::{CardBrand, NewPaymentMethod, PaymentMethod};
use crate::errors::{AppError, AppResult};
use crate::infra::UnitOfWork;

/// Card details submitted by the account owner
#[derive(Debug, Clone, PartialEq)]
pub struct CardInput {
    pub brand: CardBrand,
    pub last4: String,
    pub exp_month: i32,
    pub exp_year: i32,
    pub holder_name: String,
    pub make_default: bool,
}

#[async_trait]
pub trait PaymentMethodService: Send + Sync {
    /// Cards of a user, default first
    async fn list(&self, user_id: Uuid) -> AppResult<Vec<PaymentMethod>>;

    /// Save a card; the first card always becomes the default
    async fn add(&self, user_id: Uuid, card: CardInput) -> AppResult<PaymentMethod>;

    async fn set_default(&self, user_id: Uuid, id: Uuid) -> AppResult<PaymentMethod>;

    /// Remove a card, promoting the newest remaining one if it was the default
    async fn delete(&self, user_id: Uuid, id: Uuid) -> AppResult<()>;
}

pub struct PaymentMethodManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> PaymentMethodManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> PaymentMethodService for PaymentMethodManager<U> {
    async fn list(&self, user_id: Uuid) -> AppResult<Vec<PaymentMethod>> {
        self.uow.payment_methods().list_for_user(user_id).await
    }

    async fn add(&self, user_id: Uuid, card: CardInput) -> AppResult<PaymentMethod> {
        if !is_valid_last4(&card.last4) {
            return Err(AppError::validation("last4 must be exactly four digits"));
        }
        if !(1..=12).contains(&card.exp_month) {
            return Err(AppError::validation("exp_month must be between 1 and 12"));
        }
        if is_expired(card.exp_month, card.exp_year, today()) {
            return Err(AppError::validation("Card is expired"));
        }

        self.uow
            .transaction(move |ctx| {
                Box::pin(async move {
                    let existing = ctx.payment_methods().count_for_user(user_id).await?;
                    let is_default = existing == 0 || card.make_default;
                    if is_default && existing > 0 {
                        ctx.payment_methods().clear_default(user_id).await?;
                    }

                    ctx.payment_methods()
                        .create(NewPaymentMethod {
                            user_id,
                            brand: card.brand,
                            last4: card.last4,
                            exp_month: card.exp_month,
                            exp_year: card.exp_year,
                            holder_name: card.holder_name.trim().to_string(),
                            is_default,
                        })
                        .await
                })
            })
            .await
    }

    async fn set_default(&self, user_id: Uuid, id: Uuid) -> AppResult<PaymentMethod> {
        self.uow
            .transaction(move |ctx| {
                Box::pin(async move {
                    let card = ctx
                        .payment_methods()
                        .find_for_user(id, user_id)
                        .await?
                        .ok_or(AppError::NotFound)?;
                    if card.is_default {
                        return Ok(card);
                    }

                    ctx.payment_methods().clear_default(user_id).await?;
                    ctx.payment_methods().set_default(id).await
                })
            })
            .await
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> AppResult<()> {
        self.uow
            .transaction(move |ctx| {
                Box::pin(async move {
                    let card = ctx
                        .payment_methods()
                        .find_for_user(id, user_id)
                        .await?
                        .ok_or(AppError::NotFound)?;
                    ctx.payment_methods().delete(id).await?;

                    if card.is_default {
                        let remaining = ctx.payment_methods().list_for_user(user_id).await?;
                        if let Some(newest) = remaining.first() {
                            ctx.payment_methods().set_default(newest.id).await?;
                        }
                    }
                    Ok(())
                })
            })
            .await
    }
}
