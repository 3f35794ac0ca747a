//! Shared fixtures for the integration tests.
#![allow(dead_code)]

use chrono::{Duration, NaiveDate, Utc};
use uuid::Uuid;

use stayhub::domain::{
    AdminLog, Booking, BookingStatus, CardBrand, HostRequest, HostRequestStatus, Listing,
    NewAdminLog, Notification, NotificationKind, PaymentMethod, User,
};

pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

pub fn days_from_today(days: i64) -> NaiveDate {
    today() + Duration::days(days)
}

pub fn user(id: Uuid) -> User {
    User::new(
        id,
        "guest@example.com".to_string(),
        "hashed".to_string(),
        "Test Guest".to_string(),
    )
}

pub fn host(id: Uuid) -> User {
    let mut user = user(id);
    user.email = "host@example.com".to_string();
    user.name = "Test Host".to_string();
    user.is_host = true;
    user
}

pub fn admin(id: Uuid) -> User {
    let mut user = user(id);
    user.email = "admin@example.com".to_string();
    user.name = "Test Admin".to_string();
    user.is_admin = true;
    user
}

pub fn listing(id: Uuid, host_id: Uuid) -> Listing {
    let now = Utc::now();
    Listing {
        id,
        host_id,
        title: "Sunny loft".to_string(),
        description: "Close to the harbour".to_string(),
        property_type: stayhub::domain::PropertyType::Apartment,
        address: "Rua Augusta 1".to_string(),
        city: "Lisbon".to_string(),
        country: "Portugal".to_string(),
        latitude: None,
        longitude: None,
        nightly_price_cents: 10_000,
        cleaning_fee_cents: 2_500,
        max_guests: 4,
        bedrooms: 2,
        bathrooms: 1,
        amenities: vec!["wifi".to_string()],
        image_urls: Vec::new(),
        is_published: true,
        created_at: now,
        updated_at: now,
        deleted_at: None,
    }
}

pub fn booking(
    id: Uuid,
    guest_id: Uuid,
    host_id: Uuid,
    check_in: NaiveDate,
    check_out: NaiveDate,
    status: BookingStatus,
) -> Booking {
    let now = Utc::now();
    let nights = (check_out - check_in).num_days();
    Booking {
        id,
        listing_id: Uuid::new_v4(),
        guest_id,
        host_id,
        check_in,
        check_out,
        guests: 2,
        nightly_price_cents: 10_000,
        cleaning_fee_cents: 2_500,
        total_cents: 10_000 * nights + 2_500,
        status,
        refund_cents: None,
        cancelled_by: None,
        cancelled_at: None,
        created_at: now,
        updated_at: now,
    }
}

pub fn card(id: Uuid, user_id: Uuid, is_default: bool) -> PaymentMethod {
    PaymentMethod {
        id,
        user_id,
        brand: CardBrand::Visa,
        last4: "4242".to_string(),
        exp_month: 12,
        exp_year: 2099,
        holder_name: "Test Guest".to_string(),
        is_default,
        created_at: Utc::now(),
    }
}

pub fn host_request(id: Uuid, user_id: Uuid, status: HostRequestStatus) -> HostRequest {
    HostRequest {
        id,
        user_id,
        status,
        message: "I have a flat in Porto".to_string(),
        reviewed_by: None,
        reviewed_at: None,
        rejection_reason: None,
        created_at: Utc::now(),
    }
}

pub fn notification(user_id: Uuid, kind: NotificationKind) -> Notification {
    Notification {
        id: Uuid::new_v4(),
        user_id,
        kind,
        title: "Notice".to_string(),
        body: "Body".to_string(),
        link: None,
        read_at: None,
        created_at: Utc::now(),
    }
}

pub fn admin_log(entry: NewAdminLog) -> AdminLog {
    AdminLog {
        id: Uuid::new_v4(),
        admin_id: entry.admin_id,
        action: entry.action,
        target_type: entry.target_type,
        target_id: entry.target_id,
        details: entry.details,
        created_at: Utc::now(),
    }
}
