use crate::models::seat::Seat;
use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A time-boxed claim on seats of one showing, owned by a single booking attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Hold {
    pub id: Uuid,
    pub showing_id: i32,
    pub holder_id: String,
    pub seats: Vec<Seat>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Hold {
    // The ttl is a hard bound: a hold is dead at exactly `expires_at`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Customer/order metadata attached to a booking on confirmation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, Validate)]
pub struct CustomerInfo {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(email)]
    pub email: String,
}

/// Permanent seat allocation created by confirming a hold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Booking {
    pub id: Uuid,
    pub showing_id: i32,
    pub holder_id: String,
    pub seats: Vec<Seat>,
    pub confirmed_at: DateTime<Utc>,
    pub customer: Option<CustomerInfo>,
}

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema, Validate)]
pub struct SelectSeatsRequest {
    #[validate(length(min = 1, max = 128))]
    pub holder_id: String,
    #[validate(length(min = 1))]
    pub seats: Vec<Seat>,
    #[validate(range(min = 1))]
    pub ttl_seconds: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct ConfirmBookingRequest {
    pub customer: CustomerInfo,
}

/// Public view of a booking: which seats are gone and to whom, without customer details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BookingSummary {
    pub id: Uuid,
    pub holder_id: String,
    pub seats: Vec<Seat>,
    pub confirmed_at: DateTime<Utc>,
}

impl From<Booking> for BookingSummary {
    fn from(booking: Booking) -> Self {
        BookingSummary {
            id: booking.id,
            holder_id: booking.holder_id,
            seats: booking.seats,
            confirmed_at: booking.confirmed_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct BookingListResponse {
    pub bookings: Vec<BookingSummary>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct AbandonResponse {
    pub hold_id: Uuid,
    pub status: String,
}
