use crate::config::BookingConfig;
use crate::models::booking::{Booking, CustomerInfo, Hold, SelectSeatsRequest};
use crate::models::seat::{Seat, SeatMap};
use crate::services::reservation_ledger::ReservationLedger;
use crate::store::{BookingStore, CatalogStore};
use crate::utils::error::{AppError, AppResult};
use chrono::Duration;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;
use validator::Validate;

/// Limits applied to every hold request.
#[derive(Debug, Clone, Copy)]
pub struct HoldPolicy {
    pub default_ttl: Duration,
    pub max_ttl: Duration,
    pub max_seats: usize,
}

impl HoldPolicy {
    pub fn from_config(config: &BookingConfig) -> AppResult<Self> {
        let to_chrono = |d: std::time::Duration| {
            Duration::from_std(d).map_err(|e| AppError::Configuration(e.to_string()))
        };

        Ok(HoldPolicy {
            default_ttl: to_chrono(config.hold_ttl)?,
            max_ttl: to_chrono(config.max_hold_ttl)?,
            max_seats: config.max_seats_per_hold,
        })
    }

    // A missing ttl takes the default; a longer one is cut down to the maximum
    fn resolve_ttl(&self, requested: Option<Duration>) -> AppResult<Duration> {
        match requested {
            None => Ok(self.default_ttl),
            Some(ttl) if ttl <= Duration::zero() => {
                Err(AppError::BadRequest("Hold ttl must be positive".into()))
            }
            Some(ttl) => Ok(ttl.min(self.max_ttl)),
        }
    }
}

impl Default for HoldPolicy {
    fn default() -> Self {
        HoldPolicy {
            default_ttl: Duration::minutes(5),
            max_ttl: Duration::minutes(15),
            max_seats: 10,
        }
    }
}

/// Caller-facing booking flow: seat map, select, confirm, abandon.
///
/// Seat contention is a business outcome, so nothing here retries.
#[derive(Clone)]
pub struct BookingService {
    catalog: Arc<dyn CatalogStore>,
    bookings: Arc<dyn BookingStore>,
    ledger: Arc<ReservationLedger>,
    policy: HoldPolicy,
}

impl BookingService {
    pub fn new(
        catalog: Arc<dyn CatalogStore>,
        bookings: Arc<dyn BookingStore>,
        ledger: Arc<ReservationLedger>,
        policy: HoldPolicy,
    ) -> Self {
        BookingService {
            catalog,
            bookings,
            ledger,
            policy,
        }
    }

    pub fn ledger(&self) -> &Arc<ReservationLedger> {
        &self.ledger
    }

    pub async fn get_seat_map(&self, showing_id: i32) -> AppResult<SeatMap> {
        self.open_showing(showing_id).await?;
        self.ledger.seat_map(showing_id)
    }

    pub async fn select_seats(
        &self,
        showing_id: i32,
        holder_id: &str,
        seats: &[Seat],
        ttl: Option<Duration>,
    ) -> AppResult<Hold> {
        if holder_id.trim().is_empty() {
            return Err(AppError::BadRequest("Holder id must not be empty".into()));
        }
        let requested: Vec<Seat> = seats.iter().copied().collect::<BTreeSet<_>>().into_iter().collect();
        if requested.len() > self.policy.max_seats {
            return Err(AppError::BadRequest(format!(
                "At most {} seats can be held at once",
                self.policy.max_seats
            )));
        }
        let ttl = self.policy.resolve_ttl(ttl)?;

        let map = self.get_seat_map(showing_id).await?;
        if let Some(seat) = requested.iter().find(|seat| !map.geometry().contains(seat)) {
            return Err(AppError::InvalidSeat(*seat));
        }
        let taken = map.taken(&requested);
        if !taken.is_empty() {
            info!(showing_id, holder_id, ?taken, "Selected seats already taken");
            return Err(AppError::AlreadyTaken(taken));
        }

        // A competitor may still win between the snapshot and the hold
        self.ledger.hold(showing_id, holder_id, &requested, ttl)
    }

    pub async fn select_seats_request(
        &self,
        showing_id: i32,
        request: SelectSeatsRequest,
    ) -> AppResult<Hold> {
        request.validate()?;
        let ttl = request
            .ttl_seconds
            .map(|secs| {
                Duration::try_seconds(secs)
                    .ok_or_else(|| AppError::BadRequest(format!("Hold ttl out of range: {}", secs)))
            })
            .transpose()?;
        self.select_seats(showing_id, &request.holder_id, &request.seats, ttl)
            .await
    }

    pub async fn confirm_booking(&self, hold_id: Uuid, customer: CustomerInfo) -> AppResult<Booking> {
        customer.validate()?;

        let mut booking = self.ledger.confirm(hold_id)?;
        booking.customer = Some(customer);

        if let Err(err) = self.bookings.save_booking(&booking).await {
            error!(%hold_id, booking_id = %booking.id, "Failed to persist booking: {}", err);
            if let Err(revoke_err) = self.ledger.revoke(&booking) {
                error!(booking_id = %booking.id, "Failed to revoke booking: {}", revoke_err);
            }
            return Err(err);
        }

        info!(
            showing_id = booking.showing_id,
            booking_id = %booking.id,
            seats = booking.seats.len(),
            "Booking confirmed"
        );
        Ok(booking)
    }

    pub async fn abandon(&self, hold_id: Uuid) -> AppResult<()> {
        self.ledger.cancel(hold_id)
    }

    pub async fn list_bookings(&self, showing_id: i32) -> AppResult<Vec<Booking>> {
        if self.catalog.get_showing(showing_id).await?.is_none() {
            return Err(AppError::NotFound(format!("Showing {}", showing_id)));
        }
        self.bookings.list_bookings(showing_id).await
    }

    // Load the showing's geometry and persisted bookings into the ledger on first use
    async fn open_showing(&self, showing_id: i32) -> AppResult<()> {
        if self.ledger.is_open(showing_id) {
            return Ok(());
        }

        let showing = self
            .catalog
            .get_showing(showing_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Showing {}", showing_id)))?;
        let screen = self
            .catalog
            .get_screen(showing.screen_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Screen {}", showing.screen_id)))?;
        let booked = self.bookings.list_bookings(showing_id).await?;

        self.ledger
            .open_showing(showing_id, screen.geometry(), showing.time, &booked);
        Ok(())
    }
}
