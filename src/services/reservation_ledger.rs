use crate::models::booking::{Booking, Hold};
use crate::models::seat::{Seat, SeatGeometry, SeatMap, SeatState};
use crate::utils::clock::Clock;
use crate::utils::error::{AppError, AppResult};
use chrono::{DateTime, Duration, Utc};
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Claim {
    Held(Uuid),
    Booked(Uuid),
}

// Seat table of a single showing. Only reachable through its mutex.
struct ShowingSeats {
    showing_id: i32,
    geometry: SeatGeometry,
    starts_at: DateTime<Utc>,
    // set once the table is evicted; late lock holders must not use it
    closed: bool,
    claims: HashMap<Seat, Claim>,
    holds: HashMap<Uuid, Hold>,
    bookings: HashMap<Uuid, Vec<Seat>>,
    // hold id -> when it expired
    expired: HashMap<Uuid, DateTime<Utc>>,
}

impl ShowingSeats {
    fn new(
        showing_id: i32,
        geometry: SeatGeometry,
        starts_at: DateTime<Utc>,
        bookings: &[Booking],
    ) -> Self {
        let mut table = ShowingSeats {
            showing_id,
            geometry,
            starts_at,
            closed: false,
            claims: HashMap::new(),
            holds: HashMap::new(),
            bookings: HashMap::new(),
            expired: HashMap::new(),
        };

        for booking in bookings {
            for seat in &booking.seats {
                table.claims.insert(*seat, Claim::Booked(booking.id));
            }
            table.bookings.insert(booking.id, booking.seats.clone());
        }

        table
    }

    // Free seats still claimed by `owner`
    fn release(&mut self, seats: &[Seat], owner: Claim) {
        for seat in seats {
            if self.claims.get(seat) == Some(&owner) {
                self.claims.remove(seat);
            }
        }
    }

    /// Turn every hold whose ttl has run out into a tombstone and drop tombstones older
    /// than `retention`. Returns the number of holds expired and the ids forgotten.
    fn purge_expired(&mut self, now: DateTime<Utc>, retention: Duration) -> (usize, Vec<Uuid>) {
        let due: Vec<Uuid> = self
            .holds
            .values()
            .filter(|hold| hold.is_expired_at(now))
            .map(|hold| hold.id)
            .collect();

        for hold_id in &due {
            if let Some(hold) = self.holds.remove(hold_id) {
                self.release(&hold.seats, Claim::Held(hold.id));
                self.expired.insert(hold.id, hold.expires_at);
            }
        }

        let mut forgotten = Vec::new();
        self.expired.retain(|hold_id, expired_at| {
            let keep = expired_at
                .checked_add_signed(retention)
                .map_or(true, |forget_at| forget_at > now);
            if !keep {
                forgotten.push(*hold_id);
            }
            keep
        });

        (due.len(), forgotten)
    }

    fn snapshot(&self) -> SeatMap {
        SeatMap::build(
            self.showing_id,
            self.geometry,
            self.claims.iter().map(|(seat, claim)| {
                let state = match claim {
                    Claim::Held(_) => SeatState::Held,
                    Claim::Booked(_) => SeatState::Booked,
                };
                (*seat, state)
            }),
        )
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Sole authority for seat-state transitions.
///
/// Every showing owns its own seat table behind a mutex, indexed by showing id. A hold
/// never spans showings, so each operation takes at most one showing lock. The hold index
/// is only locked on its own or while a showing lock is already held, never the reverse.
pub struct ReservationLedger {
    clock: Arc<dyn Clock>,
    tombstone_retention: Duration,
    showings: RwLock<HashMap<i32, Arc<Mutex<ShowingSeats>>>>,
    hold_index: Mutex<HashMap<Uuid, i32>>,
}

impl ReservationLedger {
    pub fn new(clock: Arc<dyn Clock>, tombstone_retention: Duration) -> Self {
        ReservationLedger {
            clock,
            tombstone_retention,
            showings: RwLock::new(HashMap::new()),
            hold_index: Mutex::new(HashMap::new()),
        }
    }

    pub fn is_open(&self, showing_id: i32) -> bool {
        self.showings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&showing_id)
    }

    /// Register the seat table of a showing, seeded with bookings already persisted.
    /// Returns false if the showing was already open; the existing table is kept as is.
    pub fn open_showing(
        &self,
        showing_id: i32,
        geometry: SeatGeometry,
        starts_at: DateTime<Utc>,
        bookings: &[Booking],
    ) -> bool {
        let mut showings = self.showings.write().unwrap_or_else(PoisonError::into_inner);
        if showings.contains_key(&showing_id) {
            return false;
        }

        showings.insert(
            showing_id,
            Arc::new(Mutex::new(ShowingSeats::new(
                showing_id, geometry, starts_at, bookings,
            ))),
        );
        debug!(showing_id, booked = bookings.len(), "Opened seat table");
        true
    }

    pub fn seat_map(&self, showing_id: i32) -> AppResult<SeatMap> {
        let table = self.table(showing_id)?;
        let mut seats = lock(&table);
        if seats.closed {
            return Err(AppError::NotFound(format!("Showing {}", showing_id)));
        }
        self.purge(&mut seats, self.clock.now());
        Ok(seats.snapshot())
    }

    /// Claim all of `seats` for `holder_id`, or none of them.
    pub fn hold(
        &self,
        showing_id: i32,
        holder_id: &str,
        seats: &[Seat],
        ttl: Duration,
    ) -> AppResult<Hold> {
        let requested: BTreeSet<Seat> = seats.iter().copied().collect();
        if requested.is_empty() {
            return Err(AppError::BadRequest("At least one seat must be requested".into()));
        }
        if ttl <= Duration::zero() {
            return Err(AppError::BadRequest("Hold ttl must be positive".into()));
        }

        let table = self.table(showing_id)?;
        let mut table = lock(&table);
        if table.closed {
            return Err(AppError::NotFound(format!("Showing {}", showing_id)));
        }
        let now = self.clock.now();
        self.purge(&mut table, now);

        if let Some(seat) = requested.iter().find(|seat| !table.geometry.contains(seat)) {
            return Err(AppError::InvalidSeat(*seat));
        }

        let blocked: Vec<Seat> = requested
            .iter()
            .filter(|seat| table.claims.contains_key(*seat))
            .copied()
            .collect();
        if !blocked.is_empty() {
            debug!(showing_id, holder_id, ?blocked, "Hold refused");
            return Err(AppError::SeatUnavailable(blocked));
        }

        let expires_at = now
            .checked_add_signed(ttl)
            .ok_or_else(|| AppError::BadRequest("Hold ttl out of range".into()))?;
        let hold = Hold {
            id: Uuid::new_v4(),
            showing_id,
            holder_id: holder_id.to_string(),
            seats: requested.into_iter().collect(),
            created_at: now,
            expires_at,
        };

        for seat in &hold.seats {
            table.claims.insert(*seat, Claim::Held(hold.id));
        }
        table.holds.insert(hold.id, hold.clone());
        lock(&self.hold_index).insert(hold.id, showing_id);

        info!(showing_id, holder_id, hold_id = %hold.id, seats = hold.seats.len(), "Seats held");
        Ok(hold)
    }

    /// Promote a live hold to a booking. Expiry wins over a racing confirmation.
    pub fn confirm(&self, hold_id: Uuid) -> AppResult<Booking> {
        let table = self.locate(hold_id)?;
        let mut table = lock(&table);
        if table.closed {
            return Err(AppError::HoldNotFound(hold_id));
        }
        let now = self.clock.now();
        self.purge(&mut table, now);

        if table.expired.contains_key(&hold_id) {
            return Err(AppError::HoldExpired(hold_id));
        }
        let hold = table
            .holds
            .remove(&hold_id)
            .ok_or(AppError::HoldNotFound(hold_id))?;

        let booking = Booking {
            id: Uuid::new_v4(),
            showing_id: hold.showing_id,
            holder_id: hold.holder_id,
            seats: hold.seats,
            confirmed_at: now,
            customer: None,
        };

        for seat in &booking.seats {
            table.claims.insert(*seat, Claim::Booked(booking.id));
        }
        table.bookings.insert(booking.id, booking.seats.clone());
        lock(&self.hold_index).remove(&hold_id);

        info!(showing_id = booking.showing_id, %hold_id, booking_id = %booking.id, "Hold confirmed");
        Ok(booking)
    }

    /// Release a live hold. An expired or already released hold is not found.
    pub fn cancel(&self, hold_id: Uuid) -> AppResult<()> {
        let table = self.locate(hold_id)?;
        let mut table = lock(&table);
        if table.closed {
            return Err(AppError::HoldNotFound(hold_id));
        }
        self.purge(&mut table, self.clock.now());

        let hold = table
            .holds
            .remove(&hold_id)
            .ok_or(AppError::HoldNotFound(hold_id))?;
        table.release(&hold.seats, Claim::Held(hold_id));
        lock(&self.hold_index).remove(&hold_id);

        info!(showing_id = hold.showing_id, %hold_id, "Hold cancelled");
        Ok(())
    }

    /// Undo a confirmation whose booking could not be persisted.
    pub fn revoke(&self, booking: &Booking) -> AppResult<()> {
        let table = self.table(booking.showing_id)?;
        let mut table = lock(&table);

        let seats = table
            .bookings
            .remove(&booking.id)
            .ok_or_else(|| AppError::NotFound(format!("Booking {}", booking.id)))?;
        table.release(&seats, Claim::Booked(booking.id));

        info!(showing_id = booking.showing_id, booking_id = %booking.id, "Booking revoked");
        Ok(())
    }

    /// Expire every overdue hold across all open showings.
    pub fn expire_due(&self) -> usize {
        let tables: Vec<Arc<Mutex<ShowingSeats>>> = self
            .showings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();

        let now = self.clock.now();
        tables
            .iter()
            .map(|table| self.purge(&mut lock(table), now))
            .sum()
    }

    /// Drop the seat tables of showings that have started and have no live holds.
    /// Bookings stay in the store; a later request reopens the table from there.
    pub fn evict_started(&self) -> usize {
        let now = self.clock.now();
        let mut showings = self.showings.write().unwrap_or_else(PoisonError::into_inner);
        let mut evicted = Vec::new();

        for (showing_id, table) in showings.iter() {
            let mut table = lock(table);
            if table.starts_at > now {
                continue;
            }
            self.purge(&mut table, now);
            if !table.holds.is_empty() {
                continue;
            }

            table.closed = true;
            let mut index = lock(&self.hold_index);
            for hold_id in table.expired.keys() {
                index.remove(hold_id);
            }
            evicted.push(*showing_id);
        }

        for showing_id in &evicted {
            showings.remove(showing_id);
        }
        if !evicted.is_empty() {
            debug!(?evicted, "Evicted seat tables of started showings");
        }
        evicted.len()
    }

    fn purge(&self, table: &mut ShowingSeats, now: DateTime<Utc>) -> usize {
        let (expired, forgotten) = table.purge_expired(now, self.tombstone_retention);
        if expired > 0 {
            debug!(showing_id = table.showing_id, expired, "Expired holds released");
        }
        if !forgotten.is_empty() {
            let mut index = lock(&self.hold_index);
            for hold_id in forgotten {
                index.remove(&hold_id);
            }
        }
        expired
    }

    fn table(&self, showing_id: i32) -> AppResult<Arc<Mutex<ShowingSeats>>> {
        self.showings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&showing_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Showing {}", showing_id)))
    }

    fn locate(&self, hold_id: Uuid) -> AppResult<Arc<Mutex<ShowingSeats>>> {
        let showing_id = lock(&self.hold_index)
            .get(&hold_id)
            .copied()
            .ok_or(AppError::HoldNotFound(hold_id))?;
        self.table(showing_id)
    }
}
