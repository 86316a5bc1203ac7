#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use cinema_booking_system::{
    models::{
        booking::CustomerInfo,
        cinema::{NewCinema, NewFilm, NewScreen, NewShowing, Screen, Showing},
        seat::Seat,
    },
    services::{
        booking_service::{BookingService, HoldPolicy},
        catalog_service::CatalogService,
        reservation_ledger::ReservationLedger,
    },
    store::{BookingStore, CatalogStore, MemoryBookingStore, MemoryCatalogStore},
    utils::{clock::ManualClock, error::AppResult},
};
use ctor::ctor;
use std::sync::Arc;

// Prefix every line with the test it came from, tests run interleaved
#[allow(unused_macros)]
macro_rules! test_println {
    ($test_name:expr, $($arg:tt)*) => {
        println!("[{}] {}", $test_name, format!($($arg)*))
    };
}

#[ctor]
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cinema_booking_system=warn".into()),
        )
        .with_test_writer()
        .try_init();
}

pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
}

/// Services wired over in-memory stores and a hand-driven clock.
pub struct TestApp {
    pub clock: Arc<ManualClock>,
    pub catalog_store: Arc<dyn CatalogStore>,
    pub booking_store: Arc<dyn BookingStore>,
    pub ledger: Arc<ReservationLedger>,
    pub catalog_service: CatalogService,
    pub booking_service: BookingService,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_policy(HoldPolicy::default())
    }

    pub fn with_policy(policy: HoldPolicy) -> Self {
        Self::with_stores(
            Arc::new(MemoryCatalogStore::new()),
            Arc::new(MemoryBookingStore::new()),
            policy,
        )
    }

    pub fn with_stores(
        catalog_store: Arc<dyn CatalogStore>,
        booking_store: Arc<dyn BookingStore>,
        policy: HoldPolicy,
    ) -> Self {
        let clock = Arc::new(ManualClock::new(start_time()));
        let ledger = Arc::new(ReservationLedger::new(clock.clone(), Duration::hours(1)));
        let catalog_service = CatalogService::new(catalog_store.clone(), clock.clone());
        let booking_service = BookingService::new(
            catalog_store.clone(),
            booking_store.clone(),
            ledger.clone(),
            policy,
        );

        TestApp {
            clock,
            catalog_store,
            booking_store,
            ledger,
            catalog_service,
            booking_service,
        }
    }

    /// Create a cinema with one `rows` x `row_width` screen and a showing there tomorrow.
    pub async fn seed_showing(&self, rows: i32, row_width: i32) -> AppResult<(Screen, Showing)> {
        let cinema = self
            .catalog_service
            .create_cinema(NewCinema {
                name: "Test Cinema".to_string(),
            })
            .await?;
        let screen = self
            .catalog_service
            .create_screen(NewScreen {
                cinema_id: cinema.id,
                name: "Screen 1".to_string(),
                rows,
                row_width,
            })
            .await?;
        let film = self
            .catalog_service
            .create_film(NewFilm {
                name: "Test Film".to_string(),
                length_minutes: 120,
            })
            .await?;
        let showing = self
            .catalog_service
            .create_showing(NewShowing {
                film_id: film.id,
                screen_id: screen.id,
                time: self.clock_now() + Duration::days(1),
            })
            .await?;

        Ok((screen, showing))
    }

    pub fn clock_now(&self) -> DateTime<Utc> {
        use cinema_booking_system::utils::clock::Clock;
        self.clock.now()
    }
}

pub fn seats(coordinates: &[(i32, i32)]) -> Vec<Seat> {
    coordinates
        .iter()
        .map(|(row, column)| Seat::new(*row, *column))
        .collect()
}

pub fn customer(name: &str) -> CustomerInfo {
    CustomerInfo {
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
    }
}
