use async_trait::async_trait;
use chrono::Duration;
use cinema_booking_system::{
    models::{
        booking::{Booking, SelectSeatsRequest},
        seat::{Seat, SeatState},
    },
    services::booking_service::{BookingService, HoldPolicy},
    services::expiry_sweeper::ExpirySweeper,
    services::reservation_ledger::ReservationLedger,
    store::{BookingStore, MemoryCatalogStore},
    utils::error::{AppError, AppResult},
};
use std::sync::Arc;
use test_context::{test_context, AsyncTestContext};
use tokio::task::JoinSet;
use uuid::Uuid;

#[macro_use]
mod common {
    #[macro_use]
    pub mod test_utils;
}
use common::test_utils::{customer, seats, TestApp};

struct BookingServiceContext {
    app: TestApp,
    showing_id: i32,
}

#[async_trait]
impl AsyncTestContext for BookingServiceContext {
    async fn setup() -> Self {
        let app = TestApp::with_policy(HoldPolicy {
            max_seats: 4,
            ..HoldPolicy::default()
        });
        let (_, showing) = app
            .seed_showing(5, 5)
            .await
            .expect("Failed to seed showing");

        BookingServiceContext {
            app,
            showing_id: showing.id,
        }
    }
}

// Booking store whose writes always fail, as a lost database connection would
struct FailingBookingStore;

#[async_trait]
impl BookingStore for FailingBookingStore {
    async fn save_booking(&self, _booking: &Booking) -> AppResult<()> {
        Err(AppError::DatabaseError("connection reset".to_string()))
    }

    async fn list_bookings(&self, _showing_id: i32) -> AppResult<Vec<Booking>> {
        Ok(Vec::new())
    }
}

#[test_context(BookingServiceContext)]
#[tokio::test]
async fn test_seat_map_of_new_showing_is_free(ctx: &BookingServiceContext) -> Result<(), AppError> {
    let map = ctx.app.booking_service.get_seat_map(ctx.showing_id).await?;
    assert_eq!(map.showing_id(), ctx.showing_id);
    assert_eq!(map.count(SeatState::Free), 25);

    let result = ctx.app.booking_service.get_seat_map(ctx.showing_id + 1000).await;
    assert!(matches!(result, Err(AppError::NotFound(_))));

    Ok(())
}

#[test_context(BookingServiceContext)]
#[tokio::test]
async fn test_select_taken_seats_reports_already_taken(
    ctx: &BookingServiceContext,
) -> Result<(), AppError> {
    let service = &ctx.app.booking_service;
    service
        .select_seats(ctx.showing_id, "holder-a", &seats(&[(0, 0)]), None)
        .await?;

    let result = service
        .select_seats(ctx.showing_id, "holder-b", &seats(&[(0, 0), (0, 1)]), None)
        .await;
    match result {
        Err(AppError::AlreadyTaken(taken)) => assert_eq!(taken, seats(&[(0, 0)])),
        other => panic!("Expected AlreadyTaken, got {:?}", other),
    }

    let result = service
        .select_seats(ctx.showing_id, "holder-b", &seats(&[(0, 9)]), None)
        .await;
    assert!(matches!(result, Err(AppError::InvalidSeat(seat)) if seat == Seat::new(0, 9)));

    let map = service.get_seat_map(ctx.showing_id).await?;
    assert_eq!(map.state(&Seat::new(0, 1)), Some(SeatState::Free));

    Ok(())
}

#[test_context(BookingServiceContext)]
#[tokio::test]
async fn test_hold_ttl_defaults_and_clamps(ctx: &BookingServiceContext) -> Result<(), AppError> {
    let service = &ctx.app.booking_service;
    let now = ctx.app.clock_now();

    let hold = service
        .select_seats(ctx.showing_id, "holder-a", &seats(&[(1, 1)]), None)
        .await?;
    assert_eq!(hold.expires_at, now + Duration::minutes(5));

    let hold = service
        .select_seats(ctx.showing_id, "holder-b", &seats(&[(1, 2)]), Some(Duration::hours(2)))
        .await?;
    assert_eq!(hold.expires_at, now + Duration::minutes(15));

    let hold = service
        .select_seats(ctx.showing_id, "holder-c", &seats(&[(1, 3)]), Some(Duration::seconds(45)))
        .await?;
    assert_eq!(hold.expires_at, now + Duration::seconds(45));

    let result = service
        .select_seats(ctx.showing_id, "holder-d", &seats(&[(1, 4)]), Some(Duration::seconds(-5)))
        .await;
    assert!(matches!(result, Err(AppError::BadRequest(_))));

    Ok(())
}

#[test_context(BookingServiceContext)]
#[tokio::test]
async fn test_select_seats_limits(ctx: &BookingServiceContext) -> Result<(), AppError> {
    let service = &ctx.app.booking_service;

    let result = service
        .select_seats(ctx.showing_id, "holder-a", &seats(&[(2, 0), (2, 1), (2, 2), (2, 3), (2, 4)]), None)
        .await;
    assert!(matches!(result, Err(AppError::BadRequest(_))));

    // Duplicates do not count against the limit
    let hold = service
        .select_seats(
            ctx.showing_id,
            "holder-a",
            &seats(&[(2, 0), (2, 0), (2, 1), (2, 2), (2, 3)]),
            None,
        )
        .await?;
    assert_eq!(hold.seats.len(), 4);

    let result = service
        .select_seats(ctx.showing_id, "  ", &seats(&[(3, 0)]), None)
        .await;
    assert!(matches!(result, Err(AppError::BadRequest(_))));

    Ok(())
}

#[test_context(BookingServiceContext)]
#[tokio::test]
async fn test_select_seats_request_validation(ctx: &BookingServiceContext) -> Result<(), AppError> {
    let service = &ctx.app.booking_service;

    let empty = SelectSeatsRequest {
        holder_id: "holder-a".to_string(),
        seats: Vec::new(),
        ttl_seconds: None,
    };
    let result = service.select_seats_request(ctx.showing_id, empty).await;
    assert!(matches!(result, Err(AppError::ValidationError(_))));

    let zero_ttl = SelectSeatsRequest {
        holder_id: "holder-a".to_string(),
        seats: seats(&[(0, 0)]),
        ttl_seconds: Some(0),
    };
    let result = service.select_seats_request(ctx.showing_id, zero_ttl).await;
    assert!(matches!(result, Err(AppError::ValidationError(_))));

    let valid = SelectSeatsRequest {
        holder_id: "holder-a".to_string(),
        seats: seats(&[(0, 0)]),
        ttl_seconds: Some(60),
    };
    let hold = service.select_seats_request(ctx.showing_id, valid).await?;
    assert_eq!(hold.expires_at, ctx.app.clock_now() + Duration::seconds(60));

    Ok(())
}

#[test_context(BookingServiceContext)]
#[tokio::test]
async fn test_confirm_booking_persists_customer(ctx: &BookingServiceContext) -> Result<(), AppError> {
    let test_name = "test_confirm_booking_persists_customer";
    let service = &ctx.app.booking_service;

    let hold = service
        .select_seats(ctx.showing_id, "holder-a", &seats(&[(4, 1), (4, 2)]), None)
        .await?;

    // A bad customer record leaves the hold untouched
    let mut invalid = customer("Ada Lovelace");
    invalid.email = "not-an-email".to_string();
    let result = service.confirm_booking(hold.id, invalid).await;
    assert!(matches!(result, Err(AppError::ValidationError(_))));

    let booking = service
        .confirm_booking(hold.id, customer("Ada Lovelace"))
        .await?;
    test_println!(test_name, "Confirmed booking {}", booking.id);
    assert_eq!(booking.seats, hold.seats);
    assert_eq!(booking.holder_id, "holder-a");
    assert_eq!(booking.customer, Some(customer("Ada Lovelace")));

    let bookings = service.list_bookings(ctx.showing_id).await?;
    assert_eq!(bookings, vec![booking]);

    let map = service.get_seat_map(ctx.showing_id).await?;
    assert_eq!(map.count(SeatState::Booked), 2);

    let result = service.list_bookings(ctx.showing_id + 1000).await;
    assert!(matches!(result, Err(AppError::NotFound(_))));

    Ok(())
}

#[test_context(BookingServiceContext)]
#[tokio::test]
async fn test_confirm_expired_hold(ctx: &BookingServiceContext) -> Result<(), AppError> {
    let service = &ctx.app.booking_service;
    let hold = service
        .select_seats(ctx.showing_id, "holder-a", &seats(&[(3, 3)]), Some(Duration::seconds(30)))
        .await?;

    ctx.app.clock.advance(Duration::seconds(31));
    let result = service.confirm_booking(hold.id, customer("Late Comer")).await;
    assert!(matches!(result, Err(AppError::HoldExpired(_))));
    assert!(service.list_bookings(ctx.showing_id).await?.is_empty());

    Ok(())
}

#[test_context(BookingServiceContext)]
#[tokio::test]
async fn test_abandon_releases_seats(ctx: &BookingServiceContext) -> Result<(), AppError> {
    let service = &ctx.app.booking_service;
    let hold = service
        .select_seats(ctx.showing_id, "holder-a", &seats(&[(0, 4)]), None)
        .await?;

    service.abandon(hold.id).await?;
    assert!(matches!(service.abandon(hold.id).await, Err(AppError::HoldNotFound(_))));
    assert!(matches!(service.abandon(Uuid::new_v4()).await, Err(AppError::HoldNotFound(_))));

    service
        .select_seats(ctx.showing_id, "holder-b", &seats(&[(0, 4)]), None)
        .await?;

    Ok(())
}

#[test_context(BookingServiceContext)]
#[tokio::test]
async fn test_bookings_survive_a_new_ledger(ctx: &BookingServiceContext) -> Result<(), AppError> {
    let service = &ctx.app.booking_service;
    let hold = service
        .select_seats(ctx.showing_id, "holder-a", &seats(&[(2, 2)]), None)
        .await?;
    service.confirm_booking(hold.id, customer("Grace Hopper")).await?;

    // Same stores, empty ledger: the booking is reloaded from the store
    let ledger = Arc::new(ReservationLedger::new(ctx.app.clock.clone(), Duration::hours(1)));
    let restarted = BookingService::new(
        ctx.app.catalog_store.clone(),
        ctx.app.booking_store.clone(),
        ledger,
        HoldPolicy::default(),
    );

    let map = restarted.get_seat_map(ctx.showing_id).await?;
    assert_eq!(map.state(&Seat::new(2, 2)), Some(SeatState::Booked));

    let result = restarted
        .select_seats(ctx.showing_id, "holder-b", &seats(&[(2, 2)]), None)
        .await;
    assert!(matches!(result, Err(AppError::AlreadyTaken(_))));

    Ok(())
}

#[test_context(BookingServiceContext)]
#[tokio::test]
async fn test_started_showing_reopens_from_store(ctx: &BookingServiceContext) -> Result<(), AppError> {
    let service = &ctx.app.booking_service;
    let hold = service
        .select_seats(ctx.showing_id, "holder-a", &seats(&[(1, 4)]), None)
        .await?;
    service.confirm_booking(hold.id, customer("Alan Turing")).await?;

    let sweeper = ExpirySweeper::new(ctx.app.ledger.clone(), std::time::Duration::from_secs(1));
    sweeper.sweep_once();
    assert!(ctx.app.ledger.is_open(ctx.showing_id));

    // The showing starts tomorrow
    ctx.app.clock.advance(Duration::days(2));
    sweeper.sweep_once();
    assert!(!ctx.app.ledger.is_open(ctx.showing_id));

    let map = service.get_seat_map(ctx.showing_id).await?;
    assert!(ctx.app.ledger.is_open(ctx.showing_id));
    assert_eq!(map.state(&Seat::new(1, 4)), Some(SeatState::Booked));
    assert_eq!(map.count(SeatState::Booked), 1);

    Ok(())
}

#[tokio::test]
async fn test_failed_persist_releases_seats() -> Result<(), AppError> {
    let app = TestApp::with_stores(
        Arc::new(MemoryCatalogStore::new()),
        Arc::new(FailingBookingStore),
        HoldPolicy::default(),
    );
    let (_, showing) = app.seed_showing(2, 2).await?;
    let service = &app.booking_service;

    let hold = service
        .select_seats(showing.id, "holder-a", &seats(&[(0, 0), (1, 1)]), None)
        .await?;
    let result = service.confirm_booking(hold.id, customer("Unlucky")).await;
    assert!(matches!(result, Err(AppError::DatabaseError(_))));

    // Neither booked nor still held
    let map = service.get_seat_map(showing.id).await?;
    assert_eq!(map.count(SeatState::Free), 4);
    assert!(matches!(
        service.confirm_booking(hold.id, customer("Unlucky")).await,
        Err(AppError::HoldNotFound(_))
    ));

    Ok(())
}

#[test_context(BookingServiceContext)]
#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_select_and_confirm(ctx: &BookingServiceContext) -> Result<(), AppError> {
    let test_name = "test_concurrent_select_and_confirm";
    let num_customers = 30;

    let mut set = JoinSet::new();
    for i in 0..num_customers {
        let service = ctx.app.booking_service.clone();
        let showing_id = ctx.showing_id;
        set.spawn(async move {
            let holder = format!("customer-{}", i);
            let hold = service
                .select_seats(showing_id, &holder, &seats(&[(4, 4), (4, 3)]), None)
                .await?;
            service
                .confirm_booking(hold.id, customer(&format!("Customer {}", i)))
                .await
        });
    }

    let mut booked = 0;
    let mut refused = 0;
    while let Some(result) = set.join_next().await {
        match result.expect("task panicked") {
            Ok(_) => booked += 1,
            Err(AppError::AlreadyTaken(_)) | Err(AppError::SeatUnavailable(_)) => refused += 1,
            Err(e) => panic!("Unexpected error: {:?}", e),
        }
    }

    test_println!(test_name, "{} booked, {} refused", booked, refused);
    assert_eq!(booked, 1);
    assert_eq!(refused, num_customers - 1);
    assert_eq!(ctx.app.booking_service.list_bookings(ctx.showing_id).await?.len(), 1);

    Ok(())
}
