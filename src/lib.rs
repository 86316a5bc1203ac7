#[macro_use]
extern crate rocket;
extern crate rocket_okapi;

pub mod config;
pub mod db;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;
pub mod swagger;
pub mod utils;

use crate::config::{BookingConfig, ExpiryPolicy, StoreBackend};
use crate::db::Database;
use crate::services::booking_service::{BookingService, HoldPolicy};
use crate::services::catalog_service::CatalogService;
use crate::services::expiry_sweeper::ExpirySweeper;
use crate::services::reservation_ledger::ReservationLedger;
use crate::store::{
    BookingStore, CatalogStore, MemoryBookingStore, MemoryCatalogStore, MySqlBookingStore,
    MySqlCatalogStore,
};
use crate::swagger::swagger_ui;
use crate::utils::clock::Clock;
use crate::utils::error::{AppError, AppResult};
use rocket::fairing::AdHoc;
use rocket::{Build, Rocket};
use rocket_okapi::openapi_get_routes;
use rocket_okapi::swagger_ui::make_swagger_ui;
use std::sync::Arc;
use tracing::{error, info};

/// Connect the stores selected by `config` and wire the services on top of them.
pub async fn assemble(
    config: &BookingConfig,
    clock: Arc<dyn Clock>,
) -> AppResult<(CatalogService, BookingService)> {
    let (catalog, bookings): (Arc<dyn CatalogStore>, Arc<dyn BookingStore>) =
        match config.store_backend {
            StoreBackend::Memory => {
                info!("Using in-memory store");
                (
                    Arc::new(MemoryCatalogStore::new()),
                    Arc::new(MemoryBookingStore::new()),
                )
            }
            StoreBackend::Mysql => {
                let url = config.database_url.as_deref().ok_or_else(|| {
                    AppError::Configuration("DATABASE_URL must be set".to_string())
                })?;
                let database = Database::new(url).await?;
                database.init_schema().await?;
                info!("Connected to MySQL store");

                let pool = database.get_pool().clone();
                (
                    Arc::new(MySqlCatalogStore::new(pool.clone())),
                    Arc::new(MySqlBookingStore::new(pool)),
                )
            }
        };

    let retention = chrono::Duration::from_std(config.expired_hold_retention)
        .map_err(|e| AppError::Configuration(e.to_string()))?;
    let ledger = Arc::new(ReservationLedger::new(clock.clone(), retention));

    let catalog_service = CatalogService::new(catalog.clone(), clock);
    let booking_service = BookingService::new(
        catalog,
        bookings,
        ledger,
        HoldPolicy::from_config(config)?,
    );

    Ok((catalog_service, booking_service))
}

/// Mount every API route plus the Swagger UI.
pub fn build_rocket(catalog_service: CatalogService, booking_service: BookingService) -> Rocket<Build> {
    rocket::build()
        .manage(catalog_service)
        .manage(booking_service)
        .mount(
            "/api",
            openapi_get_routes![
                routes::cinema_route::list_cinemas,
                routes::cinema_route::create_cinema,
                routes::cinema_route::list_screens,
                routes::cinema_route::create_screen,
                routes::cinema_route::list_films,
                routes::cinema_route::create_film,
                routes::cinema_route::list_showings,
                routes::cinema_route::get_showing,
                routes::cinema_route::create_showing,
                routes::booking_route::get_seat_map,
                routes::booking_route::list_bookings,
                routes::booking_route::select_seats,
                routes::booking_route::confirm_booking,
                routes::booking_route::abandon_hold,
            ],
        )
        .mount("/swagger", make_swagger_ui(&swagger_ui()))
        .attach(AdHoc::on_response("CORS", |_, res| {
            Box::pin(async move {
                res.set_header(rocket::http::Header::new(
                    "Access-Control-Allow-Origin",
                    "*",
                ));
            })
        }))
}

/// Start the expiry sweeper once the server is up, when the config asks for one.
pub fn sweeper_fairing(config: &BookingConfig, booking_service: &BookingService) -> Option<AdHoc> {
    if config.expiry_policy != ExpiryPolicy::Sweep {
        return None;
    }

    let sweeper = ExpirySweeper::new(booking_service.ledger().clone(), config.sweep_interval);
    Some(AdHoc::on_liftoff("Hold expiry sweeper", move |_| {
        Box::pin(async move {
            let handle = sweeper.spawn();
            tokio::spawn(async move {
                if let Err(e) = handle.await {
                    error!("Hold expiry sweeper stopped: {}", e);
                }
            });
        })
    }))
}
