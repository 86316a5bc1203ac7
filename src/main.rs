use cinema_booking_system::config::BookingConfig;
use cinema_booking_system::utils::clock::SystemClock;
use cinema_booking_system::{assemble, build_rocket, sweeper_fairing};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[rocket::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cinema_booking_system=info,rocket=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let config = BookingConfig::from_env()?;
    info!(
        backend = %config.store_backend,
        expiry = %config.expiry_policy,
        "Starting cinema booking system"
    );

    let (catalog_service, booking_service) = assemble(&config, Arc::new(SystemClock)).await?;

    let mut rocket = build_rocket(catalog_service, booking_service.clone());
    if let Some(sweeper) = sweeper_fairing(&config, &booking_service) {
        rocket = rocket.attach(sweeper);
    }

    let _ = rocket.launch().await?;
    Ok(())
}
