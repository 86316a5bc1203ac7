pub mod memory;
pub mod mysql;

use crate::models::booking::Booking;
use crate::models::cinema::{
    Cinema, Film, NewCinema, NewFilm, NewScreen, NewShowing, Screen, Showing, ShowingDetail,
};
use crate::utils::error::AppResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

pub use memory::{MemoryBookingStore, MemoryCatalogStore};
pub use mysql::{MySqlBookingStore, MySqlCatalogStore};

/// Read/create access to cinemas, screens, films and showings.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn list_cinemas(&self) -> AppResult<Vec<Cinema>>;

    async fn get_cinema(&self, cinema_id: i32) -> AppResult<Option<Cinema>>;

    async fn create_cinema(&self, cinema: NewCinema) -> AppResult<Cinema>;

    async fn list_screens(&self, cinema_id: i32) -> AppResult<Vec<Screen>>;

    async fn get_screen(&self, screen_id: i32) -> AppResult<Option<Screen>>;

    async fn create_screen(&self, screen: NewScreen) -> AppResult<Screen>;

    async fn list_films(&self) -> AppResult<Vec<Film>>;

    async fn get_film(&self, film_id: i32) -> AppResult<Option<Film>>;

    async fn create_film(&self, film: NewFilm) -> AppResult<Film>;

    async fn get_showing(&self, showing_id: i32) -> AppResult<Option<Showing>>;

    /// Showings at a cinema starting at or after `from`, earliest first.
    async fn list_showings(&self, cinema_id: i32, from: DateTime<Utc>) -> AppResult<Vec<ShowingDetail>>;

    async fn create_showing(&self, showing: NewShowing) -> AppResult<Showing>;
}

/// Durable record of confirmed bookings.
#[async_trait]
pub trait BookingStore: Send + Sync {
    async fn save_booking(&self, booking: &Booking) -> AppResult<()>;

    async fn list_bookings(&self, showing_id: i32) -> AppResult<Vec<Booking>>;
}
