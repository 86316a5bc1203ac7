use crate::models::booking::Booking;
use crate::models::cinema::{
    Cinema, Film, NewCinema, NewFilm, NewScreen, NewShowing, Screen, Showing, ShowingDetail,
};
use crate::models::seat::Seat;
use crate::store::{BookingStore, CatalogStore};
use crate::utils::error::{AppError, AppResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashSet};
use tokio::sync::RwLock;

#[derive(Default)]
struct CatalogTables {
    cinemas: BTreeMap<i32, Cinema>,
    screens: BTreeMap<i32, Screen>,
    films: BTreeMap<i32, Film>,
    showings: BTreeMap<i32, Showing>,
    last_id: i32,
}

impl CatalogTables {
    fn next_id(&mut self) -> i32 {
        self.last_id += 1;
        self.last_id
    }
}

/// Catalog kept in process memory, used by tests and the `memory` backend.
#[derive(Default)]
pub struct MemoryCatalogStore {
    tables: RwLock<CatalogTables>,
}

impl MemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CatalogStore for MemoryCatalogStore {
    async fn list_cinemas(&self) -> AppResult<Vec<Cinema>> {
        let tables = self.tables.read().await;
        let mut cinemas: Vec<Cinema> = tables.cinemas.values().cloned().collect();
        cinemas.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(cinemas)
    }

    async fn get_cinema(&self, cinema_id: i32) -> AppResult<Option<Cinema>> {
        Ok(self.tables.read().await.cinemas.get(&cinema_id).cloned())
    }

    async fn create_cinema(&self, cinema: NewCinema) -> AppResult<Cinema> {
        let mut tables = self.tables.write().await;
        let cinema = Cinema {
            id: tables.next_id(),
            name: cinema.name,
        };
        tables.cinemas.insert(cinema.id, cinema.clone());
        Ok(cinema)
    }

    async fn list_screens(&self, cinema_id: i32) -> AppResult<Vec<Screen>> {
        let tables = self.tables.read().await;
        Ok(tables
            .screens
            .values()
            .filter(|screen| screen.cinema_id == cinema_id)
            .cloned()
            .collect())
    }

    async fn get_screen(&self, screen_id: i32) -> AppResult<Option<Screen>> {
        Ok(self.tables.read().await.screens.get(&screen_id).cloned())
    }

    async fn create_screen(&self, screen: NewScreen) -> AppResult<Screen> {
        let mut tables = self.tables.write().await;
        if !tables.cinemas.contains_key(&screen.cinema_id) {
            return Err(AppError::NotFound(format!("Cinema {}", screen.cinema_id)));
        }

        let screen = Screen {
            id: tables.next_id(),
            cinema_id: screen.cinema_id,
            name: screen.name,
            rows: screen.rows,
            row_width: screen.row_width,
        };
        tables.screens.insert(screen.id, screen.clone());
        Ok(screen)
    }

    async fn list_films(&self) -> AppResult<Vec<Film>> {
        let tables = self.tables.read().await;
        let mut films: Vec<Film> = tables.films.values().cloned().collect();
        films.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(films)
    }

    async fn get_film(&self, film_id: i32) -> AppResult<Option<Film>> {
        Ok(self.tables.read().await.films.get(&film_id).cloned())
    }

    async fn create_film(&self, film: NewFilm) -> AppResult<Film> {
        let mut tables = self.tables.write().await;
        let film = Film {
            id: tables.next_id(),
            name: film.name,
            length_minutes: film.length_minutes,
        };
        tables.films.insert(film.id, film.clone());
        Ok(film)
    }

    async fn get_showing(&self, showing_id: i32) -> AppResult<Option<Showing>> {
        Ok(self.tables.read().await.showings.get(&showing_id).cloned())
    }

    async fn list_showings(&self, cinema_id: i32, from: DateTime<Utc>) -> AppResult<Vec<ShowingDetail>> {
        let tables = self.tables.read().await;
        let mut showings: Vec<ShowingDetail> = tables
            .showings
            .values()
            .filter(|showing| showing.time >= from)
            .filter_map(|showing| {
                let screen = tables.screens.get(&showing.screen_id)?;
                let film = tables.films.get(&showing.film_id)?;
                (screen.cinema_id == cinema_id).then(|| ShowingDetail {
                    showing_id: showing.id,
                    time: showing.time,
                    film_id: film.id,
                    film_name: film.name.clone(),
                    length_minutes: film.length_minutes,
                    screen_id: screen.id,
                    screen_name: screen.name.clone(),
                })
            })
            .collect();
        showings.sort_by_key(|showing| (showing.time, showing.showing_id));
        Ok(showings)
    }

    async fn create_showing(&self, showing: NewShowing) -> AppResult<Showing> {
        let mut tables = self.tables.write().await;
        if !tables.films.contains_key(&showing.film_id) {
            return Err(AppError::NotFound(format!("Film {}", showing.film_id)));
        }
        if !tables.screens.contains_key(&showing.screen_id) {
            return Err(AppError::NotFound(format!("Screen {}", showing.screen_id)));
        }

        let showing = Showing {
            id: tables.next_id(),
            film_id: showing.film_id,
            screen_id: showing.screen_id,
            time: showing.time,
        };
        tables.showings.insert(showing.id, showing.clone());
        Ok(showing)
    }
}

/// Bookings kept in process memory.
#[derive(Default)]
pub struct MemoryBookingStore {
    bookings: RwLock<Vec<Booking>>,
}

impl MemoryBookingStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BookingStore for MemoryBookingStore {
    async fn save_booking(&self, booking: &Booking) -> AppResult<()> {
        let mut bookings = self.bookings.write().await;

        // Same guarantee as the (showing, row, column) primary key of the SQL schema
        let taken: HashSet<Seat> = bookings
            .iter()
            .filter(|existing| existing.showing_id == booking.showing_id)
            .flat_map(|existing| existing.seats.iter().copied())
            .collect();
        let clashes: Vec<Seat> = booking
            .seats
            .iter()
            .filter(|seat| taken.contains(*seat))
            .copied()
            .collect();
        if !clashes.is_empty() {
            return Err(AppError::SeatUnavailable(clashes));
        }

        bookings.push(booking.clone());
        Ok(())
    }

    async fn list_bookings(&self, showing_id: i32) -> AppResult<Vec<Booking>> {
        let bookings = self.bookings.read().await;
        Ok(bookings
            .iter()
            .filter(|booking| booking.showing_id == showing_id)
            .cloned()
            .collect())
    }
}
