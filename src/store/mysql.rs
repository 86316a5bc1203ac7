use crate::models::booking::{Booking, CustomerInfo};
use crate::models::cinema::{
    Cinema, Film, NewCinema, NewFilm, NewScreen, NewShowing, Screen, Showing, ShowingDetail,
};
use crate::models::seat::Seat;
use crate::store::{BookingStore, CatalogStore};
use crate::utils::error::{AppError, AppResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::MySqlPool;
use std::collections::HashMap;
use uuid::Uuid;

pub struct MySqlCatalogStore {
    pool: MySqlPool,
}

impl MySqlCatalogStore {
    pub fn new(pool: MySqlPool) -> Self {
        MySqlCatalogStore { pool }
    }
}

#[async_trait]
impl CatalogStore for MySqlCatalogStore {
    async fn list_cinemas(&self) -> AppResult<Vec<Cinema>> {
        let cinemas = sqlx::query_as::<_, Cinema>("SELECT id, name FROM cinema ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(cinemas)
    }

    async fn get_cinema(&self, cinema_id: i32) -> AppResult<Option<Cinema>> {
        let cinema = sqlx::query_as::<_, Cinema>("SELECT id, name FROM cinema WHERE id = ?")
            .bind(cinema_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(cinema)
    }

    async fn create_cinema(&self, cinema: NewCinema) -> AppResult<Cinema> {
        let result = sqlx::query("INSERT INTO cinema (name) VALUES (?)")
            .bind(&cinema.name)
            .execute(&self.pool)
            .await?;

        Ok(Cinema {
            id: result.last_insert_id() as i32,
            name: cinema.name,
        })
    }

    async fn list_screens(&self, cinema_id: i32) -> AppResult<Vec<Screen>> {
        let screens = sqlx::query_as::<_, Screen>(
            r#"
            SELECT id, cinema_id, name, `rows`, row_width
            FROM screen
            WHERE cinema_id = ?
            ORDER BY id
            "#,
        )
        .bind(cinema_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(screens)
    }

    async fn get_screen(&self, screen_id: i32) -> AppResult<Option<Screen>> {
        let screen = sqlx::query_as::<_, Screen>(
            "SELECT id, cinema_id, name, `rows`, row_width FROM screen WHERE id = ?",
        )
        .bind(screen_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(screen)
    }

    async fn create_screen(&self, screen: NewScreen) -> AppResult<Screen> {
        if self.get_cinema(screen.cinema_id).await?.is_none() {
            return Err(AppError::NotFound(format!("Cinema {}", screen.cinema_id)));
        }

        let result = sqlx::query(
            "INSERT INTO screen (cinema_id, name, `rows`, row_width) VALUES (?, ?, ?, ?)",
        )
        .bind(screen.cinema_id)
        .bind(&screen.name)
        .bind(screen.rows)
        .bind(screen.row_width)
        .execute(&self.pool)
        .await?;

        Ok(Screen {
            id: result.last_insert_id() as i32,
            cinema_id: screen.cinema_id,
            name: screen.name,
            rows: screen.rows,
            row_width: screen.row_width,
        })
    }

    async fn list_films(&self) -> AppResult<Vec<Film>> {
        let films =
            sqlx::query_as::<_, Film>("SELECT id, name, length_minutes FROM film ORDER BY name")
                .fetch_all(&self.pool)
                .await?;
        Ok(films)
    }

    async fn get_film(&self, film_id: i32) -> AppResult<Option<Film>> {
        let film =
            sqlx::query_as::<_, Film>("SELECT id, name, length_minutes FROM film WHERE id = ?")
                .bind(film_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(film)
    }

    async fn create_film(&self, film: NewFilm) -> AppResult<Film> {
        let result = sqlx::query("INSERT INTO film (name, length_minutes) VALUES (?, ?)")
            .bind(&film.name)
            .bind(film.length_minutes)
            .execute(&self.pool)
            .await?;

        Ok(Film {
            id: result.last_insert_id() as i32,
            name: film.name,
            length_minutes: film.length_minutes,
        })
    }

    async fn get_showing(&self, showing_id: i32) -> AppResult<Option<Showing>> {
        let showing = sqlx::query_as::<_, Showing>(
            "SELECT id, film_id, screen_id, `time` FROM showing WHERE id = ?",
        )
        .bind(showing_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(showing)
    }

    async fn list_showings(&self, cinema_id: i32, from: DateTime<Utc>) -> AppResult<Vec<ShowingDetail>> {
        let showings = sqlx::query_as::<_, ShowingDetail>(
            r#"
            SELECT
                sh.id AS showing_id,
                sh.`time` AS `time`,
                f.id AS film_id,
                f.name AS film_name,
                f.length_minutes,
                sc.id AS screen_id,
                sc.name AS screen_name
            FROM showing sh
            JOIN screen sc ON sh.screen_id = sc.id
            JOIN film f ON sh.film_id = f.id
            WHERE sc.cinema_id = ?
            AND sh.`time` >= ?
            ORDER BY sh.`time`, sh.id
            "#,
        )
        .bind(cinema_id)
        .bind(from)
        .fetch_all(&self.pool)
        .await?;
        Ok(showings)
    }

    async fn create_showing(&self, showing: NewShowing) -> AppResult<Showing> {
        if self.get_film(showing.film_id).await?.is_none() {
            return Err(AppError::NotFound(format!("Film {}", showing.film_id)));
        }
        if self.get_screen(showing.screen_id).await?.is_none() {
            return Err(AppError::NotFound(format!("Screen {}", showing.screen_id)));
        }

        let result = sqlx::query("INSERT INTO showing (film_id, screen_id, `time`) VALUES (?, ?, ?)")
            .bind(showing.film_id)
            .bind(showing.screen_id)
            .bind(showing.time)
            .execute(&self.pool)
            .await?;

        Ok(Showing {
            id: result.last_insert_id() as i32,
            film_id: showing.film_id,
            screen_id: showing.screen_id,
            time: showing.time,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct BookingRow {
    id: String,
    showing_id: i32,
    holder_id: String,
    customer_name: Option<String>,
    customer_email: Option<String>,
    confirmed_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct BookedSeatRow {
    booking_id: String,
    seat_row: i32,
    seat_column: i32,
}

pub struct MySqlBookingStore {
    pool: MySqlPool,
}

impl MySqlBookingStore {
    pub fn new(pool: MySqlPool) -> Self {
        MySqlBookingStore { pool }
    }
}

#[async_trait]
impl BookingStore for MySqlBookingStore {
    async fn save_booking(&self, booking: &Booking) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO booking (id, showing_id, holder_id, customer_name, customer_email, confirmed_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(booking.id.to_string())
        .bind(booking.showing_id)
        .bind(&booking.holder_id)
        .bind(booking.customer.as_ref().map(|c| c.name.clone()))
        .bind(booking.customer.as_ref().map(|c| c.email.clone()))
        .bind(booking.confirmed_at)
        .execute(&mut *tx)
        .await?;

        // The (showing_id, seat_row, seat_column) primary key rejects a second booking of a seat
        for seat in &booking.seats {
            sqlx::query(
                r#"
                INSERT INTO booked_seat (showing_id, seat_row, seat_column, booking_id)
                VALUES (?, ?, ?, ?)
                "#,
            )
            .bind(booking.showing_id)
            .bind(seat.row)
            .bind(seat.column)
            .bind(booking.id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|err| match &err {
                sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                    AppError::SeatUnavailable(vec![*seat])
                }
                _ => AppError::from(err),
            })?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn list_bookings(&self, showing_id: i32) -> AppResult<Vec<Booking>> {
        let rows = sqlx::query_as::<_, BookingRow>(
            r#"
            SELECT id, showing_id, holder_id, customer_name, customer_email, confirmed_at
            FROM booking
            WHERE showing_id = ?
            ORDER BY confirmed_at
            "#,
        )
        .bind(showing_id)
        .fetch_all(&self.pool)
        .await?;

        let seat_rows = sqlx::query_as::<_, BookedSeatRow>(
            r#"
            SELECT booking_id, seat_row, seat_column
            FROM booked_seat
            WHERE showing_id = ?
            ORDER BY seat_row, seat_column
            "#,
        )
        .bind(showing_id)
        .fetch_all(&self.pool)
        .await?;

        let mut seats: HashMap<String, Vec<Seat>> = HashMap::new();
        for row in seat_rows {
            seats
                .entry(row.booking_id)
                .or_default()
                .push(Seat::new(row.seat_row, row.seat_column));
        }

        rows.into_iter()
            .map(|row| {
                let id = Uuid::parse_str(&row.id)
                    .map_err(|e| AppError::DatabaseError(format!("Bad booking id {}: {}", row.id, e)))?;
                let customer = match (row.customer_name, row.customer_email) {
                    (Some(name), Some(email)) => Some(CustomerInfo { name, email }),
                    _ => None,
                };

                Ok(Booking {
                    id,
                    showing_id: row.showing_id,
                    holder_id: row.holder_id,
                    seats: seats.remove(&row.id).unwrap_or_default(),
                    confirmed_at: row.confirmed_at,
                    customer,
                })
            })
            .collect()
    }
}
