use crate::models::cinema::{
    Cinema, Film, NewCinema, NewFilm, NewScreen, NewShowing, Screen, Showing, ShowingDetail,
};
use crate::store::CatalogStore;
use crate::utils::clock::Clock;
use crate::utils::error::{AppError, AppResult};
use std::sync::Arc;
use tracing::info;
use validator::Validate;

#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn CatalogStore>,
    clock: Arc<dyn Clock>,
}

impl CatalogService {
    pub fn new(store: Arc<dyn CatalogStore>, clock: Arc<dyn Clock>) -> Self {
        CatalogService { store, clock }
    }

    pub async fn list_cinemas(&self) -> AppResult<Vec<Cinema>> {
        self.store.list_cinemas().await
    }

    pub async fn create_cinema(&self, request: NewCinema) -> AppResult<Cinema> {
        request.validate()?;
        let cinema = self.store.create_cinema(request).await?;
        info!(cinema_id = cinema.id, name = %cinema.name, "Cinema created");
        Ok(cinema)
    }

    pub async fn list_screens(&self, cinema_id: i32) -> AppResult<Vec<Screen>> {
        self.require_cinema(cinema_id).await?;
        self.store.list_screens(cinema_id).await
    }

    pub async fn create_screen(&self, request: NewScreen) -> AppResult<Screen> {
        request.validate()?;
        let screen = self.store.create_screen(request).await?;
        info!(
            screen_id = screen.id,
            cinema_id = screen.cinema_id,
            rows = screen.rows,
            row_width = screen.row_width,
            "Screen created"
        );
        Ok(screen)
    }

    pub async fn list_films(&self) -> AppResult<Vec<Film>> {
        self.store.list_films().await
    }

    pub async fn create_film(&self, request: NewFilm) -> AppResult<Film> {
        request.validate()?;
        let film = self.store.create_film(request).await?;
        info!(film_id = film.id, name = %film.name, "Film created");
        Ok(film)
    }

    // Upcoming showings only: the booking flow never offers one that already started
    pub async fn list_showings(&self, cinema_id: i32) -> AppResult<Vec<ShowingDetail>> {
        self.require_cinema(cinema_id).await?;
        self.store.list_showings(cinema_id, self.clock.now()).await
    }

    pub async fn get_showing(&self, showing_id: i32) -> AppResult<Showing> {
        self.store
            .get_showing(showing_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Showing {}", showing_id)))
    }

    pub async fn create_showing(&self, request: NewShowing) -> AppResult<Showing> {
        let showing = self.store.create_showing(request).await?;
        info!(
            showing_id = showing.id,
            film_id = showing.film_id,
            screen_id = showing.screen_id,
            time = %showing.time,
            "Showing created"
        );
        Ok(showing)
    }

    async fn require_cinema(&self, cinema_id: i32) -> AppResult<Cinema> {
        self.store
            .get_cinema(cinema_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Cinema {}", cinema_id)))
    }
}
