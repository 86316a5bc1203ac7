use crate::models::cinema::{
    Cinema, CinemaListResponse, Film, FilmListResponse, NewCinema, NewFilm, NewScreen, NewShowing,
    Screen, ScreenListResponse, Showing, ShowingListResponse,
};
use crate::services::catalog_service::CatalogService;
use crate::utils::error::AppError;
use rocket::serde::json::Json;
use rocket::State;
use rocket_okapi::openapi;

/// List all cinemas
#[openapi(tag = "Cinemas")]
#[get("/cinemas")]
pub async fn list_cinemas(
    catalog_service: &State<CatalogService>,
) -> Result<Json<CinemaListResponse>, AppError> {
    let cinemas = catalog_service.list_cinemas().await?;
    Ok(Json(CinemaListResponse { cinemas }))
}

/// Create a cinema
#[openapi(tag = "Cinemas")]
#[post("/cinemas", format = "json", data = "<request>")]
pub async fn create_cinema(
    request: Json<NewCinema>,
    catalog_service: &State<CatalogService>,
) -> Result<Json<Cinema>, AppError> {
    let cinema = catalog_service.create_cinema(request.into_inner()).await?;
    Ok(Json(cinema))
}

/// List the screens of a cinema
#[openapi(tag = "Cinemas")]
#[get("/cinemas/<cinema_id>/screens")]
pub async fn list_screens(
    cinema_id: i32,
    catalog_service: &State<CatalogService>,
) -> Result<Json<ScreenListResponse>, AppError> {
    let screens = catalog_service.list_screens(cinema_id).await?;
    Ok(Json(ScreenListResponse { screens }))
}

/// Create a screen in a cinema
#[openapi(tag = "Cinemas")]
#[post("/screens", format = "json", data = "<request>")]
pub async fn create_screen(
    request: Json<NewScreen>,
    catalog_service: &State<CatalogService>,
) -> Result<Json<Screen>, AppError> {
    let screen = catalog_service.create_screen(request.into_inner()).await?;
    Ok(Json(screen))
}

/// List all films
#[openapi(tag = "Films")]
#[get("/films")]
pub async fn list_films(
    catalog_service: &State<CatalogService>,
) -> Result<Json<FilmListResponse>, AppError> {
    let films = catalog_service.list_films().await?;
    Ok(Json(FilmListResponse { films }))
}

/// Create a film
#[openapi(tag = "Films")]
#[post("/films", format = "json", data = "<request>")]
pub async fn create_film(
    request: Json<NewFilm>,
    catalog_service: &State<CatalogService>,
) -> Result<Json<Film>, AppError> {
    let film = catalog_service.create_film(request.into_inner()).await?;
    Ok(Json(film))
}

/// List upcoming showings at a cinema
#[openapi(tag = "Showings")]
#[get("/cinemas/<cinema_id>/showings")]
pub async fn list_showings(
    cinema_id: i32,
    catalog_service: &State<CatalogService>,
) -> Result<Json<ShowingListResponse>, AppError> {
    let showings = catalog_service.list_showings(cinema_id).await?;
    Ok(Json(ShowingListResponse { showings }))
}

/// Get a showing
#[openapi(tag = "Showings")]
#[get("/showings/<showing_id>")]
pub async fn get_showing(
    showing_id: i32,
    catalog_service: &State<CatalogService>,
) -> Result<Json<Showing>, AppError> {
    let showing = catalog_service.get_showing(showing_id).await?;
    Ok(Json(showing))
}

/// Schedule a film on a screen
#[openapi(tag = "Showings")]
#[post("/showings", format = "json", data = "<request>")]
pub async fn create_showing(
    request: Json<NewShowing>,
    catalog_service: &State<CatalogService>,
) -> Result<Json<Showing>, AppError> {
    let showing = catalog_service.create_showing(request.into_inner()).await?;
    Ok(Json(showing))
}
