use crate::models::seat::SeatGeometry;
use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, sqlx::FromRow)]
pub struct Cinema {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, sqlx::FromRow)]
pub struct Screen {
    pub id: i32,
    pub cinema_id: i32,
    pub name: String,
    pub rows: i32,
    pub row_width: i32,
}

impl Screen {
    pub fn geometry(&self) -> SeatGeometry {
        SeatGeometry::new(self.rows, self.row_width)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, sqlx::FromRow)]
pub struct Film {
    pub id: i32,
    pub name: String,
    pub length_minutes: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, sqlx::FromRow)]
pub struct Showing {
    pub id: i32,
    pub film_id: i32,
    pub screen_id: i32,
    pub time: DateTime<Utc>,
}

// Single row of the showing picker: a showing joined with its film and screen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, sqlx::FromRow)]
pub struct ShowingDetail {
    pub showing_id: i32,
    pub time: DateTime<Utc>,
    pub film_id: i32,
    pub film_name: String,
    pub length_minutes: i32,
    pub screen_id: i32,
    pub screen_name: String,
}

#[derive(Debug, Clone, Deserialize, JsonSchema, Validate)]
pub struct NewCinema {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, JsonSchema, Validate)]
pub struct NewScreen {
    pub cinema_id: i32,
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(range(min = 1, max = 100))]
    pub rows: i32,
    #[validate(range(min = 1, max = 100))]
    pub row_width: i32,
}

#[derive(Debug, Clone, Deserialize, JsonSchema, Validate)]
pub struct NewFilm {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(range(min = 1, max = 1000))]
    pub length_minutes: i32,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct NewShowing {
    pub film_id: i32,
    pub screen_id: i32,
    pub time: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct CinemaListResponse {
    pub cinemas: Vec<Cinema>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ScreenListResponse {
    pub screens: Vec<Screen>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct FilmListResponse {
    pub films: Vec<Film>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ShowingListResponse {
    pub showings: Vec<ShowingDetail>,
}
