use crate::models::seat::{format_seats, Seat};
use rocket::http::ContentType;
use rocket::http::Status;
use rocket::response::Responder;
use rocket::Request;
use rocket::Response;
use rocket_okapi::JsonSchema;
use serde::Serialize;
use serde_json::json;
use std::io::Cursor;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug, Serialize, JsonSchema)]
pub enum AppError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid seat {0}")]
    InvalidSeat(Seat),

    #[error("Seats unavailable: {}", format_seats(.0))]
    SeatUnavailable(Vec<Seat>),

    #[error("Seats already taken: {}", format_seats(.0))]
    AlreadyTaken(Vec<Seat>),

    #[error("Hold {0} has expired")]
    HoldExpired(Uuid),

    #[error("Hold {0} not found")]
    HoldNotFound(Uuid),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl AppError {
    pub fn status(&self) -> Status {
        match self {
            AppError::NotFound(_) | AppError::HoldNotFound(_) => Status::NotFound,
            AppError::InvalidSeat(_) | AppError::ValidationError(_) | AppError::BadRequest(_) => {
                Status::BadRequest
            }
            AppError::SeatUnavailable(_) | AppError::AlreadyTaken(_) => Status::Conflict,
            AppError::HoldExpired(_) => Status::Gone,
            AppError::DatabaseError(_) | AppError::Configuration(_) => Status::InternalServerError,
        }
    }
}

// Convert sqlx::Error (database error) to AppError::DatabaseError
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::DatabaseError(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::ValidationError(err.to_string())
    }
}

// Define a type alias for the result type
pub type AppResult<T> = Result<T, AppError>;

// Format all errors from the service layer as a JSON HTTP response at route level
#[rocket::async_trait]
impl<'r> Responder<'r, 'static> for AppError {
    fn respond_to(self, _: &'r Request<'_>) -> rocket::response::Result<'static> {
        let status = self.status();
        if status == Status::InternalServerError {
            tracing::error!("Request failed: {}", self);
        }

        let json = json!({
            "error": self.to_string()
        });

        Response::build()
            .status(status)
            .header(ContentType::JSON)
            .sized_body(None, Cursor::new(json.to_string()))
            .ok()
    }
}
