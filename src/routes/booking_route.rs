use crate::models::booking::{
    AbandonResponse, Booking, BookingListResponse, BookingSummary, ConfirmBookingRequest, Hold,
    SelectSeatsRequest,
};
use crate::models::seat::SeatMapResponse;
use crate::services::booking_service::BookingService;
use crate::utils::error::AppError;
use rocket::serde::json::Json;
use rocket::State;
use rocket_okapi::openapi;
use uuid::Uuid;

fn parse_hold_id(hold_id: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(hold_id).map_err(|_| AppError::BadRequest(format!("Invalid hold id: {}", hold_id)))
}

/// Current state of every seat of a showing
#[openapi(tag = "Booking")]
#[get("/showings/<showing_id>/seats")]
pub async fn get_seat_map(
    showing_id: i32,
    booking_service: &State<BookingService>,
) -> Result<Json<SeatMapResponse>, AppError> {
    let seat_map = booking_service.get_seat_map(showing_id).await?;
    Ok(Json(SeatMapResponse::from(&seat_map)))
}

/// Confirmed bookings of a showing, without customer details
#[openapi(tag = "Booking")]
#[get("/showings/<showing_id>/bookings")]
pub async fn list_bookings(
    showing_id: i32,
    booking_service: &State<BookingService>,
) -> Result<Json<BookingListResponse>, AppError> {
    let bookings = booking_service.list_bookings(showing_id).await?;
    Ok(Json(BookingListResponse {
        bookings: bookings.into_iter().map(BookingSummary::from).collect(),
    }))
}

/// Hold seats for a showing
#[openapi(tag = "Booking")]
#[post("/showings/<showing_id>/holds", format = "json", data = "<request>")]
pub async fn select_seats(
    showing_id: i32,
    request: Json<SelectSeatsRequest>,
    booking_service: &State<BookingService>,
) -> Result<Json<Hold>, AppError> {
    let hold = booking_service
        .select_seats_request(showing_id, request.into_inner())
        .await?;
    Ok(Json(hold))
}

/// Turn a hold into a booking
#[openapi(tag = "Booking")]
#[post("/holds/<hold_id>/confirm", format = "json", data = "<request>")]
pub async fn confirm_booking(
    hold_id: String,
    request: Json<ConfirmBookingRequest>,
    booking_service: &State<BookingService>,
) -> Result<Json<Booking>, AppError> {
    let hold_id = parse_hold_id(&hold_id)?;
    let booking = booking_service
        .confirm_booking(hold_id, request.into_inner().customer)
        .await?;
    Ok(Json(booking))
}

/// Release a hold
#[openapi(tag = "Booking")]
#[delete("/holds/<hold_id>")]
pub async fn abandon_hold(
    hold_id: String,
    booking_service: &State<BookingService>,
) -> Result<Json<AbandonResponse>, AppError> {
    let hold_id = parse_hold_id(&hold_id)?;
    booking_service.abandon(hold_id).await?;
    Ok(Json(AbandonResponse {
        hold_id,
        status: "released".to_string(),
    }))
}
