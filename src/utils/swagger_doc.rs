use crate::models::seat::Seat;
use crate::utils::error::AppError;
use indexmap::IndexMap;
use okapi::openapi3::SchemaObject;
use rocket::http::Status;
use rocket_okapi::gen::OpenApiGenerator;
use rocket_okapi::okapi::openapi3::RefOr;
use rocket_okapi::okapi::openapi3::{MediaType, Response, Responses};
use rocket_okapi::response::OpenApiResponderInner;
use serde_json::json;
use uuid::Uuid;

impl<'r> OpenApiResponderInner for AppError {
    fn responses(_gen: &mut OpenApiGenerator) -> rocket_okapi::Result<Responses> {
        let mut responses = Responses::default();

        // One example per status code
        let error_responses = [
            (
                Status::BadRequest,
                "Bad Request",
                AppError::InvalidSeat(Seat::new(12, 3)),
            ),
            (
                Status::NotFound,
                "Not Found",
                AppError::NotFound("Showing 42".to_string()),
            ),
            (
                Status::Conflict,
                "Conflict",
                AppError::SeatUnavailable(vec![Seat::new(0, 0), Seat::new(0, 1)]),
            ),
            (Status::Gone, "Gone", AppError::HoldExpired(Uuid::nil())),
            (
                Status::InternalServerError,
                "Internal Server Error",
                AppError::DatabaseError("Internal Server Error".to_string()),
            ),
        ];

        for (status, description, error) in error_responses {
            responses.responses.insert(
                status.code.to_string(),
                RefOr::Object(Response {
                    description: description.to_string(),
                    content: {
                        let mut content = IndexMap::new();
                        content.insert(
                            "application/json".to_string(),
                            MediaType {
                                schema: Some(SchemaObject::default()),
                                example: Some(json!({
                                    "error": error.to_string()
                                })),
                                ..Default::default()
                            },
                        );
                        content
                    },
                    ..Default::default()
                }),
            );
        }

        Ok(responses)
    }
}
