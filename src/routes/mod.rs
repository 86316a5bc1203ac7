pub mod booking_route;
pub mod cinema_route;
