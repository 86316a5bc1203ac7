pub mod booking;
pub mod cinema;
pub mod seat;
