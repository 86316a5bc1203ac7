pub mod booking_service;
pub mod catalog_service;
pub mod expiry_sweeper;
pub mod reservation_ledger;
