pub mod clock;
pub mod error;
pub mod swagger_doc;
