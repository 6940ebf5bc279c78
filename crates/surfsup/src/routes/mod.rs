pub mod error;
pub mod home;
pub mod observations;

pub use error::ErrorResponse;
pub use home::*;
pub use observations::*;
