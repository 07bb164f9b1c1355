pub mod models;
pub mod lifecycle;
pub mod availability;
pub mod quote;

pub use models::{Booking, BookingStatus, BookingType, PaymentStatus, Price};
pub use lifecycle::BookingError;
pub use quote::Quote;
