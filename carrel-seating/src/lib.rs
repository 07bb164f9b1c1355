pub mod seat;
pub mod layout;
pub mod pricing;

pub use seat::{Seat, SeatStatus, SeatType, Position, SeatError};
pub use layout::{SectionOccupancy, FloorPlan};
pub use pricing::RateCard;
