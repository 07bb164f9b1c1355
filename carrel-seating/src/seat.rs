use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};

/// Seat lifecycle status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SeatStatus {
    Available,
    Occupied,
    Maintenance,
    Reserved,
}

impl SeatStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SeatStatus::Available => "AVAILABLE",
            SeatStatus::Occupied => "OCCUPIED",
            SeatStatus::Maintenance => "MAINTENANCE",
            SeatStatus::Reserved => "RESERVED",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SeatType {
    Standard,
    Premium,
    Vip,
}

impl SeatType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SeatType::Standard => "STANDARD",
            SeatType::Premium => "PREMIUM",
            SeatType::Vip => "VIP",
        }
    }
}

/// Grid position on the floor plan
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

/// A bookable seat. Identity is (seat_number, section), unique together.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Seat {
    pub id: Uuid,
    pub seat_number: String,
    pub section: String,
    pub floor: i32,
    pub seat_type: SeatType,
    pub position: Position,
    pub features: Vec<String>,
    pub status: SeatStatus,
    pub current_booking: Option<Uuid>,
    pub last_maintenance: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Seat {
    pub fn new(seat_number: String, section: String, floor: i32, seat_type: SeatType, position: Position) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            seat_number,
            section,
            floor,
            seat_type,
            position,
            features: Vec::new(),
            status: SeatStatus::Available,
            current_booking: None,
            last_maintenance: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Reserve the seat for a booking. Only an Available seat can be reserved.
    pub fn reserve(&mut self, booking_id: Uuid) -> Result<(), SeatError> {
        if self.status != SeatStatus::Available {
            return Err(SeatError::NotAvailable {
                seat_number: self.seat_number.clone(),
                status: self.status.as_str(),
            });
        }
        self.status = SeatStatus::Reserved;
        self.current_booking = Some(booking_id);
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Release the seat back to Available. Invariant: current_booking is
    /// non-null only while status is Reserved or Occupied.
    pub fn release(&mut self) {
        self.status = SeatStatus::Available;
        self.current_booking = None;
        self.updated_at = Utc::now();
    }

    /// Move the seat into maintenance, stamping last_maintenance.
    pub fn begin_maintenance(&mut self) -> Result<(), SeatError> {
        if matches!(self.status, SeatStatus::Reserved | SeatStatus::Occupied) {
            return Err(SeatError::NotAvailable {
                seat_number: self.seat_number.clone(),
                status: self.status.as_str(),
            });
        }
        self.status = SeatStatus::Maintenance;
        self.last_maintenance = Some(Utc::now());
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn is_bookable(&self) -> bool {
        self.status == SeatStatus::Available
    }

    /// Invariant check used by tests and the admin summary.
    pub fn pointer_consistent(&self) -> bool {
        match self.status {
            SeatStatus::Reserved | SeatStatus::Occupied => self.current_booking.is_some(),
            SeatStatus::Available => self.current_booking.is_none(),
            SeatStatus::Maintenance => true,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SeatError {
    #[error("Seat not found: {0}")]
    NotFound(String),

    #[error("Seat {seat_number} is not available (status {status})")]
    NotAvailable {
        seat_number: String,
        status: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seat() -> Seat {
        Seat::new("A-12".to_string(), "A".to_string(), 1, SeatType::Standard, Position { x: 3, y: 4 })
    }

    #[test]
    fn test_reserve_release_cycle() {
        let mut s = seat();
        let booking = Uuid::new_v4();

        s.reserve(booking).unwrap();
        assert_eq!(s.status, SeatStatus::Reserved);
        assert_eq!(s.current_booking, Some(booking));
        assert!(s.pointer_consistent());

        s.release();
        assert_eq!(s.status, SeatStatus::Available);
        assert!(s.current_booking.is_none());
        assert!(s.pointer_consistent());
    }

    #[test]
    fn test_reserve_rejected_when_not_available() {
        let mut s = seat();
        s.reserve(Uuid::new_v4()).unwrap();

        let result = s.reserve(Uuid::new_v4());
        assert!(result.is_err());
    }

    #[test]
    fn test_maintenance_stamps_timestamp() {
        let mut s = seat();
        assert!(s.last_maintenance.is_none());
        s.begin_maintenance().unwrap();
        assert_eq!(s.status, SeatStatus::Maintenance);
        assert!(s.last_maintenance.is_some());
    }

    #[test]
    fn test_maintenance_rejected_while_reserved() {
        let mut s = seat();
        s.reserve(Uuid::new_v4()).unwrap();
        assert!(s.begin_maintenance().is_err());
    }
}
