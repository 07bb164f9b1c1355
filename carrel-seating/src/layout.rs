use crate::seat::{Seat, SeatStatus};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-section occupancy counts for the dashboard floor plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionOccupancy {
    pub section: String,
    pub total: usize,
    pub available: usize,
    pub reserved: usize,
    pub occupied: usize,
    pub maintenance: usize,
}

impl SectionOccupancy {
    fn empty(section: String) -> Self {
        Self {
            section,
            total: 0,
            available: 0,
            reserved: 0,
            occupied: 0,
            maintenance: 0,
        }
    }

    fn count(&mut self, seat: &Seat) {
        self.total += 1;
        match seat.status {
            SeatStatus::Available => self.available += 1,
            SeatStatus::Reserved => self.reserved += 1,
            SeatStatus::Occupied => self.occupied += 1,
            SeatStatus::Maintenance => self.maintenance += 1,
        }
    }
}

/// Aggregated view over the whole seat inventory.
pub struct FloorPlan;

impl FloorPlan {
    /// Group seats into per-section occupancy rows, ordered by section name.
    pub fn summarize(seats: &[Seat]) -> Vec<SectionOccupancy> {
        let mut sections: BTreeMap<&str, SectionOccupancy> = BTreeMap::new();
        for seat in seats {
            sections
                .entry(seat.section.as_str())
                .or_insert_with(|| SectionOccupancy::empty(seat.section.clone()))
                .count(seat);
        }
        sections.into_values().collect()
    }

    /// Fraction of non-maintenance seats currently reserved or occupied.
    pub fn utilization(seats: &[Seat]) -> f64 {
        let in_service = seats.iter().filter(|s| s.status != SeatStatus::Maintenance).count();
        if in_service == 0 {
            return 0.0;
        }
        let taken = seats
            .iter()
            .filter(|s| matches!(s.status, SeatStatus::Reserved | SeatStatus::Occupied))
            .count();
        taken as f64 / in_service as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seat::{Position, SeatType};
    use uuid::Uuid;

    fn seat(section: &str, status: SeatStatus) -> Seat {
        let mut s = Seat::new(
            format!("{}-1", section),
            section.to_string(),
            1,
            SeatType::Standard,
            Position { x: 0, y: 0 },
        );
        if status == SeatStatus::Reserved {
            s.reserve(Uuid::new_v4()).unwrap();
        } else {
            s.status = status;
        }
        s
    }

    #[test]
    fn test_summarize_groups_by_section() {
        let seats = vec![
            seat("A", SeatStatus::Available),
            seat("A", SeatStatus::Reserved),
            seat("B", SeatStatus::Maintenance),
        ];

        let summary = FloorPlan::summarize(&seats);
        assert_eq!(summary.len(), 2);
        assert_eq!(summary[0].section, "A");
        assert_eq!(summary[0].total, 2);
        assert_eq!(summary[0].available, 1);
        assert_eq!(summary[0].reserved, 1);
        assert_eq!(summary[1].maintenance, 1);
    }

    #[test]
    fn test_utilization_excludes_maintenance() {
        let seats = vec![
            seat("A", SeatStatus::Reserved),
            seat("A", SeatStatus::Available),
            seat("B", SeatStatus::Maintenance),
        ];

        let utilization = FloorPlan::utilization(&seats);
        assert!((utilization - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_utilization_empty_inventory() {
        assert_eq!(FloorPlan::utilization(&[]), 0.0);
    }
}
