use crate::seat::SeatType;
use serde::{Deserialize, Serialize};

/// Per-unit rates for one seat type, in cents.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SeatRates {
    pub hourly_cents: i64,
    pub daily_cents: i64,
    pub weekly_cents: i64,
    pub monthly_cents: i64,
}

/// Rate table used to quote bookings server-side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateCard {
    pub standard: SeatRates,
    pub premium: SeatRates,
    pub vip: SeatRates,
}

impl Default for RateCard {
    fn default() -> Self {
        Self {
            standard: SeatRates {
                hourly_cents: 200,
                daily_cents: 1200,
                weekly_cents: 6000,
                monthly_cents: 20000,
            },
            premium: SeatRates {
                hourly_cents: 350,
                daily_cents: 2000,
                weekly_cents: 10000,
                monthly_cents: 34000,
            },
            vip: SeatRates {
                hourly_cents: 500,
                daily_cents: 3000,
                weekly_cents: 15000,
                monthly_cents: 50000,
            },
        }
    }
}

impl RateCard {
    pub fn rates_for(&self, seat_type: SeatType) -> SeatRates {
        match seat_type {
            SeatType::Standard => self.standard,
            SeatType::Premium => self.premium,
            SeatType::Vip => self.vip,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rates_increase_by_tier() {
        let card = RateCard::default();
        assert!(card.rates_for(SeatType::Premium).hourly_cents > card.rates_for(SeatType::Standard).hourly_cents);
        assert!(card.rates_for(SeatType::Vip).monthly_cents > card.rates_for(SeatType::Premium).monthly_cents);
    }
}
