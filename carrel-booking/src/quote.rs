use crate::models::{BookingType, Price};
use carrel_seating::pricing::SeatRates;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Server-side price computation for a booking request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quote {
    pub units: i64,
    pub unit_cents: i64,
    pub base_cents: i64,
    pub tax_cents: i64,
    pub total_cents: i64,
    pub currency: String,
}

/// Billed units for the interval, rounded up to whole units.
pub fn billed_units(start: DateTime<Utc>, end: DateTime<Utc>, booking_type: BookingType) -> i64 {
    let minutes = (end - start).num_minutes().max(0);
    let unit_minutes = match booking_type {
        BookingType::Hourly => 60,
        BookingType::Daily => 60 * 24,
        BookingType::Weekly => 60 * 24 * 7,
        BookingType::Monthly => 60 * 24 * 30,
    };
    // Ceiling division; a zero-length interval never reaches here.
    (minutes + unit_minutes - 1) / unit_minutes
}

pub fn quote(
    rates: SeatRates,
    booking_type: BookingType,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    tax_rate: f64,
    currency: &str,
) -> Quote {
    let unit_cents = match booking_type {
        BookingType::Hourly => rates.hourly_cents,
        BookingType::Daily => rates.daily_cents,
        BookingType::Weekly => rates.weekly_cents,
        BookingType::Monthly => rates.monthly_cents,
    };
    let units = billed_units(start, end, booking_type);
    let base_cents = unit_cents * units;
    let tax_cents = (base_cents as f64 * tax_rate).round() as i64;

    Quote {
        units,
        unit_cents,
        base_cents,
        tax_cents,
        total_cents: base_cents + tax_cents,
        currency: currency.to_string(),
    }
}

impl Quote {
    pub fn into_price(self) -> Price {
        Price {
            amount_cents: self.total_cents,
            currency: self.currency,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn rates() -> SeatRates {
        SeatRates {
            hourly_cents: 200,
            daily_cents: 1200,
            weekly_cents: 6000,
            monthly_cents: 20000,
        }
    }

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 2, hour, minute, 0).unwrap()
    }

    #[test]
    fn test_hourly_units_round_up() {
        assert_eq!(billed_units(at(10, 0), at(12, 0), BookingType::Hourly), 2);
        assert_eq!(billed_units(at(10, 0), at(12, 1), BookingType::Hourly), 3);
        assert_eq!(billed_units(at(10, 0), at(10, 30), BookingType::Hourly), 1);
    }

    #[test]
    fn test_quote_applies_tax() {
        let q = quote(rates(), BookingType::Hourly, at(10, 0), at(12, 0), 0.10, "USD");
        assert_eq!(q.units, 2);
        assert_eq!(q.base_cents, 400);
        assert_eq!(q.tax_cents, 40);
        assert_eq!(q.total_cents, 440);
        assert_eq!(q.currency, "USD");
    }

    #[test]
    fn test_daily_quote() {
        let start = Utc.with_ymd_and_hms(2025, 6, 2, 9, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 6, 5, 9, 0, 0).unwrap();
        let q = quote(rates(), BookingType::Daily, start, end, 0.0, "USD");
        assert_eq!(q.units, 3);
        assert_eq!(q.total_cents, 3600);
    }
}
