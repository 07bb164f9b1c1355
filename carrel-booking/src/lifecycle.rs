use crate::models::BookingStatus;

/// The closed transition table for bookings.
///
/// Pending   -> Confirmed | Cancelled
/// Confirmed -> Completed | Cancelled
/// Completed and Cancelled are terminal.
pub fn can_transition(from: BookingStatus, to: BookingStatus) -> bool {
    use BookingStatus::*;
    matches!(
        (from, to),
        (Pending, Confirmed) | (Pending, Cancelled) | (Confirmed, Completed) | (Confirmed, Cancelled)
    )
}

/// Validate a requested transition, returning the typed error handlers map to 400.
pub fn ensure_transition(from: BookingStatus, to: BookingStatus) -> Result<(), BookingError> {
    if can_transition(from, to) {
        Ok(())
    } else {
        Err(BookingError::InvalidTransition {
            from: from.as_str(),
            to: to.as_str(),
        })
    }
}

/// Whether arriving at `to` releases the booking's seat.
///
/// Cancelled releases only if the seat still points at this booking;
/// Completed releases unconditionally. The conditional part is enforced by
/// the storage layer, which holds the seat pointer.
pub fn releases_seat(to: BookingStatus) -> bool {
    matches!(to, BookingStatus::Cancelled | BookingStatus::Completed)
}

#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("Booking not found: {0}")]
    NotFound(String),

    #[error("Invalid state transition from {from} to {to}")]
    InvalidTransition {
        from: &'static str,
        to: &'static str,
    },

    #[error("Booking interval is invalid: start must be before end")]
    InvalidInterval,

    #[error("Seat is not available for the requested interval")]
    SeatUnavailable,

    #[error("Requested interval overlaps booking {0}")]
    Overlap(uuid::Uuid),

    #[error("Booking policy violation: {0}")]
    PolicyViolation(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use BookingStatus::*;

    #[test]
    fn test_booking_lifecycle() {
        // Pending -> Confirmed -> Completed
        assert!(can_transition(Pending, Confirmed));
        assert!(can_transition(Confirmed, Completed));

        // Cancellation from either live state
        assert!(can_transition(Pending, Cancelled));
        assert!(can_transition(Confirmed, Cancelled));
    }

    #[test]
    fn test_terminal_states_are_closed() {
        for to in [Pending, Confirmed, Completed, Cancelled] {
            assert!(!can_transition(Completed, to));
            assert!(!can_transition(Cancelled, to));
        }
    }

    #[test]
    fn test_no_resurrection_or_skips() {
        // The generic status endpoint must reject these rather than trust the caller.
        assert!(!can_transition(Completed, Pending));
        assert!(!can_transition(Pending, Completed));
        assert!(!can_transition(Pending, Pending));
        assert!(!can_transition(Confirmed, Pending));
    }

    #[test]
    fn test_ensure_transition_error_names_states() {
        let err = ensure_transition(Completed, Pending).unwrap_err();
        match err {
            BookingError::InvalidTransition { from, to } => {
                assert_eq!(from, "COMPLETED");
                assert_eq!(to, "PENDING");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_release_rules() {
        assert!(releases_seat(Cancelled));
        assert!(releases_seat(Completed));
        assert!(!releases_seat(Confirmed));
        assert!(!releases_seat(Pending));
    }
}
