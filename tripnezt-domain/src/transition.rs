use crate::booking::BookingStatus;

/// The legal status transitions for a lead.
///
/// Any non-terminal status may move to any other status; Rejected and
/// Cancelled accept nothing further. Same-status moves are rejected so
/// seat reconciliation stays exactly-once.
pub struct TransitionTable;

impl TransitionTable {
    pub fn is_allowed(from: BookingStatus, to: BookingStatus) -> bool {
        use BookingStatus::*;
        match from {
            Rejected | Cancelled => false,
            PendingReview => matches!(to, InDiscussion | Approved | Waitlisted | Rejected | Cancelled),
            InDiscussion => matches!(to, PendingReview | Approved | Waitlisted | Rejected | Cancelled),
            Approved => matches!(to, PendingReview | InDiscussion | Waitlisted | Rejected | Cancelled),
            Waitlisted => matches!(to, PendingReview | InDiscussion | Approved | Rejected | Cancelled),
        }
    }

    pub fn check(from: BookingStatus, to: BookingStatus) -> Result<(), TransitionError> {
        if Self::is_allowed(from, to) {
            Ok(())
        } else {
            Err(TransitionError::InvalidTransition {
                from: from.as_str().to_string(),
                to: to.as_str().to_string(),
            })
        }
    }
}

/// Seat-counter delta for a status transition.
///
/// +guests when a booking enters Approved, -guests when it leaves,
/// zero for every transition that stays on one side of the boundary.
pub fn seat_adjustment(from: BookingStatus, to: BookingStatus, guests: i32) -> i32 {
    let was_approved = from == BookingStatus::Approved;
    let now_approved = to == BookingStatus::Approved;
    match (was_approved, now_approved) {
        (false, true) => guests,
        (true, false) => -guests,
        _ => 0,
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TransitionError {
    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use BookingStatus::*;

    #[test]
    fn non_terminal_states_move_freely() {
        assert!(TransitionTable::is_allowed(PendingReview, InDiscussion));
        assert!(TransitionTable::is_allowed(PendingReview, Approved));
        assert!(TransitionTable::is_allowed(InDiscussion, Waitlisted));
        assert!(TransitionTable::is_allowed(Waitlisted, Approved));
        assert!(TransitionTable::is_allowed(Approved, Cancelled));
    }

    #[test]
    fn terminal_states_accept_nothing() {
        for to in [PendingReview, InDiscussion, Approved, Waitlisted, Cancelled] {
            assert!(!TransitionTable::is_allowed(Rejected, to));
        }
        for to in [PendingReview, InDiscussion, Approved, Waitlisted, Rejected] {
            assert!(!TransitionTable::is_allowed(Cancelled, to));
        }
    }

    #[test]
    fn same_status_is_rejected() {
        for status in [PendingReview, InDiscussion, Approved, Waitlisted] {
            assert!(!TransitionTable::is_allowed(status, status));
        }
    }

    #[test]
    fn check_reports_the_offending_pair() {
        let err = TransitionTable::check(Cancelled, Approved).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid status transition from Cancelled to Approved"
        );
    }

    #[test]
    fn entering_approved_increments() {
        assert_eq!(seat_adjustment(PendingReview, Approved, 3), 3);
        assert_eq!(seat_adjustment(Waitlisted, Approved, 2), 2);
    }

    #[test]
    fn leaving_approved_decrements() {
        assert_eq!(seat_adjustment(Approved, Cancelled, 3), -3);
        assert_eq!(seat_adjustment(Approved, Waitlisted, 2), -2);
    }

    #[test]
    fn transitions_away_from_the_boundary_are_neutral() {
        assert_eq!(seat_adjustment(PendingReview, InDiscussion, 4), 0);
        assert_eq!(seat_adjustment(Waitlisted, Rejected, 4), 0);
        assert_eq!(seat_adjustment(Approved, Approved, 4), 0);
    }
}
