use crate::booking::BookingStatus;
use crate::trip::SeatSnapshot;

/// Decide the initial status of a new booking from seat availability.
///
/// Evaluated in order, first match wins:
/// 1. enough seats -> Approved (auto-approve trips) or Pending Review
/// 2. short on seats but at least the waitlist threshold left -> Waitlisted
/// 3. otherwise -> Rejected
///
/// Unlimited-capacity trips always take the first row.
pub fn decide_admission(seats: &SeatSnapshot, guests: i32) -> BookingStatus {
    let has_room = match seats.available_seats() {
        Some(available) => available >= guests,
        None => true,
    };

    if has_room {
        if seats.auto_approve {
            BookingStatus::Approved
        } else {
            BookingStatus::PendingReview
        }
    } else {
        // available_seats is Some here: unlimited trips always have room
        let available = seats.available_seats().unwrap_or(0);
        if available >= seats.waitlist_threshold {
            BookingStatus::Waitlisted
        } else {
            BookingStatus::Rejected
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seats(total: Option<i32>, booked: i32, auto_approve: bool, threshold: i32) -> SeatSnapshot {
        SeatSnapshot {
            total_seats: total,
            booked_seats: booked,
            auto_approve,
            waitlist_threshold: threshold,
        }
    }

    #[test]
    fn enough_seats_with_auto_approve_is_approved() {
        let s = seats(Some(10), 4, true, 2);
        assert_eq!(decide_admission(&s, 6), BookingStatus::Approved);
    }

    #[test]
    fn enough_seats_without_auto_approve_is_pending() {
        let s = seats(Some(10), 4, false, 2);
        assert_eq!(decide_admission(&s, 6), BookingStatus::PendingReview);
    }

    #[test]
    fn short_on_seats_above_threshold_is_waitlisted() {
        // 3 seats left, 5 requested, threshold 2
        let s = seats(Some(10), 7, false, 2);
        assert_eq!(decide_admission(&s, 5), BookingStatus::Waitlisted);
    }

    #[test]
    fn below_threshold_is_rejected() {
        // 1 seat left, threshold 2
        let s = seats(Some(10), 9, false, 2);
        assert_eq!(decide_admission(&s, 4), BookingStatus::Rejected);
    }

    #[test]
    fn full_trip_is_rejected() {
        let s = seats(Some(10), 10, true, 2);
        assert_eq!(decide_admission(&s, 1), BookingStatus::Rejected);
    }

    #[test]
    fn unlimited_capacity_always_has_room() {
        let pending = seats(None, 9999, false, 2);
        assert_eq!(decide_admission(&pending, 50), BookingStatus::PendingReview);

        let approved = seats(None, 9999, true, 2);
        assert_eq!(decide_admission(&approved, 50), BookingStatus::Approved);
    }

    // Scenario: 10 seats, 8 booked, threshold 2, no auto-approve.
    // A 2-guest booking stays pending; after the operator approves it the
    // trip is full and a 1-guest booking is rejected outright.
    #[test]
    fn end_to_end_scenario() {
        let before = seats(Some(10), 8, false, 2);
        assert_eq!(decide_admission(&before, 2), BookingStatus::PendingReview);
        assert_eq!(before.booked_seats, 8);

        let after_approval = seats(Some(10), 10, false, 2);
        assert_eq!(decide_admission(&after_approval, 1), BookingStatus::Rejected);
    }
}
