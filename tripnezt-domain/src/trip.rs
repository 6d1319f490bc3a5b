use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum number of gallery images a trip may carry.
pub const GALLERY_MAX: usize = 6;

/// Default waitlist threshold applied when a trip does not set one.
pub const DEFAULT_WAITLIST_THRESHOLD: i32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DurationType {
    Days,
    Nights,
    Hours,
}

impl DurationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DurationType::Days => "Days",
            DurationType::Nights => "Nights",
            DurationType::Hours => "Hours",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Days" => Some(DurationType::Days),
            "Nights" => Some(DurationType::Nights),
            "Hours" => Some(DurationType::Hours),
            _ => None,
        }
    }
}

/// One day of a trip's itinerary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItineraryDay {
    pub day: i32,
    pub title: String,
    pub description: String,
}

/// A bookable travel package.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trip {
    pub id: Uuid,
    pub title: String,
    pub location: String,
    pub state: String,
    /// Price in whole rupees. None means price on request.
    pub price: Option<i32>,
    pub duration: i32,
    pub duration_type: DurationType,
    pub category: String,
    pub description: String,
    pub highlights: Vec<String>,
    pub cover_image: String,
    pub gallery: Vec<String>,
    pub itinerary: Vec<ItineraryDay>,
    /// None means genuinely unlimited capacity.
    pub total_seats: Option<i32>,
    pub booked_seats: i32,
    pub auto_approve: bool,
    pub waitlist_threshold: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Trip {
    pub fn seat_snapshot(&self) -> SeatSnapshot {
        SeatSnapshot {
            total_seats: self.total_seats,
            booked_seats: self.booked_seats,
            auto_approve: self.auto_approve,
            waitlist_threshold: self.waitlist_threshold,
        }
    }
}

/// The seat-accounting fields of a trip, read under lock at decision time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeatSnapshot {
    pub total_seats: Option<i32>,
    pub booked_seats: i32,
    pub auto_approve: bool,
    pub waitlist_threshold: i32,
}

impl SeatSnapshot {
    /// Remaining seats, or None when capacity is unlimited.
    pub fn available_seats(&self) -> Option<i32> {
        self.total_seats.map(|total| total - self.booked_seats)
    }

    /// Whether committing `guests` more seats would exceed capacity.
    pub fn would_overcommit(&self, guests: i32) -> bool {
        match self.total_seats {
            Some(total) => self.booked_seats + guests > total,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn available_seats_subtracts_booked() {
        let seats = SeatSnapshot {
            total_seats: Some(10),
            booked_seats: 8,
            auto_approve: false,
            waitlist_threshold: 2,
        };
        assert_eq!(seats.available_seats(), Some(2));
        assert!(!seats.would_overcommit(2));
        assert!(seats.would_overcommit(3));
    }

    #[test]
    fn unlimited_capacity_never_overcommits() {
        let seats = SeatSnapshot {
            total_seats: None,
            booked_seats: 500,
            auto_approve: true,
            waitlist_threshold: 2,
        };
        assert_eq!(seats.available_seats(), None);
        assert!(!seats.would_overcommit(1000));
    }
}
