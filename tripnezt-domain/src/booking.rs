use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tripnezt_shared::Masked;
use uuid::Uuid;

/// Lifecycle status of a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookingStatus {
    #[serde(rename = "Pending Review")]
    PendingReview,
    #[serde(rename = "In Discussion")]
    InDiscussion,
    Approved,
    Waitlisted,
    Rejected,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::PendingReview => "Pending Review",
            BookingStatus::InDiscussion => "In Discussion",
            BookingStatus::Approved => "Approved",
            BookingStatus::Waitlisted => "Waitlisted",
            BookingStatus::Rejected => "Rejected",
            BookingStatus::Cancelled => "Cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Pending Review" => Some(BookingStatus::PendingReview),
            "In Discussion" => Some(BookingStatus::InDiscussion),
            "Approved" => Some(BookingStatus::Approved),
            "Waitlisted" => Some(BookingStatus::Waitlisted),
            "Rejected" => Some(BookingStatus::Rejected),
            "Cancelled" => Some(BookingStatus::Cancelled),
            _ => None,
        }
    }

    /// Rejected and Cancelled accept no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, BookingStatus::Rejected | BookingStatus::Cancelled)
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single reservation request against a trip.
///
/// Trip name and price are denormalized at submission time so a lead stays
/// readable even if the trip is later edited or deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub trip_id: Uuid,
    pub trip_name: String,
    pub trip_price: Option<i32>,
    /// None is a guest submission.
    pub user_id: Option<Uuid>,
    pub full_name: String,
    pub whatsapp_number: Masked<String>,
    pub notes: Option<String>,
    pub travel_date: NaiveDate,
    pub guests: i32,
    pub total_amount: Option<i32>,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The caller-supplied part of a booking submission.
#[derive(Debug, Clone, Deserialize)]
pub struct BookingRequest {
    pub full_name: String,
    pub whatsapp_number: String,
    pub notes: Option<String>,
    pub travel_date: NaiveDate,
    pub guests: i32,
}

impl BookingRequest {
    /// Trip price times guest count; None when the trip has no price.
    pub fn total_amount(&self, trip_price: Option<i32>) -> Option<i32> {
        trip_price.map(|p| p * self.guests)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_strings() {
        for status in [
            BookingStatus::PendingReview,
            BookingStatus::InDiscussion,
            BookingStatus::Approved,
            BookingStatus::Waitlisted,
            BookingStatus::Rejected,
            BookingStatus::Cancelled,
        ] {
            assert_eq!(BookingStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(BookingStatus::parse("Pending"), None);
    }

    #[test]
    fn status_serde_uses_display_strings() {
        let json = serde_json::to_string(&BookingStatus::PendingReview).unwrap();
        assert_eq!(json, "\"Pending Review\"");
        let back: BookingStatus = serde_json::from_str("\"In Discussion\"").unwrap();
        assert_eq!(back, BookingStatus::InDiscussion);
    }

    #[test]
    fn total_amount_multiplies_price_by_guests() {
        let req = BookingRequest {
            full_name: "Asha".to_string(),
            whatsapp_number: "9876543210".to_string(),
            notes: None,
            travel_date: NaiveDate::from_ymd_opt(2026, 3, 14).unwrap(),
            guests: 3,
        };
        assert_eq!(req.total_amount(Some(12000)), Some(36000));
        assert_eq!(req.total_amount(None), None);
    }
}
