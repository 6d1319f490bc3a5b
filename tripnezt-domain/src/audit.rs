use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Append-only record of a lead status change.
///
/// Written in the same transaction as the status update it describes;
/// never updated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: Uuid,
    pub action: String,
    pub booking_id: Uuid,
    pub old_status: String,
    pub new_status: String,
    pub trip_name: String,
    pub guests: i32,
    pub created_at: DateTime<Utc>,
}

impl AuditEntry {
    pub fn status_changed(
        booking_id: Uuid,
        old_status: &str,
        new_status: &str,
        trip_name: &str,
        guests: i32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            action: "status_changed".to_string(),
            booking_id,
            old_status: old_status.to_string(),
            new_status: new_status.to_string(),
            trip_name: trip_name.to_string(),
            guests,
            created_at: Utc::now(),
        }
    }
}
