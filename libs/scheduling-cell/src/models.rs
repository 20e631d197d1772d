use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A recurring weekly window during which a clinician accepts bookings.
/// Times are minutes since midnight, clinic time, half-open `[start, end)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityRule {
    pub id: Uuid,
    pub clinician_id: Uuid,
    pub day_of_week: i32, // 0 = Sunday, 1 = Monday, etc.
    pub start_minute: i32,
    pub end_minute: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A candidate session start produced by the slot calculator. Derived data,
/// never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailableSlot {
    pub label: String, // "HH:MM", the client-facing contract
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

/// The slice of an appointment row the calculator needs for conflict checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookedInterval {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[serde(default)]
    pub status: Option<String>,
}

impl BookedInterval {
    /// Cancelled bookings release their interval; everything else occupies it.
    pub fn blocks_slot(&self) -> bool {
        self.status.as_deref() != Some("cancelled")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAvailabilityRuleRequest {
    pub day_of_week: i32,
    pub start_minute: i32,
    pub end_minute: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateAvailabilityRuleRequest {
    pub start_minute: Option<i32>,
    pub end_minute: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenSlotsQuery {
    pub date: NaiveDate,
}
