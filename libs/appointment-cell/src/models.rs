// libs/appointment-cell/src/models.rs
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub clinician_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: AppointmentStatus,
    pub appointment_type: AppointmentType,
    pub meet_link: Option<String>,
    pub cancellation_kind: Option<CancellationKind>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Closed status enumeration. Any appointment whose status is not Cancelled
/// occupies its time interval exclusively.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Completed,
    Absent,
    Cancelled,
}

impl AppointmentStatus {
    pub fn blocks_slot(&self) -> bool {
        *self != AppointmentStatus::Cancelled
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Pending => write!(f, "pending"),
            AppointmentStatus::Confirmed => write!(f, "confirmed"),
            AppointmentStatus::Completed => write!(f, "completed"),
            AppointmentStatus::Absent => write!(f, "absent"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentType {
    Online,
    // Legacy rows use the Portuguese name for in-person sessions.
    #[serde(alias = "presencial")]
    InPerson,
}

impl fmt::Display for AppointmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentType::Online => write!(f, "online"),
            AppointmentType::InPerson => write!(f, "in_person"),
        }
    }
}

/// Distinguishes billable late cancellations from free ones in clinician
/// history views.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum CancellationKind {
    Free,
    Late,
}

impl fmt::Display for CancellationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CancellationKind::Free => write!(f, "free"),
            CancellationKind::Late => write!(f, "late"),
        }
    }
}

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookAppointmentRequest {
    pub patient_id: Uuid,
    pub clinician_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub appointment_type: AppointmentType,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelAppointmentRequest {
    pub reason: Option<String>,
    #[serde(default)]
    pub acknowledge_late_cancellation: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppointmentDayQuery {
    pub date: NaiveDate,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, thiserror::Error)]
pub enum AppointmentError {
    #[error("Appointment not found")]
    NotFound,

    #[error("Slot no longer available")]
    SlotNotAvailable,

    #[error("Invalid appointment time: {0}")]
    InvalidTime(String),

    #[error("Appointment cannot be modified in current status: {0}")]
    InvalidStatusTransition(AppointmentStatus),

    #[error("Late cancellation requires explicit acknowledgment")]
    LateCancellationNeedsAcknowledgment,

    #[error("Database error: {0}")]
    DatabaseError(String),
}
