use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeetingEventRequest {
    pub subject: String,
    pub start_time: DateTime<Utc>,
    pub duration_minutes: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeetingEvent {
    pub external_event_id: String,
    pub join_link: String,
}

#[derive(Debug, Error)]
pub enum CalendarError {
    #[error("Calendar provider is not configured")]
    NotConfigured,

    #[error("Calendar provider error: {message}")]
    ProviderError { message: String },

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),
}
