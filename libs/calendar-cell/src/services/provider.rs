// libs/calendar-cell/src/services/provider.rs
use reqwest::Client;
use tracing::{debug, error, info};

use shared_config::AppConfig;

use crate::models::{CalendarError, MeetingEvent, MeetingEventRequest};

/// HTTP client for the meeting/calendar provider. Creates one event with a
/// join link per confirmed online appointment; callers decide how tolerant
/// they are of failures here.
#[derive(Debug)]
pub struct CalendarClient {
    client: Client,
    api_token: String,
    base_url: String,
}

impl CalendarClient {
    pub fn new(config: &AppConfig) -> Result<Self, CalendarError> {
        if !config.is_calendar_configured() {
            return Err(CalendarError::NotConfigured);
        }

        Ok(Self {
            client: Client::new(),
            api_token: config.calendar_api_token.clone(),
            base_url: config.calendar_api_base_url.clone(),
        })
    }

    /// Create a meeting event and return its id and join link.
    /// POST /v1/events
    pub async fn create_meeting_event(
        &self,
        request: MeetingEventRequest,
    ) -> Result<MeetingEvent, CalendarError> {
        info!("Creating meeting event: {}", request.subject);

        let url = format!("{}/v1/events", self.base_url);
        debug!("Sending meeting event request to: {}", url);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_token))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let response_text = response.text().await?;

        if !status.is_success() {
            error!("Meeting event creation failed: {} - {}", status, response_text);
            return Err(CalendarError::ProviderError {
                message: format!("HTTP {}: {}", status, response_text),
            });
        }

        let event: MeetingEvent = serde_json::from_str(&response_text).map_err(|e| {
            CalendarError::ProviderError {
                message: format!("Failed to parse event response: {}", e),
            }
        })?;

        info!("Meeting event created: {}", event.external_event_id);
        Ok(event)
    }
}
