use assert_matches::assert_matches;
use chrono::Utc;
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use calendar_cell::models::{CalendarError, MeetingEventRequest};
use calendar_cell::services::CalendarClient;
use shared_config::AppConfig;

fn test_config(base_url: &str) -> AppConfig {
    AppConfig {
        supabase_url: "http://localhost:54321".to_string(),
        supabase_anon_key: "test-anon-key".to_string(),
        calendar_api_base_url: base_url.to_string(),
        calendar_api_token: "test-calendar-token".to_string(),
        session_duration_minutes: 30,
    }
}

fn event_request() -> MeetingEventRequest {
    MeetingEventRequest {
        subject: "Online session".to_string(),
        start_time: Utc::now(),
        duration_minutes: 30,
    }
}

#[test]
fn missing_credentials_is_not_configured() {
    let mut config = test_config("");
    config.calendar_api_token = String::new();

    assert_matches!(CalendarClient::new(&config), Err(CalendarError::NotConfigured));
}

#[tokio::test]
async fn create_meeting_event_returns_join_link() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/events"))
        .and(header("Authorization", "Bearer test-calendar-token"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "external_event_id": "evt-123",
            "join_link": "https://meet.example.com/evt-123"
        })))
        .mount(&mock_server)
        .await;

    let client = CalendarClient::new(&test_config(&mock_server.uri())).unwrap();
    let event = client.create_meeting_event(event_request()).await.unwrap();

    assert_eq!(event.external_event_id, "evt-123");
    assert_eq!(event.join_link, "https://meet.example.com/evt-123");
}

#[tokio::test]
async fn provider_failure_surfaces_as_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/events"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream down"))
        .mount(&mock_server)
        .await;

    let client = CalendarClient::new(&test_config(&mock_server.uri())).unwrap();
    let result = client.create_meeting_event(event_request()).await;

    assert_matches!(result, Err(CalendarError::ProviderError { .. }));
}
