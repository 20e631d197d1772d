use chrono::{Datelike, Duration, NaiveTime, Utc};
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use scheduling_cell::models::CreateAvailabilityRuleRequest;
use scheduling_cell::services::AvailabilityService;
use shared_config::AppConfig;

fn test_config(mock_server: &MockServer) -> AppConfig {
    AppConfig {
        supabase_url: mock_server.uri(),
        supabase_anon_key: "test-anon-key".to_string(),
        calendar_api_base_url: String::new(),
        calendar_api_token: String::new(),
        session_duration_minutes: 30,
    }
}

fn rule_row(clinician_id: Uuid, day_of_week: i32, start_minute: i32, end_minute: i32) -> serde_json::Value {
    json!({
        "id": Uuid::new_v4(),
        "clinician_id": clinician_id,
        "day_of_week": day_of_week,
        "start_minute": start_minute,
        "end_minute": end_minute,
        "created_at": "2024-01-01T00:00:00Z",
        "updated_at": "2024-01-01T00:00:00Z"
    })
}

#[tokio::test]
async fn create_rule_rejects_invalid_windows() {
    let mock_server = MockServer::start().await;
    let service = AvailabilityService::new(&test_config(&mock_server));
    let clinician_id = Uuid::new_v4();

    // Validation fails before any request is issued, so no mocks are needed.
    let bad_day = CreateAvailabilityRuleRequest {
        day_of_week: 7,
        start_minute: 420,
        end_minute: 690,
    };
    assert!(service.create_rule(clinician_id, bad_day).await.is_err());

    let inverted = CreateAvailabilityRuleRequest {
        day_of_week: 2,
        start_minute: 690,
        end_minute: 420,
    };
    assert!(service.create_rule(clinician_id, inverted).await.is_err());

    let past_midnight = CreateAvailabilityRuleRequest {
        day_of_week: 2,
        start_minute: 1400,
        end_minute: 1450,
    };
    assert!(service.create_rule(clinician_id, past_midnight).await.is_err());
}

#[tokio::test]
async fn create_rule_rejects_overlapping_windows() {
    let mock_server = MockServer::start().await;
    let clinician_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/availability_rules"))
        .and(query_param("clinician_id", format!("eq.{}", clinician_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            rule_row(clinician_id, 2, 420, 690)
        ])))
        .mount(&mock_server)
        .await;

    let service = AvailabilityService::new(&test_config(&mock_server));
    let overlapping = CreateAvailabilityRuleRequest {
        day_of_week: 2,
        start_minute: 600,
        end_minute: 780,
    };

    let result = service.create_rule(clinician_id, overlapping).await;
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("conflicts"));
}

#[tokio::test]
async fn create_rule_persists_when_window_is_free() {
    let mock_server = MockServer::start().await;
    let clinician_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/availability_rules"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/availability_rules"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            rule_row(clinician_id, 2, 870, 1050)
        ])))
        .mount(&mock_server)
        .await;

    let service = AvailabilityService::new(&test_config(&mock_server));
    let request = CreateAvailabilityRuleRequest {
        day_of_week: 2,
        start_minute: 870,
        end_minute: 1050,
    };

    let rule = service.create_rule(clinician_id, request).await.unwrap();
    assert_eq!(rule.clinician_id, clinician_id);
    assert_eq!(rule.start_minute, 870);
    assert_eq!(rule.end_minute, 1050);
}

#[tokio::test]
async fn open_slots_excludes_booked_intervals() {
    let mock_server = MockServer::start().await;
    let clinician_id = Uuid::new_v4();

    // A date far enough out that every notice deadline is still open.
    let date = (Utc::now() + Duration::days(7)).date_naive();
    let day_of_week = date.weekday().num_days_from_sunday() as i32;

    Mock::given(method("GET"))
        .and(path("/rest/v1/availability_rules"))
        .and(query_param("day_of_week", format!("eq.{}", day_of_week)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            rule_row(clinician_id, day_of_week, 420, 690)
        ])))
        .mount(&mock_server)
        .await;

    let booked_start = date
        .and_time(NaiveTime::from_hms_opt(8, 0, 0).unwrap())
        .and_utc();
    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "start_time": booked_start,
                "end_time": booked_start + Duration::minutes(30),
                "status": "confirmed"
            }
        ])))
        .mount(&mock_server)
        .await;

    let service = AvailabilityService::new(&test_config(&mock_server));
    let slots = service.open_slots_for_date(clinician_id, date).await.unwrap();

    let labels: Vec<&str> = slots.iter().map(|s| s.label.as_str()).collect();
    assert_eq!(slots.len(), 8);
    assert!(!labels.contains(&"08:00"));
    assert!(labels.contains(&"07:00"));
    assert!(labels.contains(&"11:00"));
}

#[tokio::test]
async fn open_slots_is_empty_without_rules() {
    let mock_server = MockServer::start().await;
    let clinician_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/availability_rules"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let service = AvailabilityService::new(&test_config(&mock_server));
    let date = (Utc::now() + Duration::days(7)).date_naive();

    let slots = service.open_slots_for_date(clinician_id, date).await.unwrap();
    assert!(slots.is_empty());
}
