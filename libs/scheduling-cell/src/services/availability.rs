use anyhow::{anyhow, Result};
use chrono::{Duration, NaiveDate, Utc};
use reqwest::Method;
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{
    AvailabilityRule, AvailableSlot, BookedInterval, CreateAvailabilityRuleRequest,
    UpdateAvailabilityRuleRequest,
};
use crate::services::slots;

pub const MINUTES_PER_DAY: i32 = 1440;

pub struct AvailabilityService {
    supabase: SupabaseClient,
    session_minutes: i32,
}

impl AvailabilityService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
            session_minutes: config.session_duration_minutes as i32,
        }
    }

    /// Create a recurring availability window for a clinician.
    pub async fn create_rule(
        &self,
        clinician_id: Uuid,
        request: CreateAvailabilityRuleRequest,
    ) -> Result<AvailabilityRule> {
        debug!("Creating availability rule for clinician: {}", clinician_id);

        validate_window(request.day_of_week, request.start_minute, request.end_minute)?;

        self.check_rule_conflicts(
            clinician_id,
            request.day_of_week,
            request.start_minute,
            request.end_minute,
            None,
        )
        .await?;

        let rule_data = json!({
            "clinician_id": clinician_id,
            "day_of_week": request.day_of_week,
            "start_minute": request.start_minute,
            "end_minute": request.end_minute,
            "created_at": Utc::now().to_rfc3339(),
            "updated_at": Utc::now().to_rfc3339()
        });

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "Prefer",
            reqwest::header::HeaderValue::from_static("return=representation"),
        );

        let result: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::POST,
                "/rest/v1/availability_rules",
                Some(rule_data),
                Some(headers),
            )
            .await?;

        if result.is_empty() {
            return Err(anyhow!("Failed to create availability rule"));
        }

        let rule: AvailabilityRule = serde_json::from_value(result[0].clone())?;
        debug!("Availability rule created with ID: {}", rule.id);

        Ok(rule)
    }

    /// Update the window of an existing rule.
    pub async fn update_rule(
        &self,
        rule_id: Uuid,
        request: UpdateAvailabilityRuleRequest,
    ) -> Result<AvailabilityRule> {
        debug!("Updating availability rule: {}", rule_id);

        let current = self.get_rule_by_id(rule_id).await?;

        let start_minute = request.start_minute.unwrap_or(current.start_minute);
        let end_minute = request.end_minute.unwrap_or(current.end_minute);
        validate_window(current.day_of_week, start_minute, end_minute)?;

        self.check_rule_conflicts(
            current.clinician_id,
            current.day_of_week,
            start_minute,
            end_minute,
            Some(rule_id),
        )
        .await?;

        let mut update_data = serde_json::Map::new();
        if let Some(start) = request.start_minute {
            update_data.insert("start_minute".to_string(), json!(start));
        }
        if let Some(end) = request.end_minute {
            update_data.insert("end_minute".to_string(), json!(end));
        }
        update_data.insert("updated_at".to_string(), json!(Utc::now().to_rfc3339()));

        let path = format!("/rest/v1/availability_rules?id=eq.{}", rule_id);
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "Prefer",
            reqwest::header::HeaderValue::from_static("return=representation"),
        );

        let result: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::PATCH,
                &path,
                Some(Value::Object(update_data)),
                Some(headers),
            )
            .await?;

        if result.is_empty() {
            return Err(anyhow!("Failed to update availability rule"));
        }

        let updated: AvailabilityRule = serde_json::from_value(result[0].clone())?;
        Ok(updated)
    }

    /// All rules for a clinician, ordered by day then window start.
    pub async fn list_rules(&self, clinician_id: Uuid) -> Result<Vec<AvailabilityRule>> {
        debug!("Fetching availability rules for clinician: {}", clinician_id);

        let path = format!(
            "/rest/v1/availability_rules?clinician_id=eq.{}&order=day_of_week.asc,start_minute.asc",
            clinician_id
        );
        let result: Vec<Value> = self.supabase.request(Method::GET, &path, None).await?;

        let rules: Vec<AvailabilityRule> = result
            .into_iter()
            .map(serde_json::from_value)
            .collect::<std::result::Result<Vec<AvailabilityRule>, _>>()?;

        Ok(rules)
    }

    pub async fn delete_rule(&self, rule_id: Uuid) -> Result<()> {
        debug!("Deleting availability rule: {}", rule_id);

        let path = format!("/rest/v1/availability_rules?id=eq.{}", rule_id);
        let _: Vec<Value> = self.supabase.request(Method::DELETE, &path, None).await?;

        Ok(())
    }

    /// Every bookable session start for the clinician on `date`, as of now.
    pub async fn open_slots_for_date(
        &self,
        clinician_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<AvailableSlot>> {
        debug!("Calculating open slots for clinician {} on {}", clinician_id, date);

        let day_of_week = slots::day_of_week_index(date);
        let rules = self.rules_for_day(clinician_id, day_of_week).await?;

        if rules.is_empty() {
            debug!("Clinician {} has no rules for weekday {}", clinician_id, day_of_week);
            return Ok(vec![]);
        }

        let booked = self.booked_intervals_for_date(clinician_id, date).await?;

        let open = slots::open_slots(date, &rules, &booked, Utc::now(), self.session_minutes);

        debug!("Found {} open slots", open.len());
        Ok(open)
    }

    // Private helper methods

    async fn get_rule_by_id(&self, rule_id: Uuid) -> Result<AvailabilityRule> {
        let path = format!("/rest/v1/availability_rules?id=eq.{}", rule_id);
        let result: Vec<Value> = self.supabase.request(Method::GET, &path, None).await?;

        if result.is_empty() {
            return Err(anyhow!("Availability rule not found"));
        }

        let rule: AvailabilityRule = serde_json::from_value(result[0].clone())?;
        Ok(rule)
    }

    async fn rules_for_day(
        &self,
        clinician_id: Uuid,
        day_of_week: i32,
    ) -> Result<Vec<AvailabilityRule>> {
        let path = format!(
            "/rest/v1/availability_rules?clinician_id=eq.{}&day_of_week=eq.{}&order=start_minute.asc",
            clinician_id, day_of_week
        );
        let result: Vec<Value> = self.supabase.request(Method::GET, &path, None).await?;

        let rules: Vec<AvailabilityRule> = result
            .into_iter()
            .map(serde_json::from_value)
            .collect::<std::result::Result<Vec<AvailabilityRule>, _>>()?;

        Ok(rules)
    }

    async fn booked_intervals_for_date(
        &self,
        clinician_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<BookedInterval>> {
        let start_of_day = date.and_time(chrono::NaiveTime::MIN).and_utc();
        let end_of_day = start_of_day + Duration::days(1);

        let path = format!(
            "/rest/v1/appointments?clinician_id=eq.{}&start_time=gte.{}&start_time=lt.{}&status=neq.cancelled&select=start_time,end_time,status&order=start_time.asc",
            clinician_id,
            urlencoding::encode(&start_of_day.to_rfc3339()),
            urlencoding::encode(&end_of_day.to_rfc3339())
        );

        let result: Vec<Value> = self.supabase.request(Method::GET, &path, None).await?;

        let booked: Vec<BookedInterval> = result
            .into_iter()
            .map(serde_json::from_value)
            .collect::<std::result::Result<Vec<BookedInterval>, _>>()?;

        Ok(booked)
    }

    async fn check_rule_conflicts(
        &self,
        clinician_id: Uuid,
        day_of_week: i32,
        start_minute: i32,
        end_minute: i32,
        exclude_id: Option<Uuid>,
    ) -> Result<()> {
        let mut path = format!(
            "/rest/v1/availability_rules?clinician_id=eq.{}&day_of_week=eq.{}",
            clinician_id, day_of_week
        );

        if let Some(id) = exclude_id {
            path.push_str(&format!("&id=neq.{}", id));
        }

        let existing: Vec<Value> = self.supabase.request(Method::GET, &path, None).await?;

        for rule in existing {
            let existing_start = rule["start_minute"].as_i64().unwrap_or(0) as i32;
            let existing_end = rule["end_minute"].as_i64().unwrap_or(MINUTES_PER_DAY as i64) as i32;

            if start_minute < existing_end && end_minute > existing_start {
                return Err(anyhow!(
                    "Availability rule conflicts with existing window {} - {}",
                    existing_start,
                    existing_end
                ));
            }
        }

        Ok(())
    }
}

fn validate_window(day_of_week: i32, start_minute: i32, end_minute: i32) -> Result<()> {
    if !(0..=6).contains(&day_of_week) {
        return Err(anyhow!("Day of week must be between 0 (Sunday) and 6 (Saturday)"));
    }
    if start_minute < 0 || start_minute >= end_minute || end_minute > MINUTES_PER_DAY {
        return Err(anyhow!(
            "Window must satisfy 0 <= start < end <= {} minutes",
            MINUTES_PER_DAY
        ));
    }
    Ok(())
}
