// libs/appointment-cell/src/services/booking.rs
use std::sync::Arc;

use chrono::{DateTime, Duration as ChronoDuration, NaiveDate, Utc};
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info, warn};
use uuid::Uuid;

use calendar_cell::models::MeetingEventRequest;
use calendar_cell::services::CalendarClient;
use scheduling_cell::services::AvailabilityService;
use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{
    Appointment, AppointmentError, AppointmentStatus, AppointmentType, BookAppointmentRequest,
    CancelAppointmentRequest,
};
use crate::services::lifecycle::AppointmentLifecycleService;

pub struct BookingService {
    supabase: Arc<SupabaseClient>,
    availability_service: AvailabilityService,
    lifecycle_service: AppointmentLifecycleService,
    calendar_client: Option<CalendarClient>,
    session_minutes: i32,
}

impl BookingService {
    pub fn new(config: &AppConfig) -> Self {
        let calendar_client = match CalendarClient::new(config) {
            Ok(client) => Some(client),
            Err(_) => {
                warn!("Calendar provider not configured - meeting links will not be attached");
                None
            }
        };

        Self {
            supabase: Arc::new(SupabaseClient::new(config)),
            availability_service: AvailabilityService::new(config),
            lifecycle_service: AppointmentLifecycleService::new(),
            calendar_client,
            session_minutes: config.session_duration_minutes as i32,
        }
    }

    /// Book a slot for a patient. The slot list a client saw may be stale by
    /// the time it submits, so availability is recomputed against live data
    /// here; a lost race surfaces as `SlotNotAvailable`, never as a crash.
    pub async fn book_appointment(
        &self,
        request: BookAppointmentRequest,
    ) -> Result<Appointment, AppointmentError> {
        info!(
            "Booking appointment for patient {} with clinician {} at {}",
            request.patient_id, request.clinician_id, request.start_time
        );

        let now = Utc::now();
        if request.start_time <= now {
            return Err(AppointmentError::InvalidTime(
                "Appointment must be scheduled for a future time".to_string(),
            ));
        }

        // Commit-time re-validation of the slot calculator.
        let open = self
            .availability_service
            .open_slots_for_date(request.clinician_id, request.start_time.date_naive())
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        if !open.iter().any(|slot| slot.start_time == request.start_time) {
            warn!(
                "Slot {} no longer available for clinician {}",
                request.start_time, request.clinician_id
            );
            return Err(AppointmentError::SlotNotAvailable);
        }

        let end_time = request.start_time + ChronoDuration::minutes(self.session_minutes as i64);

        let appointment_data = json!({
            "patient_id": request.patient_id,
            "clinician_id": request.clinician_id,
            "start_time": request.start_time.to_rfc3339(),
            "end_time": end_time.to_rfc3339(),
            "status": AppointmentStatus::Pending.to_string(),
            "appointment_type": request.appointment_type.to_string(),
            "created_at": now.to_rfc3339(),
            "updated_at": now.to_rfc3339()
        });

        let appointment = self.insert_appointment(appointment_data).await?;

        info!("Appointment {} booked in pending status", appointment.id);
        Ok(appointment)
    }

    /// Confirm a pending appointment. Online sessions get a meeting link from
    /// the calendar provider; a provider failure is logged and tolerated, the
    /// confirmation stands and the link can be attached later.
    pub async fn confirm_appointment(
        &self,
        appointment_id: Uuid,
    ) -> Result<Appointment, AppointmentError> {
        debug!("Confirming appointment: {}", appointment_id);

        let current = self.get_appointment(appointment_id).await?;
        self.lifecycle_service
            .validate_status_transition(&current.status, &AppointmentStatus::Confirmed)?;

        let mut confirmed = self
            .patch_appointment(
                appointment_id,
                json!({
                    "status": AppointmentStatus::Confirmed.to_string(),
                    "updated_at": Utc::now().to_rfc3339()
                }),
            )
            .await?;

        if confirmed.appointment_type == AppointmentType::Online {
            if let Some(link) = self.request_meeting_link(&confirmed).await {
                confirmed = self
                    .patch_appointment(
                        appointment_id,
                        json!({
                            "meet_link": link,
                            "updated_at": Utc::now().to_rfc3339()
                        }),
                    )
                    .await
                    .unwrap_or(confirmed);
            }
        }

        info!("Appointment {} confirmed", appointment_id);
        Ok(confirmed)
    }

    pub async fn complete_appointment(
        &self,
        appointment_id: Uuid,
    ) -> Result<Appointment, AppointmentError> {
        self.transition_status(appointment_id, AppointmentStatus::Completed)
            .await
    }

    pub async fn mark_absent(&self, appointment_id: Uuid) -> Result<Appointment, AppointmentError> {
        self.transition_status(appointment_id, AppointmentStatus::Absent)
            .await
    }

    /// Cancel an appointment. Inside the late-cancellation window the caller
    /// must acknowledge explicitly; the cancellation is then recorded as
    /// `late` so history views can separate it from free cancellations.
    pub async fn cancel_appointment(
        &self,
        appointment_id: Uuid,
        request: CancelAppointmentRequest,
    ) -> Result<Appointment, AppointmentError> {
        debug!("Cancelling appointment: {}", appointment_id);

        let current = self.get_appointment(appointment_id).await?;
        self.lifecycle_service
            .validate_status_transition(&current.status, &AppointmentStatus::Cancelled)?;

        let kind = self
            .lifecycle_service
            .classify_cancellation(current.start_time, Utc::now());

        if kind == crate::models::CancellationKind::Late && !request.acknowledge_late_cancellation {
            info!(
                "Appointment {} cancellation is late and unacknowledged",
                appointment_id
            );
            return Err(AppointmentError::LateCancellationNeedsAcknowledgment);
        }

        let cancelled = self
            .patch_appointment(
                appointment_id,
                json!({
                    "status": AppointmentStatus::Cancelled.to_string(),
                    "cancellation_kind": kind.to_string(),
                    "cancellation_reason": request.reason,
                    "updated_at": Utc::now().to_rfc3339()
                }),
            )
            .await?;

        info!("Appointment {} cancelled ({})", appointment_id, kind);
        Ok(cancelled)
    }

    pub async fn get_appointment(
        &self,
        appointment_id: Uuid,
    ) -> Result<Appointment, AppointmentError> {
        debug!("Fetching appointment: {}", appointment_id);

        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);
        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        if result.is_empty() {
            return Err(AppointmentError::NotFound);
        }

        serde_json::from_value(result[0].clone())
            .map_err(|e| AppointmentError::DatabaseError(format!("Failed to parse appointment: {}", e)))
    }

    /// A clinician's appointments for one calendar day, for back-office
    /// history views. Cancelled rows are included; their `cancellation_kind`
    /// distinguishes free from billable late cancellations.
    pub async fn list_for_day(
        &self,
        clinician_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        let start_of_day = date.and_time(chrono::NaiveTime::MIN).and_utc();
        let end_of_day = start_of_day + ChronoDuration::days(1);

        let path = format!(
            "/rest/v1/appointments?clinician_id=eq.{}&start_time=gte.{}&start_time=lt.{}&order=start_time.asc",
            clinician_id,
            urlencoding::encode(&start_of_day.to_rfc3339()),
            urlencoding::encode(&end_of_day.to_rfc3339())
        );

        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        result
            .into_iter()
            .map(|row| {
                serde_json::from_value(row).map_err(|e| {
                    AppointmentError::DatabaseError(format!("Failed to parse appointment: {}", e))
                })
            })
            .collect()
    }

    // Private helper methods

    async fn transition_status(
        &self,
        appointment_id: Uuid,
        new_status: AppointmentStatus,
    ) -> Result<Appointment, AppointmentError> {
        let current = self.get_appointment(appointment_id).await?;
        self.lifecycle_service
            .validate_status_transition(&current.status, &new_status)?;

        let updated = self
            .patch_appointment(
                appointment_id,
                json!({
                    "status": new_status.to_string(),
                    "updated_at": Utc::now().to_rfc3339()
                }),
            )
            .await?;

        info!("Appointment {} moved to {}", appointment_id, new_status);
        Ok(updated)
    }

    async fn request_meeting_link(&self, appointment: &Appointment) -> Option<String> {
        let client = match &self.calendar_client {
            Some(client) => client,
            None => {
                warn!(
                    "No calendar provider configured; appointment {} confirmed without meeting link",
                    appointment.id
                );
                return None;
            }
        };

        let event_request = MeetingEventRequest {
            subject: format!("Online session {}", appointment.id),
            start_time: appointment.start_time,
            duration_minutes: duration_minutes(appointment.start_time, appointment.end_time),
        };

        match client.create_meeting_event(event_request).await {
            Ok(event) => Some(event.join_link),
            Err(e) => {
                warn!(
                    "Meeting event creation failed for appointment {}: {} - booking stands",
                    appointment.id, e
                );
                None
            }
        }
    }

    async fn insert_appointment(&self, data: Value) -> Result<Appointment, AppointmentError> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "Prefer",
            reqwest::header::HeaderValue::from_static("return=representation"),
        );

        let result: Vec<Value> = self
            .supabase
            .request_with_headers(Method::POST, "/rest/v1/appointments", Some(data), Some(headers))
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        if result.is_empty() {
            return Err(AppointmentError::DatabaseError(
                "Failed to create appointment".to_string(),
            ));
        }

        serde_json::from_value(result[0].clone())
            .map_err(|e| AppointmentError::DatabaseError(format!("Failed to parse appointment: {}", e)))
    }

    async fn patch_appointment(
        &self,
        appointment_id: Uuid,
        data: Value,
    ) -> Result<Appointment, AppointmentError> {
        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "Prefer",
            reqwest::header::HeaderValue::from_static("return=representation"),
        );

        let result: Vec<Value> = self
            .supabase
            .request_with_headers(Method::PATCH, &path, Some(data), Some(headers))
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        if result.is_empty() {
            return Err(AppointmentError::NotFound);
        }

        serde_json::from_value(result[0].clone())
            .map_err(|e| AppointmentError::DatabaseError(format!("Failed to parse appointment: {}", e)))
    }
}

fn duration_minutes(start: DateTime<Utc>, end: DateTime<Utc>) -> i32 {
    (end - start).num_minutes() as i32
}
