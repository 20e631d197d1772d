// libs/appointment-cell/src/services/lifecycle.rs
use chrono::{DateTime, Duration, Utc};
use tracing::{debug, warn};

use crate::models::{AppointmentError, AppointmentStatus, CancellationKind};

/// Cancellations closer than this to the session start are "late" and gated
/// behind an explicit acknowledgment from the caller.
pub const LATE_CANCELLATION_NOTICE_HOURS: i64 = 3;

pub struct AppointmentLifecycleService;

impl AppointmentLifecycleService {
    pub fn new() -> Self {
        Self
    }

    /// Validate that a status transition is allowed.
    pub fn validate_status_transition(
        &self,
        current_status: &AppointmentStatus,
        new_status: &AppointmentStatus,
    ) -> Result<(), AppointmentError> {
        debug!("Validating status transition from {} to {}", current_status, new_status);

        let valid_transitions = self.get_valid_transitions(current_status);

        if !valid_transitions.contains(new_status) {
            warn!("Invalid status transition attempted: {} -> {}", current_status, new_status);
            return Err(AppointmentError::InvalidStatusTransition(current_status.clone()));
        }

        Ok(())
    }

    /// All valid next statuses for a given current status. Appointments move
    /// forward through confirmation to completion, or are diverted to absent
    /// or cancelled by staff; a cancelled row is never reused.
    pub fn get_valid_transitions(&self, current_status: &AppointmentStatus) -> Vec<AppointmentStatus> {
        match current_status {
            AppointmentStatus::Pending => vec![
                AppointmentStatus::Confirmed,
                AppointmentStatus::Cancelled,
                AppointmentStatus::Absent,
            ],
            AppointmentStatus::Confirmed => vec![
                AppointmentStatus::Completed,
                AppointmentStatus::Cancelled,
                AppointmentStatus::Absent,
            ],
            // Terminal states
            AppointmentStatus::Completed => vec![],
            AppointmentStatus::Absent => vec![],
            AppointmentStatus::Cancelled => vec![],
        }
    }

    /// Whether cancelling at `now` falls inside the late-cancellation window.
    pub fn is_late_cancellation(
        &self,
        scheduled_start_time: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> bool {
        now > scheduled_start_time - Duration::hours(LATE_CANCELLATION_NOTICE_HOURS)
    }

    /// Classify a cancellation for billing history. The cancellation itself
    /// is never blocked; a late one merely needs the caller's acknowledgment.
    pub fn classify_cancellation(
        &self,
        scheduled_start_time: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> CancellationKind {
        if self.is_late_cancellation(scheduled_start_time, now) {
            CancellationKind::Late
        } else {
            CancellationKind::Free
        }
    }
}

impl Default for AppointmentLifecycleService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn service() -> AppointmentLifecycleService {
        AppointmentLifecycleService::new()
    }

    #[test]
    fn forward_transitions_are_allowed() {
        let s = service();
        assert!(s
            .validate_status_transition(&AppointmentStatus::Pending, &AppointmentStatus::Confirmed)
            .is_ok());
        assert!(s
            .validate_status_transition(&AppointmentStatus::Confirmed, &AppointmentStatus::Completed)
            .is_ok());
        assert!(s
            .validate_status_transition(&AppointmentStatus::Confirmed, &AppointmentStatus::Absent)
            .is_ok());
        assert!(s
            .validate_status_transition(&AppointmentStatus::Pending, &AppointmentStatus::Cancelled)
            .is_ok());
    }

    #[test]
    fn terminal_states_accept_nothing() {
        let s = service();
        for terminal in [
            AppointmentStatus::Completed,
            AppointmentStatus::Absent,
            AppointmentStatus::Cancelled,
        ] {
            for next in [
                AppointmentStatus::Pending,
                AppointmentStatus::Confirmed,
                AppointmentStatus::Completed,
                AppointmentStatus::Cancelled,
            ] {
                assert_matches!(
                    s.validate_status_transition(&terminal, &next),
                    Err(AppointmentError::InvalidStatusTransition(_))
                );
            }
        }
    }

    #[test]
    fn backwards_transitions_are_rejected() {
        let s = service();
        assert_matches!(
            s.validate_status_transition(&AppointmentStatus::Confirmed, &AppointmentStatus::Pending),
            Err(AppointmentError::InvalidStatusTransition(_))
        );
        assert_matches!(
            s.validate_status_transition(&AppointmentStatus::Pending, &AppointmentStatus::Completed),
            Err(AppointmentError::InvalidStatusTransition(_))
        );
    }

    #[test]
    fn cancellation_classification_uses_three_hour_window() {
        let s = service();
        let start = Utc::now() + Duration::hours(24);

        assert_eq!(
            s.classify_cancellation(start, start - Duration::hours(4)),
            CancellationKind::Free
        );
        // Exactly at the threshold is still free.
        assert_eq!(
            s.classify_cancellation(start, start - Duration::hours(3)),
            CancellationKind::Free
        );
        assert_eq!(
            s.classify_cancellation(start, start - Duration::minutes(90)),
            CancellationKind::Late
        );
        // Cancelling after the start is also late.
        assert_eq!(
            s.classify_cancellation(start, start + Duration::minutes(10)),
            CancellationKind::Late
        );
    }
}
