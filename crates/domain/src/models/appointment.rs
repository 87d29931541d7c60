//! Appointment domain model and status lifecycle.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;
use validator::Validate;

/// Default session length in minutes.
pub const DEFAULT_DURATION_MINUTES: i32 = 50;

/// Appointment lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    #[default]
    Scheduled,
    Completed,
    Cancelled,
}

/// Rejected status change.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Cannot change appointment status from {from} to {to}")]
pub struct TransitionError {
    pub from: AppointmentStatus,
    pub to: AppointmentStatus,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Scheduled => "scheduled",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::Cancelled => "cancelled",
        }
    }

    /// Allowed moves: scheduled to completed or cancelled, and cancelled
    /// back to scheduled. Completed is terminal.
    pub fn can_transition_to(self, to: AppointmentStatus) -> bool {
        use AppointmentStatus::*;
        matches!(
            (self, to),
            (Scheduled, Completed) | (Scheduled, Cancelled) | (Cancelled, Scheduled)
        )
    }

    /// Returns `Ok(true)` when the status changes, `Ok(false)` for a no-op.
    pub fn transition(self, to: AppointmentStatus) -> Result<bool, TransitionError> {
        if self == to {
            return Ok(false);
        }
        if self.can_transition_to(to) {
            Ok(true)
        } else {
            Err(TransitionError { from: self, to })
        }
    }
}

impl std::fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A booked session between a patient and a professional.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: Uuid,
    #[serde(skip_serializing)]
    pub user_id: Uuid,
    pub patient_id: Uuid,
    pub professional_id: Uuid,
    pub date: NaiveDate,
    /// `HH:MM`, 24-hour clock.
    pub time: String,
    pub duration_minutes: i32,
    pub notes: Option<String>,
    pub status: AppointmentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Appointment joined with the names shown in agenda views.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentWithNames {
    #[serde(flatten)]
    pub appointment: Appointment,
    pub patient_name: String,
    pub professional_name: String,
}

fn default_duration() -> i32 {
    DEFAULT_DURATION_MINUTES
}

/// Request payload for booking an appointment.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateAppointmentRequest {
    pub patient_id: Uuid,
    pub professional_id: Uuid,
    pub date: NaiveDate,

    #[validate(custom(function = "shared::validation::validate_time_hhmm"))]
    pub time: String,

    #[serde(default = "default_duration")]
    #[validate(range(min = 5, max = 480, message = "Duration must be between 5 and 480 minutes"))]
    pub duration_minutes: i32,

    #[validate(length(max = 2000, message = "Notes must be at most 2000 characters"))]
    pub notes: Option<String>,
}

/// Request payload for updating an appointment (partial update).
///
/// A status included here goes through the same transition rules as
/// `PATCH /appointments/:id/status`.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAppointmentRequest {
    pub patient_id: Option<Uuid>,
    pub professional_id: Option<Uuid>,
    pub date: Option<NaiveDate>,

    #[validate(custom(function = "shared::validation::validate_time_hhmm"))]
    pub time: Option<String>,

    #[validate(range(min = 5, max = 480, message = "Duration must be between 5 and 480 minutes"))]
    pub duration_minutes: Option<i32>,

    /// An empty string clears the notes.
    #[validate(length(max = 2000, message = "Notes must be at most 2000 characters"))]
    pub notes: Option<String>,

    pub status: Option<AppointmentStatus>,
}

/// Request payload for a status transition.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAppointmentStatusRequest {
    pub status: AppointmentStatus,
}

/// Query parameters for listing appointments.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListAppointmentsQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub status: Option<AppointmentStatus>,
    pub patient_id: Option<Uuid>,
    pub professional_id: Option<Uuid>,
}

/// Response for listing appointments.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListAppointmentsResponse {
    pub appointments: Vec<AppointmentWithNames>,
    pub total: usize,
}
