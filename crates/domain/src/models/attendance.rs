//! Attendance records: one row per patient per session day.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// How the patient showed up for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
    Cancelled,
}

impl AttendanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceStatus::Present => "present",
            AttendanceStatus::Absent => "absent",
            AttendanceStatus::Late => "late",
            AttendanceStatus::Cancelled => "cancelled",
        }
    }

    /// Present and late both count as attended.
    pub fn attended(&self) -> bool {
        matches!(self, AttendanceStatus::Present | AttendanceStatus::Late)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attendance {
    pub id: Uuid,
    #[serde(skip_serializing)]
    pub user_id: Uuid,
    pub patient_id: Uuid,
    pub session_date: NaiveDate,
    pub status: AttendanceStatus,
    pub payment_id: Option<Uuid>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request payload for recording attendance. Writing the same
/// patient and day again replaces the previous record.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpsertAttendanceRequest {
    pub patient_id: Uuid,
    pub session_date: NaiveDate,
    pub status: AttendanceStatus,
    pub payment_id: Option<Uuid>,

    #[validate(length(max = 2000, message = "Notes must be at most 2000 characters"))]
    pub notes: Option<String>,
}

/// Result of an upsert: the stored row and whether it was newly inserted.
#[derive(Debug, Clone)]
pub struct AttendanceUpsert {
    pub attendance: Attendance,
    pub created: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListAttendanceQuery {
    pub patient_id: Option<Uuid>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub status: Option<AttendanceStatus>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListAttendanceResponse {
    pub records: Vec<Attendance>,
    pub total: usize,
}
