//! Attendance entity (database row mapping).

use chrono::{DateTime, NaiveDate, Utc};
use domain::models::attendance::AttendanceUpsert;
use domain::models::AttendanceStatus;
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for attendance_status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "attendance_status", rename_all = "lowercase")]
pub enum AttendanceStatusDb {
    Present,
    Absent,
    Late,
    Cancelled,
}

impl From<AttendanceStatusDb> for AttendanceStatus {
    fn from(db: AttendanceStatusDb) -> Self {
        match db {
            AttendanceStatusDb::Present => Self::Present,
            AttendanceStatusDb::Absent => Self::Absent,
            AttendanceStatusDb::Late => Self::Late,
            AttendanceStatusDb::Cancelled => Self::Cancelled,
        }
    }
}

impl From<AttendanceStatus> for AttendanceStatusDb {
    fn from(status: AttendanceStatus) -> Self {
        match status {
            AttendanceStatus::Present => Self::Present,
            AttendanceStatus::Absent => Self::Absent,
            AttendanceStatus::Late => Self::Late,
            AttendanceStatus::Cancelled => Self::Cancelled,
        }
    }
}

/// Database row mapping for the attendance table.
#[derive(Debug, Clone, FromRow)]
pub struct AttendanceEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub patient_id: Uuid,
    pub session_date: NaiveDate,
    pub status: AttendanceStatusDb,
    pub payment_id: Option<Uuid>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<AttendanceEntity> for domain::models::Attendance {
    fn from(entity: AttendanceEntity) -> Self {
        Self {
            id: entity.id,
            user_id: entity.user_id,
            patient_id: entity.patient_id,
            session_date: entity.session_date,
            status: entity.status.into(),
            payment_id: entity.payment_id,
            notes: entity.notes,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

/// Row returned by the upsert, with `inserted` derived from `xmax = 0`.
#[derive(Debug, Clone, FromRow)]
pub struct AttendanceUpsertEntity {
    #[sqlx(flatten)]
    pub attendance: AttendanceEntity,
    pub inserted: bool,
}

impl From<AttendanceUpsertEntity> for AttendanceUpsert {
    fn from(entity: AttendanceUpsertEntity) -> Self {
        Self {
            attendance: entity.attendance.into(),
            created: entity.inserted,
        }
    }
}
