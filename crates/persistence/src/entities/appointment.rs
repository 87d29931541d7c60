//! Appointment entity (database row mapping).

use chrono::{DateTime, NaiveDate, Utc};
use domain::models::appointment::AppointmentWithNames;
use domain::models::AppointmentStatus;
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for appointment_status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "appointment_status", rename_all = "lowercase")]
pub enum AppointmentStatusDb {
    Scheduled,
    Completed,
    Cancelled,
}

impl From<AppointmentStatusDb> for AppointmentStatus {
    fn from(db: AppointmentStatusDb) -> Self {
        match db {
            AppointmentStatusDb::Scheduled => Self::Scheduled,
            AppointmentStatusDb::Completed => Self::Completed,
            AppointmentStatusDb::Cancelled => Self::Cancelled,
        }
    }
}

impl From<AppointmentStatus> for AppointmentStatusDb {
    fn from(status: AppointmentStatus) -> Self {
        match status {
            AppointmentStatus::Scheduled => Self::Scheduled,
            AppointmentStatus::Completed => Self::Completed,
            AppointmentStatus::Cancelled => Self::Cancelled,
        }
    }
}

/// Database row mapping for the appointments table.
#[derive(Debug, Clone, FromRow)]
pub struct AppointmentEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub patient_id: Uuid,
    pub professional_id: Uuid,
    pub date: NaiveDate,
    pub time: String,
    pub duration_minutes: i32,
    pub notes: Option<String>,
    pub status: AppointmentStatusDb,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<AppointmentEntity> for domain::models::Appointment {
    fn from(entity: AppointmentEntity) -> Self {
        Self {
            id: entity.id,
            user_id: entity.user_id,
            patient_id: entity.patient_id,
            professional_id: entity.professional_id,
            date: entity.date,
            time: entity.time,
            duration_minutes: entity.duration_minutes,
            notes: entity.notes,
            status: entity.status.into(),
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

/// Appointment row joined with patient and professional names.
#[derive(Debug, Clone, FromRow)]
pub struct AppointmentWithNamesEntity {
    #[sqlx(flatten)]
    pub appointment: AppointmentEntity,
    pub patient_name: String,
    pub professional_name: String,
}

impl From<AppointmentWithNamesEntity> for AppointmentWithNames {
    fn from(entity: AppointmentWithNamesEntity) -> Self {
        Self {
            appointment: entity.appointment.into(),
            patient_name: entity.patient_name,
            professional_name: entity.professional_name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_conversion_roundtrip() {
        for status in [
            AppointmentStatus::Scheduled,
            AppointmentStatus::Completed,
            AppointmentStatus::Cancelled,
        ] {
            let db = AppointmentStatusDb::from(status);
            assert_eq!(AppointmentStatus::from(db), status);
        }
    }
}
