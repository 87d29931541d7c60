//! Patient entity (database row mapping).

use chrono::{DateTime, NaiveDate, Utc};
use domain::models::PatientStatus;
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for patient_status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "patient_status", rename_all = "lowercase")]
pub enum PatientStatusDb {
    Active,
    Inactive,
}

impl From<PatientStatusDb> for PatientStatus {
    fn from(db: PatientStatusDb) -> Self {
        match db {
            PatientStatusDb::Active => Self::Active,
            PatientStatusDb::Inactive => Self::Inactive,
        }
    }
}

impl From<PatientStatus> for PatientStatusDb {
    fn from(status: PatientStatus) -> Self {
        match status {
            PatientStatus::Active => Self::Active,
            PatientStatus::Inactive => Self::Inactive,
        }
    }
}

/// Database row mapping for the patients table.
#[derive(Debug, Clone, FromRow)]
pub struct PatientEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub document: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
    pub status: PatientStatusDb,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PatientEntity> for domain::models::Patient {
    fn from(entity: PatientEntity) -> Self {
        Self {
            id: entity.id,
            user_id: entity.user_id,
            name: entity.name,
            email: entity.email,
            phone: entity.phone,
            birth_date: entity.birth_date,
            document: entity.document,
            address: entity.address,
            notes: entity.notes,
            status: entity.status.into(),
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_conversion() {
        assert_eq!(
            PatientStatus::from(PatientStatusDb::Inactive),
            PatientStatus::Inactive
        );
        assert_eq!(
            PatientStatusDb::from(PatientStatus::Active),
            PatientStatusDb::Active
        );
    }
}
