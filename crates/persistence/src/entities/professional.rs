//! Professional entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::WorkDay;
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the professionals table.
///
/// `work_days` is stored as a `TEXT[]` of lowercase weekday names.
#[derive(Debug, Clone, FromRow)]
pub struct ProfessionalEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub specialty: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub work_days: Vec<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Converts domain work days into their column representation.
pub fn work_days_to_db(days: &[WorkDay]) -> Vec<String> {
    days.iter().map(|d| d.as_str().to_string()).collect()
}

impl From<ProfessionalEntity> for domain::models::Professional {
    fn from(entity: ProfessionalEntity) -> Self {
        Self {
            id: entity.id,
            user_id: entity.user_id,
            name: entity.name,
            specialty: entity.specialty,
            email: entity.email,
            phone: entity.phone,
            // The column has a CHECK constraint; unknown names are skipped
            work_days: entity
                .work_days
                .iter()
                .filter_map(|d| d.parse().ok())
                .collect(),
            active: entity.active,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_work_days_conversion() {
        let entity = ProfessionalEntity {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: "Lia".to_string(),
            specialty: "Fonoaudiologia".to_string(),
            email: None,
            phone: None,
            work_days: vec!["monday".into(), "friday".into(), "bogus".into()],
            active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let professional: domain::models::Professional = entity.into();
        assert_eq!(professional.work_days, vec![WorkDay::Monday, WorkDay::Friday]);
    }

    #[test]
    fn test_work_days_to_db() {
        assert_eq!(
            work_days_to_db(&[WorkDay::Tuesday, WorkDay::Sunday]),
            vec!["tuesday".to_string(), "sunday".to_string()]
        );
    }
}
