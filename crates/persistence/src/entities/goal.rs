//! Goal entity (database row mapping).

use chrono::{DateTime, NaiveDate, Utc};
use domain::models::GoalStatus;
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for goal_status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "goal_status")]
pub enum GoalStatusDb {
    #[sqlx(rename = "em_progresso")]
    InProgress,
    #[sqlx(rename = "concluida")]
    Completed,
    #[sqlx(rename = "cancelada")]
    Cancelled,
}

impl From<GoalStatusDb> for GoalStatus {
    fn from(db: GoalStatusDb) -> Self {
        match db {
            GoalStatusDb::InProgress => Self::InProgress,
            GoalStatusDb::Completed => Self::Completed,
            GoalStatusDb::Cancelled => Self::Cancelled,
        }
    }
}

impl From<GoalStatus> for GoalStatusDb {
    fn from(status: GoalStatus) -> Self {
        match status {
            GoalStatus::InProgress => Self::InProgress,
            GoalStatus::Completed => Self::Completed,
            GoalStatus::Cancelled => Self::Cancelled,
        }
    }
}

/// Database row mapping for the goals table.
#[derive(Debug, Clone, FromRow)]
pub struct GoalEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub target_value: f64,
    pub current_value: f64,
    pub unit: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub status: GoalStatusDb,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<GoalEntity> for domain::models::Goal {
    fn from(entity: GoalEntity) -> Self {
        Self {
            id: entity.id,
            user_id: entity.user_id,
            title: entity.title,
            description: entity.description,
            target_value: entity.target_value,
            current_value: entity.current_value,
            unit: entity.unit,
            due_date: entity.due_date,
            status: entity.status.into(),
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}
