//! Practice goals tracked by the clinic owner.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Goal state. Wire names are kept in Portuguese as stored by existing clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum GoalStatus {
    #[default]
    #[serde(rename = "em_progresso")]
    InProgress,
    #[serde(rename = "concluida")]
    Completed,
    #[serde(rename = "cancelada")]
    Cancelled,
}

impl GoalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GoalStatus::InProgress => "em_progresso",
            GoalStatus::Completed => "concluida",
            GoalStatus::Cancelled => "cancelada",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: Uuid,
    #[serde(skip_serializing)]
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub target_value: f64,
    pub current_value: f64,
    pub unit: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub status: GoalStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Goal {
    /// Progress towards the target, clamped to 0..=100.
    pub fn progress_percent(&self) -> f64 {
        if self.target_value <= 0.0 {
            return 0.0;
        }
        (self.current_value / self.target_value * 100.0).clamp(0.0, 100.0)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalResponse {
    #[serde(flatten)]
    pub goal: Goal,
    pub progress: f64,
}

impl From<Goal> for GoalResponse {
    fn from(goal: Goal) -> Self {
        let progress = goal.progress_percent();
        Self { goal, progress }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateGoalRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    #[validate(custom(function = "shared::validation::validate_not_blank"))]
    pub title: String,

    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<String>,

    #[validate(range(min = 0.0, message = "Target value must not be negative"))]
    pub target_value: f64,

    #[serde(default)]
    #[validate(range(min = 0.0, message = "Current value must not be negative"))]
    pub current_value: f64,

    #[validate(length(max = 50, message = "Unit must be at most 50 characters"))]
    pub unit: Option<String>,

    pub due_date: Option<NaiveDate>,

    #[serde(default)]
    pub status: GoalStatus,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGoalRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    #[validate(custom(function = "shared::validation::validate_not_blank"))]
    pub title: Option<String>,

    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<String>,

    #[validate(range(min = 0.0, message = "Target value must not be negative"))]
    pub target_value: Option<f64>,

    #[validate(range(min = 0.0, message = "Current value must not be negative"))]
    pub current_value: Option<f64>,

    #[validate(length(max = 50, message = "Unit must be at most 50 characters"))]
    pub unit: Option<String>,

    pub due_date: Option<NaiveDate>,

    pub status: Option<GoalStatus>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListGoalsQuery {
    pub status: Option<GoalStatus>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListGoalsResponse {
    pub goals: Vec<GoalResponse>,
    pub total: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn goal(target: f64, current: f64) -> Goal {
        Goal {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            title: "Atender 40 pacientes".to_string(),
            description: None,
            target_value: target,
            current_value: current,
            unit: Some("pacientes".to_string()),
            due_date: None,
            status: GoalStatus::InProgress,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_status_wire_names() {
        assert_eq!(
            serde_json::to_string(&GoalStatus::InProgress).unwrap(),
            "\"em_progresso\""
        );
        assert_eq!(
            serde_json::from_str::<GoalStatus>("\"concluida\"").unwrap(),
            GoalStatus::Completed
        );
        assert_eq!(GoalStatus::Cancelled.as_str(), "cancelada");
    }

    #[test]
    fn test_progress_percent() {
        assert_eq!(goal(40.0, 10.0).progress_percent(), 25.0);
        assert_eq!(goal(40.0, 80.0).progress_percent(), 100.0);
        assert_eq!(goal(0.0, 5.0).progress_percent(), 0.0);
    }

    #[test]
    fn test_response_flattens_progress() {
        let json = serde_json::to_value(GoalResponse::from(goal(10.0, 5.0))).unwrap();
        assert_eq!(json["progress"], 50.0);
        assert_eq!(json["status"], "em_progresso");
        assert_eq!(json["targetValue"], 10.0);
    }

    #[test]
    fn test_create_request_defaults() {
        let req: CreateGoalRequest = serde_json::from_value(serde_json::json!({
            "title": "Faturar R$ 20 mil",
            "targetValue": 20000.0
        }))
        .unwrap();
        assert_eq!(req.current_value, 0.0);
        assert_eq!(req.status, GoalStatus::InProgress);
        assert!(req.validate().is_ok());
    }
}
