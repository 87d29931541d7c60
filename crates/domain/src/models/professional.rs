//! Professional domain model.

use chrono::{DateTime, Datelike, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

/// A day of the week a professional attends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkDay {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl WorkDay {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkDay::Monday => "monday",
            WorkDay::Tuesday => "tuesday",
            WorkDay::Wednesday => "wednesday",
            WorkDay::Thursday => "thursday",
            WorkDay::Friday => "friday",
            WorkDay::Saturday => "saturday",
            WorkDay::Sunday => "sunday",
        }
    }

    /// Monday-first position in the week.
    fn ordinal(self) -> u8 {
        match self {
            WorkDay::Monday => 0,
            WorkDay::Tuesday => 1,
            WorkDay::Wednesday => 2,
            WorkDay::Thursday => 3,
            WorkDay::Friday => 4,
            WorkDay::Saturday => 5,
            WorkDay::Sunday => 6,
        }
    }

    pub fn of(date: NaiveDate) -> Self {
        match date.weekday() {
            Weekday::Mon => WorkDay::Monday,
            Weekday::Tue => WorkDay::Tuesday,
            Weekday::Wed => WorkDay::Wednesday,
            Weekday::Thu => WorkDay::Thursday,
            Weekday::Fri => WorkDay::Friday,
            Weekday::Sat => WorkDay::Saturday,
            Weekday::Sun => WorkDay::Sunday,
        }
    }
}

impl FromStr for WorkDay {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "monday" => Ok(WorkDay::Monday),
            "tuesday" => Ok(WorkDay::Tuesday),
            "wednesday" => Ok(WorkDay::Wednesday),
            "thursday" => Ok(WorkDay::Thursday),
            "friday" => Ok(WorkDay::Friday),
            "saturday" => Ok(WorkDay::Saturday),
            "sunday" => Ok(WorkDay::Sunday),
            _ => Err(format!("Unknown work day: {}", s)),
        }
    }
}

/// Sorts and deduplicates a set of work days.
pub fn normalize_work_days(mut days: Vec<WorkDay>) -> Vec<WorkDay> {
    days.sort_by_key(|d| WorkDay::ordinal(*d));
    days.dedup();
    days
}

/// A clinician who attends appointments.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Professional {
    pub id: Uuid,
    #[serde(skip_serializing)]
    pub user_id: Uuid,
    pub name: String,
    pub specialty: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub work_days: Vec<WorkDay>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Professional {
    /// An empty schedule means the professional attends any day.
    pub fn works_on(&self, date: NaiveDate) -> bool {
        self.work_days.is_empty() || self.work_days.contains(&WorkDay::of(date))
    }
}

fn default_active() -> bool {
    true
}

/// Request payload for creating a professional.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProfessionalRequest {
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    #[validate(custom(function = "shared::validation::validate_not_blank"))]
    pub name: String,

    #[validate(length(min = 1, max = 100, message = "Specialty must be 1-100 characters"))]
    pub specialty: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    #[validate(custom(function = "shared::validation::validate_phone"))]
    pub phone: Option<String>,

    #[serde(default)]
    pub work_days: Vec<WorkDay>,

    #[serde(default = "default_active")]
    pub active: bool,
}

/// Request payload for updating a professional (partial update).
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfessionalRequest {
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    #[validate(custom(function = "shared::validation::validate_not_blank"))]
    pub name: Option<String>,

    #[validate(length(min = 1, max = 100, message = "Specialty must be 1-100 characters"))]
    pub specialty: Option<String>,

    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    #[validate(custom(function = "shared::validation::validate_phone"))]
    pub phone: Option<String>,

    pub work_days: Option<Vec<WorkDay>>,

    pub active: Option<bool>,
}

/// Query parameters for listing professionals.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListProfessionalsQuery {
    #[serde(default)]
    pub active_only: bool,
}

/// Response for listing professionals.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListProfessionalsResponse {
    pub professionals: Vec<Professional>,
    pub total: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn professional(work_days: Vec<WorkDay>) -> Professional {
        Professional {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: "Dra. Beatriz Lima".to_string(),
            specialty: "Psicologia".to_string(),
            email: None,
            phone: None,
            work_days,
            active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_work_day_of_date() {
        // 2024-03-04 was a Monday
        let monday = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        assert_eq!(WorkDay::of(monday), WorkDay::Monday);
        assert_eq!(WorkDay::of(monday.succ_opt().unwrap()), WorkDay::Tuesday);
    }

    #[test]
    fn test_works_on_respects_schedule() {
        let p = professional(vec![WorkDay::Monday, WorkDay::Wednesday]);
        assert!(p.works_on(NaiveDate::from_ymd_opt(2024, 3, 4).unwrap()));
        assert!(!p.works_on(NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()));
        assert!(p.works_on(NaiveDate::from_ymd_opt(2024, 3, 6).unwrap()));
    }

    #[test]
    fn test_empty_schedule_works_every_day() {
        let p = professional(vec![]);
        assert!(p.works_on(NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()));
    }

    #[test]
    fn test_normalize_work_days() {
        let days = normalize_work_days(vec![
            WorkDay::Friday,
            WorkDay::Monday,
            WorkDay::Friday,
            WorkDay::Sunday,
        ]);
        assert_eq!(days, vec![WorkDay::Monday, WorkDay::Friday, WorkDay::Sunday]);
    }

    #[test]
    fn test_work_day_from_str() {
        assert_eq!("Tuesday".parse::<WorkDay>().unwrap(), WorkDay::Tuesday);
        assert!("funday".parse::<WorkDay>().is_err());
    }

    #[test]
    fn test_create_request_defaults() {
        let req: CreateProfessionalRequest = serde_json::from_value(serde_json::json!({
            "name": "Carlos",
            "specialty": "Fisioterapia"
        }))
        .unwrap();
        assert!(req.active);
        assert!(req.work_days.is_empty());
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_create_request_parses_work_days() {
        let req: CreateProfessionalRequest = serde_json::from_value(serde_json::json!({
            "name": "Carlos",
            "specialty": "Fisioterapia",
            "workDays": ["monday", "thursday"]
        }))
        .unwrap();
        assert_eq!(req.work_days, vec![WorkDay::Monday, WorkDay::Thursday]);
    }
}
