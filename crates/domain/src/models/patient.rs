//! Patient domain model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Whether a patient is currently in care.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PatientStatus {
    #[default]
    Active,
    Inactive,
}

impl PatientStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PatientStatus::Active => "active",
            PatientStatus::Inactive => "inactive",
        }
    }
}

/// A patient of the clinic.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: Uuid,
    #[serde(skip_serializing)]
    pub user_id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub document: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
    pub status: PatientStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request payload for creating a patient.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePatientRequest {
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    #[validate(custom(function = "shared::validation::validate_not_blank"))]
    pub name: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    #[validate(custom(function = "shared::validation::validate_phone"))]
    pub phone: Option<String>,

    pub birth_date: Option<NaiveDate>,

    #[validate(custom(function = "shared::validation::validate_cpf"))]
    pub document: Option<String>,

    #[validate(length(max = 500, message = "Address must be at most 500 characters"))]
    pub address: Option<String>,

    #[validate(length(max = 5000, message = "Notes must be at most 5000 characters"))]
    pub notes: Option<String>,

    #[serde(default)]
    pub status: PatientStatus,
}

/// Request payload for updating a patient (partial update).
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePatientRequest {
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    #[validate(custom(function = "shared::validation::validate_not_blank"))]
    pub name: Option<String>,

    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    #[validate(custom(function = "shared::validation::validate_phone"))]
    pub phone: Option<String>,

    pub birth_date: Option<NaiveDate>,

    #[validate(custom(function = "shared::validation::validate_cpf"))]
    pub document: Option<String>,

    #[validate(length(max = 500, message = "Address must be at most 500 characters"))]
    pub address: Option<String>,

    #[validate(length(max = 5000, message = "Notes must be at most 5000 characters"))]
    pub notes: Option<String>,

    pub status: Option<PatientStatus>,
}

/// Query parameters for listing patients.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPatientsQuery {
    pub status: Option<PatientStatus>,
    /// Case-insensitive match on name, email or phone.
    pub search: Option<String>,
}

impl ListPatientsQuery {
    /// Search term ready for an `ILIKE` pattern, or `None` when blank.
    pub fn search_pattern(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                let escaped = s
                    .replace('\\', "\\\\")
                    .replace('%', "\\%")
                    .replace('_', "\\_");
                format!("%{}%", escaped)
            })
    }
}

/// Response for listing patients.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPatientsResponse {
    pub patients: Vec<Patient>,
    pub total: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_request() -> CreatePatientRequest {
        serde_json::from_value(serde_json::json!({
            "name": "Ana Souza",
            "email": "ana@example.com",
            "phone": "+55 11 98765-4321",
            "birthDate": "1990-04-12"
        }))
        .unwrap()
    }

    #[test]
    fn test_create_request_defaults_to_active() {
        let req = create_request();
        assert_eq!(req.status, PatientStatus::Active);
        assert_eq!(req.birth_date, NaiveDate::from_ymd_opt(1990, 4, 12));
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_create_request_rejects_blank_name() {
        let mut req = create_request();
        req.name = "   ".to_string();
        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("name"));
    }

    #[test]
    fn test_create_request_rejects_bad_document() {
        let mut req = create_request();
        req.document = Some("123.456.789-00".to_string());
        assert!(req.validate().is_err());

        req.document = Some("529.982.247-25".to_string());
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_update_request_empty_is_valid() {
        assert!(UpdatePatientRequest::default().validate().is_ok());
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(
            serde_json::to_string(&PatientStatus::Inactive).unwrap(),
            "\"inactive\""
        );
        assert_eq!(PatientStatus::Active.as_str(), "active");
    }

    #[test]
    fn test_search_pattern() {
        let query = ListPatientsQuery {
            status: None,
            search: Some("  50%_off ".to_string()),
        };
        assert_eq!(query.search_pattern().unwrap(), "%50\\%\\_off%");

        let blank = ListPatientsQuery {
            status: None,
            search: Some("   ".to_string()),
        };
        assert!(blank.search_pattern().is_none());
    }

    #[test]
    fn test_patient_hides_owner() {
        let patient = Patient {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: "Ana".to_string(),
            email: None,
            phone: None,
            birth_date: None,
            document: None,
            address: None,
            notes: None,
            status: PatientStatus::Active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_value(&patient).unwrap();
        assert!(json.get("userId").is_none());
        assert_eq!(json["status"], "active");
    }
}
