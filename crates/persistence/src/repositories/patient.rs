//! Patient repository. Every query is scoped to the owning tenant.

use domain::models::patient::{CreatePatientRequest, ListPatientsQuery, UpdatePatientRequest};
use domain::models::Patient;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{PatientEntity, PatientStatusDb};
use crate::metrics::QueryTimer;

const PATIENT_COLUMNS: &str = "id, user_id, name, email, phone, birth_date, document, address, notes, status, created_at, updated_at";

/// Repository for patient database operations.
#[derive(Clone)]
pub struct PatientRepository {
    pool: PgPool,
}

impl PatientRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        user_id: Uuid,
        request: &CreatePatientRequest,
    ) -> Result<Patient, sqlx::Error> {
        let timer = QueryTimer::new("create_patient");
        let sql = format!(
            r#"
            INSERT INTO patients (user_id, name, email, phone, birth_date, document, address, notes, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {PATIENT_COLUMNS}
            "#
        );
        let result = sqlx::query_as::<_, PatientEntity>(&sql)
            .bind(user_id)
            .bind(request.name.trim())
            .bind(&request.email)
            .bind(&request.phone)
            .bind(request.birth_date)
            .bind(&request.document)
            .bind(&request.address)
            .bind(&request.notes)
            .bind(PatientStatusDb::from(request.status))
            .fetch_one(&self.pool)
            .await;
        timer.record();
        Ok(result?.into())
    }

    pub async fn find_by_id(&self, user_id: Uuid, id: Uuid) -> Result<Option<Patient>, sqlx::Error> {
        let timer = QueryTimer::new("find_patient_by_id");
        let sql = format!("SELECT {PATIENT_COLUMNS} FROM patients WHERE id = $1 AND user_id = $2");
        let result = sqlx::query_as::<_, PatientEntity>(&sql)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await;
        timer.record();
        Ok(result?.map(Into::into))
    }

    /// Whether the tenant owns a patient with this ID.
    pub async fn exists(&self, user_id: Uuid, id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("patient_exists");
        let result = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM patients WHERE id = $1 AND user_id = $2)",
        )
        .bind(id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn list(
        &self,
        user_id: Uuid,
        query: &ListPatientsQuery,
    ) -> Result<Vec<Patient>, sqlx::Error> {
        let timer = QueryTimer::new("list_patients");
        let sql = format!(
            r#"
            SELECT {PATIENT_COLUMNS}
            FROM patients
            WHERE user_id = $1
              AND ($2::patient_status IS NULL OR status = $2)
              AND ($3::text IS NULL OR name ILIKE $3 OR email ILIKE $3 OR phone ILIKE $3)
            ORDER BY name ASC, id ASC
            "#
        );
        let result = sqlx::query_as::<_, PatientEntity>(&sql)
            .bind(user_id)
            .bind(query.status.map(PatientStatusDb::from))
            .bind(query.search_pattern())
            .fetch_all(&self.pool)
            .await;
        timer.record();
        Ok(result?.into_iter().map(Into::into).collect())
    }

    /// Partial update; absent fields keep their value.
    pub async fn update(
        &self,
        user_id: Uuid,
        id: Uuid,
        request: &UpdatePatientRequest,
    ) -> Result<Option<Patient>, sqlx::Error> {
        let timer = QueryTimer::new("update_patient");
        let sql = format!(
            r#"
            UPDATE patients
            SET
                name = COALESCE($3, name),
                email = COALESCE($4, email),
                phone = COALESCE($5, phone),
                birth_date = COALESCE($6, birth_date),
                document = COALESCE($7, document),
                address = COALESCE($8, address),
                notes = COALESCE($9, notes),
                status = COALESCE($10, status)
            WHERE id = $1 AND user_id = $2
            RETURNING {PATIENT_COLUMNS}
            "#
        );
        let result = sqlx::query_as::<_, PatientEntity>(&sql)
            .bind(id)
            .bind(user_id)
            .bind(request.name.as_deref().map(str::trim))
            .bind(&request.email)
            .bind(&request.phone)
            .bind(request.birth_date)
            .bind(&request.document)
            .bind(&request.address)
            .bind(&request.notes)
            .bind(request.status.map(PatientStatusDb::from))
            .fetch_optional(&self.pool)
            .await;
        timer.record();
        Ok(result?.map(Into::into))
    }

    /// Delete a patient and, by cascade, their appointments, attendance,
    /// payments and notes.
    pub async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("delete_patient");
        let result = sqlx::query("DELETE FROM patients WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await;
        timer.record();
        Ok(result?.rows_affected() > 0)
    }

    /// Number of patients counted against the plan limit.
    pub async fn count(&self, user_id: Uuid) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_patients");
        let result = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM patients WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await;
        timer.record();
        result
    }
}
