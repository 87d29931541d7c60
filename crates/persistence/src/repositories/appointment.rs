//! Appointment repository. Every query is scoped to the owning tenant.

use chrono::NaiveDate;
use domain::models::appointment::{AppointmentWithNames, ListAppointmentsQuery};
use domain::models::AppointmentStatus;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{AppointmentStatusDb, AppointmentWithNamesEntity};
use crate::metrics::QueryTimer;

/// Selects an appointment row `a` joined with the display names.
const SELECT_WITH_NAMES: &str = r#"
    SELECT a.id, a.user_id, a.patient_id, a.professional_id, a.date, a.time,
           a.duration_minutes, a.notes, a.status, a.created_at, a.updated_at,
           p.name AS patient_name, pr.name AS professional_name
"#;

const JOIN_NAMES: &str = r#"
    JOIN patients p ON p.id = a.patient_id AND p.user_id = a.user_id
    JOIN professionals pr ON pr.id = a.professional_id AND pr.user_id = a.user_id
"#;

/// Input data for booking an appointment.
#[derive(Debug, Clone)]
pub struct AppointmentInput {
    pub patient_id: Uuid,
    pub professional_id: Uuid,
    pub date: NaiveDate,
    pub time: String,
    pub duration_minutes: i32,
    pub notes: Option<String>,
}

/// Fully resolved values for an appointment update.
#[derive(Debug, Clone)]
pub struct AppointmentUpdateInput {
    pub patient_id: Uuid,
    pub professional_id: Uuid,
    pub date: NaiveDate,
    pub time: String,
    pub duration_minutes: i32,
    pub notes: Option<String>,
    pub status: AppointmentStatus,
}

/// Repository for appointment database operations.
#[derive(Clone)]
pub struct AppointmentRepository {
    pool: PgPool,
}

impl AppointmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        user_id: Uuid,
        input: &AppointmentInput,
    ) -> Result<AppointmentWithNames, sqlx::Error> {
        let timer = QueryTimer::new("create_appointment");
        let sql = format!(
            r#"
            WITH a AS (
                INSERT INTO appointments (user_id, patient_id, professional_id, date, time, duration_minutes, notes)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                RETURNING *
            )
            {SELECT_WITH_NAMES}
            FROM a
            {JOIN_NAMES}
            "#
        );
        let result = sqlx::query_as::<_, AppointmentWithNamesEntity>(&sql)
            .bind(user_id)
            .bind(input.patient_id)
            .bind(input.professional_id)
            .bind(input.date)
            .bind(&input.time)
            .bind(input.duration_minutes)
            .bind(&input.notes)
            .fetch_one(&self.pool)
            .await;
        timer.record();
        Ok(result?.into())
    }

    pub async fn find_by_id(
        &self,
        user_id: Uuid,
        id: Uuid,
    ) -> Result<Option<AppointmentWithNames>, sqlx::Error> {
        let timer = QueryTimer::new("find_appointment_by_id");
        let sql = format!(
            r#"
            {SELECT_WITH_NAMES}
            FROM appointments a
            {JOIN_NAMES}
            WHERE a.id = $1 AND a.user_id = $2
            "#
        );
        let result = sqlx::query_as::<_, AppointmentWithNamesEntity>(&sql)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await;
        timer.record();
        Ok(result?.map(Into::into))
    }

    /// Lists appointments in agenda order, filtered by the optional bounds.
    pub async fn list(
        &self,
        user_id: Uuid,
        query: &ListAppointmentsQuery,
    ) -> Result<Vec<AppointmentWithNames>, sqlx::Error> {
        let timer = QueryTimer::new("list_appointments");
        let sql = format!(
            r#"
            {SELECT_WITH_NAMES}
            FROM appointments a
            {JOIN_NAMES}
            WHERE a.user_id = $1
              AND ($2::date IS NULL OR a.date >= $2)
              AND ($3::date IS NULL OR a.date <= $3)
              AND ($4::appointment_status IS NULL OR a.status = $4)
              AND ($5::uuid IS NULL OR a.patient_id = $5)
              AND ($6::uuid IS NULL OR a.professional_id = $6)
            ORDER BY a.date ASC, a.time ASC, a.id ASC
            "#
        );
        let result = sqlx::query_as::<_, AppointmentWithNamesEntity>(&sql)
            .bind(user_id)
            .bind(query.from)
            .bind(query.to)
            .bind(query.status.map(AppointmentStatusDb::from))
            .bind(query.patient_id)
            .bind(query.professional_id)
            .fetch_all(&self.pool)
            .await;
        timer.record();
        Ok(result?.into_iter().map(Into::into).collect())
    }

    /// Replaces the editable fields if the status is still `expected`.
    /// `None` means the row is gone or its status moved meanwhile.
    pub async fn update(
        &self,
        user_id: Uuid,
        id: Uuid,
        expected: AppointmentStatus,
        input: &AppointmentUpdateInput,
    ) -> Result<Option<AppointmentWithNames>, sqlx::Error> {
        let timer = QueryTimer::new("update_appointment");
        let sql = format!(
            r#"
            WITH a AS (
                UPDATE appointments
                SET patient_id = $3, professional_id = $4, date = $5, time = $6,
                    duration_minutes = $7, notes = $8, status = $9
                WHERE id = $1 AND user_id = $2 AND status = $10
                RETURNING *
            )
            {SELECT_WITH_NAMES}
            FROM a
            {JOIN_NAMES}
            "#
        );
        let result = sqlx::query_as::<_, AppointmentWithNamesEntity>(&sql)
            .bind(id)
            .bind(user_id)
            .bind(input.patient_id)
            .bind(input.professional_id)
            .bind(input.date)
            .bind(&input.time)
            .bind(input.duration_minutes)
            .bind(&input.notes)
            .bind(AppointmentStatusDb::from(input.status))
            .bind(AppointmentStatusDb::from(expected))
            .fetch_optional(&self.pool)
            .await;
        timer.record();
        Ok(result?.map(Into::into))
    }

    /// Sets the status only if it is still `expected`, so concurrent
    /// transitions cannot both apply.
    pub async fn update_status(
        &self,
        user_id: Uuid,
        id: Uuid,
        expected: AppointmentStatus,
        status: AppointmentStatus,
    ) -> Result<Option<AppointmentWithNames>, sqlx::Error> {
        let timer = QueryTimer::new("update_appointment_status");
        let sql = format!(
            r#"
            WITH a AS (
                UPDATE appointments
                SET status = $4
                WHERE id = $1 AND user_id = $2 AND status = $3
                RETURNING *
            )
            {SELECT_WITH_NAMES}
            FROM a
            {JOIN_NAMES}
            "#
        );
        let result = sqlx::query_as::<_, AppointmentWithNamesEntity>(&sql)
            .bind(id)
            .bind(user_id)
            .bind(AppointmentStatusDb::from(expected))
            .bind(AppointmentStatusDb::from(status))
            .fetch_optional(&self.pool)
            .await;
        timer.record();
        Ok(result?.map(Into::into))
    }

    pub async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("delete_appointment");
        let result = sqlx::query("DELETE FROM appointments WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await;
        timer.record();
        Ok(result?.rows_affected() > 0)
    }
}
