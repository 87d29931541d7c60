//! Professional repository. Every query is scoped to the owning tenant.

use domain::models::professional::{
    normalize_work_days, CreateProfessionalRequest, ListProfessionalsQuery,
    UpdateProfessionalRequest,
};
use domain::models::Professional;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::professional::work_days_to_db;
use crate::entities::ProfessionalEntity;
use crate::metrics::QueryTimer;

/// Repository for professional database operations.
#[derive(Clone)]
pub struct ProfessionalRepository {
    pool: PgPool,
}

impl ProfessionalRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        user_id: Uuid,
        request: &CreateProfessionalRequest,
    ) -> Result<Professional, sqlx::Error> {
        let timer = QueryTimer::new("create_professional");
        let work_days = work_days_to_db(&normalize_work_days(request.work_days.clone()));
        let result = sqlx::query_as::<_, ProfessionalEntity>(
            r#"
            INSERT INTO professionals (user_id, name, specialty, email, phone, work_days, active)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, user_id, name, specialty, email, phone, work_days, active, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(request.name.trim())
        .bind(&request.specialty)
        .bind(&request.email)
        .bind(&request.phone)
        .bind(&work_days)
        .bind(request.active)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        Ok(result?.into())
    }

    pub async fn find_by_id(
        &self,
        user_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Professional>, sqlx::Error> {
        let timer = QueryTimer::new("find_professional_by_id");
        let result = sqlx::query_as::<_, ProfessionalEntity>(
            r#"
            SELECT id, user_id, name, specialty, email, phone, work_days, active, created_at, updated_at
            FROM professionals
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        Ok(result?.map(Into::into))
    }

    pub async fn list(
        &self,
        user_id: Uuid,
        query: &ListProfessionalsQuery,
    ) -> Result<Vec<Professional>, sqlx::Error> {
        let timer = QueryTimer::new("list_professionals");
        let result = sqlx::query_as::<_, ProfessionalEntity>(
            r#"
            SELECT id, user_id, name, specialty, email, phone, work_days, active, created_at, updated_at
            FROM professionals
            WHERE user_id = $1 AND (NOT $2 OR active)
            ORDER BY name ASC, id ASC
            "#,
        )
        .bind(user_id)
        .bind(query.active_only)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        Ok(result?.into_iter().map(Into::into).collect())
    }

    pub async fn update(
        &self,
        user_id: Uuid,
        id: Uuid,
        request: &UpdateProfessionalRequest,
    ) -> Result<Option<Professional>, sqlx::Error> {
        let timer = QueryTimer::new("update_professional");
        let work_days = request
            .work_days
            .clone()
            .map(|days| work_days_to_db(&normalize_work_days(days)));
        let result = sqlx::query_as::<_, ProfessionalEntity>(
            r#"
            UPDATE professionals
            SET
                name = COALESCE($3, name),
                specialty = COALESCE($4, specialty),
                email = COALESCE($5, email),
                phone = COALESCE($6, phone),
                work_days = COALESCE($7, work_days),
                active = COALESCE($8, active)
            WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, name, specialty, email, phone, work_days, active, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(request.name.as_deref().map(str::trim))
        .bind(&request.specialty)
        .bind(&request.email)
        .bind(&request.phone)
        .bind(work_days)
        .bind(request.active)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        Ok(result?.map(Into::into))
    }

    pub async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("delete_professional");
        let result = sqlx::query("DELETE FROM professionals WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await;
        timer.record();
        Ok(result?.rows_affected() > 0)
    }

    /// Number of professionals counted against the plan limit.
    pub async fn count(&self, user_id: Uuid) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_professionals");
        let result =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM professionals WHERE user_id = $1")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await;
        timer.record();
        result
    }
}
