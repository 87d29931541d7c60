//! Payment repository. Every query is scoped to the owning tenant.

use chrono::{DateTime, NaiveDate, Utc};
use domain::models::payment::{CreatePaymentRequest, ListPaymentsQuery, UpdatePaymentRequest};
use domain::models::{Payment, PaymentMethod};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{PaymentEntity, PaymentStatusDb};
use crate::metrics::QueryTimer;

/// Repository for payment database operations.
#[derive(Clone)]
pub struct PaymentRepository {
    pool: PgPool,
}

impl PaymentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        user_id: Uuid,
        request: &CreatePaymentRequest,
    ) -> Result<Payment, sqlx::Error> {
        let timer = QueryTimer::new("create_payment");
        let result = sqlx::query_as::<_, PaymentEntity>(
            r#"
            INSERT INTO payments (user_id, patient_id, description, amount_cents, discount_cents, due_date)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, user_id, patient_id, description, amount_cents, discount_cents, due_date,
                      status, paid_at, payment_method, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(request.patient_id)
        .bind(&request.description)
        .bind(request.amount_cents)
        .bind(request.discount_cents)
        .bind(request.due_date)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        Ok(result?.into())
    }

    pub async fn find_by_id(&self, user_id: Uuid, id: Uuid) -> Result<Option<Payment>, sqlx::Error> {
        let timer = QueryTimer::new("find_payment_by_id");
        let result = sqlx::query_as::<_, PaymentEntity>(
            r#"
            SELECT id, user_id, patient_id, description, amount_cents, discount_cents, due_date,
                   status, paid_at, payment_method, created_at, updated_at
            FROM payments
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
        query: &ListPaymentsQuery,
    ) -> Result<Vec<Payment>, sqlx::Error> {
        let timer = QueryTimer::new("list_payments");
        let result = sqlx::query_as::<_, PaymentEntity>(
            r#"
            SELECT id, user_id, patient_id, description, amount_cents, discount_cents, due_date,
                   status, paid_at, payment_method, created_at, updated_at
            FROM payments
            WHERE user_id = $1
              AND ($2::payment_status IS NULL OR status = $2)
              AND ($3::uuid IS NULL OR patient_id = $3)
              AND ($4::date IS NULL OR due_date >= $4)
              AND ($5::date IS NULL OR due_date <= $5)
            ORDER BY due_date DESC, id ASC
            "#,
        )
        .bind(user_id)
        .bind(query.status.map(PaymentStatusDb::from))
        .bind(query.patient_id)
        .bind(query.from)
        .bind(query.to)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        Ok(result?.into_iter().map(Into::into).collect())
    }

    /// Partial update of an unpaid payment. Returns `None` when the payment
    /// is missing or was paid in the meantime.
    pub async fn update(
        &self,
        user_id: Uuid,
        id: Uuid,
        request: &UpdatePaymentRequest,
    ) -> Result<Option<Payment>, sqlx::Error> {
        let timer = QueryTimer::new("update_payment");
        let result = sqlx::query_as::<_, PaymentEntity>(
            r#"
            UPDATE payments
            SET
                description = COALESCE($3, description),
                amount_cents = COALESCE($4, amount_cents),
                discount_cents = COALESCE($5, discount_cents),
                due_date = COALESCE($6, due_date),
                status = CASE
                    WHEN status = 'overdue' AND COALESCE($6, due_date) >= CURRENT_DATE THEN 'pending'
                    ELSE status
                END
            WHERE id = $1 AND user_id = $2 AND status <> 'paid'
            RETURNING id, user_id, patient_id, description, amount_cents, discount_cents, due_date,
                      status, paid_at, payment_method, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(&request.description)
        .bind(request.amount_cents)
        .bind(request.discount_cents)
        .bind(request.due_date)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        Ok(result?.map(Into::into))
    }

    /// Marks an unpaid payment as paid.
    pub async fn mark_paid(
        &self,
        user_id: Uuid,
        id: Uuid,
        method: Option<PaymentMethod>,
        paid_at: DateTime<Utc>,
    ) -> Result<Option<Payment>, sqlx::Error> {
        let timer = QueryTimer::new("mark_payment_paid");
        let result = sqlx::query_as::<_, PaymentEntity>(
            r#"
            UPDATE payments
            SET status = 'paid', paid_at = $3, payment_method = COALESCE($4, payment_method)
            WHERE id = $1 AND user_id = $2 AND status <> 'paid'
            RETURNING id, user_id, patient_id, description, amount_cents, discount_cents, due_date,
                      status, paid_at, payment_method, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(paid_at)
        .bind(method.map(|m| m.as_str()))
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        Ok(result?.map(Into::into))
    }

    pub async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("delete_payment");
        let result = sqlx::query("DELETE FROM payments WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await;
        timer.record();
        Ok(result?.rows_affected() > 0)
    }

    /// Whether the tenant owns a payment with this ID.
    pub async fn exists(&self, user_id: Uuid, id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("payment_exists");
        let result = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM payments WHERE id = $1 AND user_id = $2)",
        )
        .bind(id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Moves every pending payment due before `today` to overdue, across
    /// all tenants. Returns the number of payments changed.
    pub async fn mark_overdue(&self, today: NaiveDate) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("mark_payments_overdue");
        let result = sqlx::query(
            "UPDATE payments SET status = 'overdue' WHERE status = 'pending' AND due_date < $1",
        )
        .bind(today)
        .execute(&self.pool)
        .await;
        timer.record();
        Ok(result?.rows_affected())
    }
}
