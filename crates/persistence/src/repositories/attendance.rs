//! Attendance repository. Every query is scoped to the owning tenant.

use domain::models::attendance::{AttendanceUpsert, ListAttendanceQuery, UpsertAttendanceRequest};
use domain::models::Attendance;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{AttendanceEntity, AttendanceStatusDb, AttendanceUpsertEntity};
use crate::metrics::QueryTimer;

/// Repository for attendance database operations.
#[derive(Clone)]
pub struct AttendanceRepository {
    pool: PgPool,
}

impl AttendanceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Records attendance for a patient on a day in one statement.
    ///
    /// The unique key `(user_id, patient_id, session_date)` turns a second
    /// write for the same day into an update. `xmax = 0` only holds for a
    /// freshly inserted tuple, which tells the caller which case happened.
    pub async fn upsert(
        &self,
        user_id: Uuid,
        request: &UpsertAttendanceRequest,
    ) -> Result<AttendanceUpsert, sqlx::Error> {
        let timer = QueryTimer::new("upsert_attendance");
        let result = sqlx::query_as::<_, AttendanceUpsertEntity>(
            r#"
            INSERT INTO attendance (user_id, patient_id, session_date, status, payment_id, notes)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (user_id, patient_id, session_date) DO UPDATE SET
                status = EXCLUDED.status,
                payment_id = EXCLUDED.payment_id,
                notes = EXCLUDED.notes
            RETURNING id, user_id, patient_id, session_date, status, payment_id, notes,
                      created_at, updated_at, (xmax = 0) AS inserted
            "#,
        )
        .bind(user_id)
        .bind(request.patient_id)
        .bind(request.session_date)
        .bind(AttendanceStatusDb::from(request.status))
        .bind(request.payment_id)
        .bind(&request.notes)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        Ok(result?.into())
    }

    pub async fn find_by_id(
        &self,
        user_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Attendance>, sqlx::Error> {
        let timer = QueryTimer::new("find_attendance_by_id");
        let result = sqlx::query_as::<_, AttendanceEntity>(
            r#"
            SELECT id, user_id, patient_id, session_date, status, payment_id, notes, created_at, updated_at
            FROM attendance
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
        query: &ListAttendanceQuery,
    ) -> Result<Vec<Attendance>, sqlx::Error> {
        let timer = QueryTimer::new("list_attendance");
        let result = sqlx::query_as::<_, AttendanceEntity>(
            r#"
            SELECT id, user_id, patient_id, session_date, status, payment_id, notes, created_at, updated_at
            FROM attendance
            WHERE user_id = $1
              AND ($2::uuid IS NULL OR patient_id = $2)
              AND ($3::date IS NULL OR session_date >= $3)
              AND ($4::date IS NULL OR session_date <= $4)
              AND ($5::attendance_status IS NULL OR status = $5)
            ORDER BY session_date DESC, id ASC
            "#,
        )
        .bind(user_id)
        .bind(query.patient_id)
        .bind(query.from)
        .bind(query.to)
        .bind(query.status.map(AttendanceStatusDb::from))
        .fetch_all(&self.pool)
        .await;
        timer.record();
        Ok(result?.into_iter().map(Into::into).collect())
    }

    pub async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("delete_attendance");
        let result = sqlx::query("DELETE FROM attendance WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await;
        timer.record();
        Ok(result?.rows_affected() > 0)
    }
}
