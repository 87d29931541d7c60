//! Aggregate queries backing the practice summary report.

use domain::models::report::{
    AppointmentSummary, AttendanceSummary, DateWindow, PaymentSummary, ReportSummary, StatusTotal,
};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::metrics::QueryTimer;

#[derive(Debug, FromRow)]
struct AppointmentCounts {
    scheduled: i64,
    completed: i64,
    cancelled: i64,
}

#[derive(Debug, FromRow)]
struct AttendanceCounts {
    present: i64,
    absent: i64,
    late: i64,
    cancelled: i64,
}

#[derive(Debug, FromRow)]
struct PaymentTotals {
    pending_count: i64,
    pending_cents: i64,
    paid_count: i64,
    paid_cents: i64,
    overdue_count: i64,
    overdue_cents: i64,
}

/// Repository for report aggregates.
#[derive(Clone)]
pub struct ReportRepository {
    pool: PgPool,
}

impl ReportRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn summary(
        &self,
        user_id: Uuid,
        window: DateWindow,
    ) -> Result<ReportSummary, sqlx::Error> {
        let (appointments, attendance, payments, new_patients) = tokio::try_join!(
            self.appointment_counts(user_id, window),
            self.attendance_counts(user_id, window),
            self.payment_totals(user_id, window),
            self.new_patients(user_id, window),
        )?;

        Ok(ReportSummary {
            from: window.from,
            to: window.to,
            appointments,
            attendance,
            payments,
            new_patients,
        })
    }

    async fn appointment_counts(
        &self,
        user_id: Uuid,
        window: DateWindow,
    ) -> Result<AppointmentSummary, sqlx::Error> {
        let timer = QueryTimer::new("report_appointment_counts");
        let result = sqlx::query_as::<_, AppointmentCounts>(
            r#"
            SELECT
                COUNT(*) FILTER (WHERE status = 'scheduled') AS scheduled,
                COUNT(*) FILTER (WHERE status = 'completed') AS completed,
                COUNT(*) FILTER (WHERE status = 'cancelled') AS cancelled
            FROM appointments
            WHERE user_id = $1 AND date BETWEEN $2 AND $3
            "#,
        )
        .bind(user_id)
        .bind(window.from)
        .bind(window.to)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        let counts = result?;
        Ok(AppointmentSummary::new(
            counts.scheduled,
            counts.completed,
            counts.cancelled,
        ))
    }

    async fn attendance_counts(
        &self,
        user_id: Uuid,
        window: DateWindow,
    ) -> Result<AttendanceSummary, sqlx::Error> {
        let timer = QueryTimer::new("report_attendance_counts");
        let result = sqlx::query_as::<_, AttendanceCounts>(
            r#"
            SELECT
                COUNT(*) FILTER (WHERE status = 'present') AS present,
                COUNT(*) FILTER (WHERE status = 'absent') AS absent,
                COUNT(*) FILTER (WHERE status = 'late') AS late,
                COUNT(*) FILTER (WHERE status = 'cancelled') AS cancelled
            FROM attendance
            WHERE user_id = $1 AND session_date BETWEEN $2 AND $3
            "#,
        )
        .bind(user_id)
        .bind(window.from)
        .bind(window.to)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        let counts = result?;
        Ok(AttendanceSummary::new(
            counts.present,
            counts.absent,
            counts.late,
            counts.cancelled,
        ))
    }

    async fn payment_totals(
        &self,
        user_id: Uuid,
        window: DateWindow,
    ) -> Result<PaymentSummary, sqlx::Error> {
        let timer = QueryTimer::new("report_payment_totals");
        let result = sqlx::query_as::<_, PaymentTotals>(
            r#"
            SELECT
                COUNT(*) FILTER (WHERE status = 'pending') AS pending_count,
                COALESCE(SUM(amount_cents - discount_cents) FILTER (WHERE status = 'pending'), 0)::BIGINT AS pending_cents,
                COUNT(*) FILTER (WHERE status = 'paid') AS paid_count,
                COALESCE(SUM(amount_cents - discount_cents) FILTER (WHERE status = 'paid'), 0)::BIGINT AS paid_cents,
                COUNT(*) FILTER (WHERE status = 'overdue') AS overdue_count,
                COALESCE(SUM(amount_cents - discount_cents) FILTER (WHERE status = 'overdue'), 0)::BIGINT AS overdue_cents
            FROM payments
            WHERE user_id = $1 AND due_date BETWEEN $2 AND $3
            "#,
        )
        .bind(user_id)
        .bind(window.from)
        .bind(window.to)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        let totals = result?;
        Ok(PaymentSummary::new(
            StatusTotal {
                count: totals.pending_count,
                net_cents: totals.pending_cents,
            },
            StatusTotal {
                count: totals.paid_count,
                net_cents: totals.paid_cents,
            },
            StatusTotal {
                count: totals.overdue_count,
                net_cents: totals.overdue_cents,
            },
        ))
    }

    async fn new_patients(&self, user_id: Uuid, window: DateWindow) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("report_new_patients");
        let result = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM patients
            WHERE user_id = $1 AND created_at::date BETWEEN $2 AND $3
            "#,
        )
        .bind(user_id)
        .bind(window.from)
        .bind(window.to)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }
}
