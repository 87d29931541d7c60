//! Payment entity (database row mapping).

use chrono::{DateTime, NaiveDate, Utc};
use domain::models::PaymentStatus;
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for payment_status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "payment_status", rename_all = "lowercase")]
pub enum PaymentStatusDb {
    Pending,
    Paid,
    Overdue,
}

impl From<PaymentStatusDb> for PaymentStatus {
    fn from(db: PaymentStatusDb) -> Self {
        match db {
            PaymentStatusDb::Pending => Self::Pending,
            PaymentStatusDb::Paid => Self::Paid,
            PaymentStatusDb::Overdue => Self::Overdue,
        }
    }
}

impl From<PaymentStatus> for PaymentStatusDb {
    fn from(status: PaymentStatus) -> Self {
        match status {
            PaymentStatus::Pending => Self::Pending,
            PaymentStatus::Paid => Self::Paid,
            PaymentStatus::Overdue => Self::Overdue,
        }
    }
}

/// Database row mapping for the payments table.
#[derive(Debug, Clone, FromRow)]
pub struct PaymentEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub patient_id: Uuid,
    pub description: Option<String>,
    pub amount_cents: i64,
    pub discount_cents: i64,
    pub due_date: NaiveDate,
    pub status: PaymentStatusDb,
    pub paid_at: Option<DateTime<Utc>>,
    pub payment_method: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PaymentEntity> for domain::models::Payment {
    fn from(entity: PaymentEntity) -> Self {
        Self {
            id: entity.id,
            user_id: entity.user_id,
            patient_id: entity.patient_id,
            description: entity.description,
            amount_cents: entity.amount_cents,
            discount_cents: entity.discount_cents,
            due_date: entity.due_date,
            status: entity.status.into(),
            paid_at: entity.paid_at,
            payment_method: entity.payment_method.and_then(|m| m.parse().ok()),
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}
