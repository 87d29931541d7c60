//! Payment domain model. Money is held in integer cents.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Overdue,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Overdue => "overdue",
        }
    }
}

/// Accepted means of payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Pix,
    CreditCard,
    DebitCard,
    BankTransfer,
    Other,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Pix => "pix",
            PaymentMethod::CreditCard => "credit_card",
            PaymentMethod::DebitCard => "debit_card",
            PaymentMethod::BankTransfer => "bank_transfer",
            PaymentMethod::Other => "other",
        }
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cash" => Ok(PaymentMethod::Cash),
            "pix" => Ok(PaymentMethod::Pix),
            "credit_card" => Ok(PaymentMethod::CreditCard),
            "debit_card" => Ok(PaymentMethod::DebitCard),
            "bank_transfer" => Ok(PaymentMethod::BankTransfer),
            "other" => Ok(PaymentMethod::Other),
            _ => Err(format!("Unknown payment method: {}", s)),
        }
    }
}

/// Business-rule violations on payments.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PaymentRuleError {
    #[error("Discount cannot exceed the amount")]
    DiscountExceedsAmount,

    #[error("Payment is already paid")]
    AlreadyPaid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: Uuid,
    #[serde(skip_serializing)]
    pub user_id: Uuid,
    pub patient_id: Uuid,
    pub description: Option<String>,
    pub amount_cents: i64,
    pub discount_cents: i64,
    pub due_date: NaiveDate,
    pub status: PaymentStatus,
    pub paid_at: Option<DateTime<Utc>>,
    pub payment_method: Option<PaymentMethod>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Payment {
    pub fn net_cents(&self) -> i64 {
        self.amount_cents - self.discount_cents
    }

    /// Paid payments are settled and can no longer be edited or re-paid.
    pub fn ensure_open(&self) -> Result<(), PaymentRuleError> {
        if self.status == PaymentStatus::Paid {
            Err(PaymentRuleError::AlreadyPaid)
        } else {
            Ok(())
        }
    }

    /// Checks the discount rule against a prospective update.
    pub fn check_update(&self, update: &UpdatePaymentRequest) -> Result<(), PaymentRuleError> {
        self.ensure_open()?;
        check_amounts(
            update.amount_cents.unwrap_or(self.amount_cents),
            update.discount_cents.unwrap_or(self.discount_cents),
        )
    }
}

/// `discount <= amount`; non-negativity is checked by request validation.
pub fn check_amounts(amount_cents: i64, discount_cents: i64) -> Result<(), PaymentRuleError> {
    if discount_cents > amount_cents {
        Err(PaymentRuleError::DiscountExceedsAmount)
    } else {
        Ok(())
    }
}

/// Payment as returned by the API, with the computed net amount.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResponse {
    #[serde(flatten)]
    pub payment: Payment,
    pub net_cents: i64,
}

impl From<Payment> for PaymentResponse {
    fn from(payment: Payment) -> Self {
        let net_cents = payment.net_cents();
        Self { payment, net_cents }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentRequest {
    pub patient_id: Uuid,

    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    pub description: Option<String>,

    #[validate(range(min = 0, message = "Amount must not be negative"))]
    pub amount_cents: i64,

    #[serde(default)]
    #[validate(range(min = 0, message = "Discount must not be negative"))]
    pub discount_cents: i64,

    pub due_date: NaiveDate,
}

impl CreatePaymentRequest {
    pub fn check_amounts(&self) -> Result<(), PaymentRuleError> {
        check_amounts(self.amount_cents, self.discount_cents)
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePaymentRequest {
    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    pub description: Option<String>,

    #[validate(range(min = 0, message = "Amount must not be negative"))]
    pub amount_cents: Option<i64>,

    #[validate(range(min = 0, message = "Discount must not be negative"))]
    pub discount_cents: Option<i64>,

    pub due_date: Option<NaiveDate>,
}

/// Request payload for marking a payment as paid.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkPaidRequest {
    pub payment_method: Option<PaymentMethod>,
    /// Defaults to now.
    pub paid_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPaymentsQuery {
    pub status: Option<PaymentStatus>,
    pub patient_id: Option<Uuid>,
    /// Inclusive due-date bounds.
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPaymentsResponse {
    pub payments: Vec<PaymentResponse>,
    pub total: usize,
    pub total_net_cents: i64,
}

impl ListPaymentsResponse {
    pub fn new(payments: Vec<Payment>) -> Self {
        let total_net_cents = payments.iter().map(Payment::net_cents).sum();
        let payments: Vec<PaymentResponse> = payments.into_iter().map(Into::into).collect();
        Self {
            total: payments.len(),
            payments,
            total_net_cents,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payment(amount: i64, discount: i64, status: PaymentStatus) -> Payment {
        Payment {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            patient_id: Uuid::new_v4(),
            description: Some("Sessão de terapia".to_string()),
            amount_cents: amount,
            discount_cents: discount,
            due_date: NaiveDate::from_ymd_opt(2024, 7, 10).unwrap(),
            status,
            paid_at: None,
            payment_method: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_net_cents() {
        assert_eq!(payment(20000, 2500, PaymentStatus::Pending).net_cents(), 17500);
    }

    #[test]
    fn test_check_amounts() {
        assert!(check_amounts(100, 100).is_ok());
        assert!(check_amounts(100, 0).is_ok());
        assert_eq!(
            check_amounts(100, 101),
            Err(PaymentRuleError::DiscountExceedsAmount)
        );
    }

    #[test]
    fn test_paid_payment_is_closed() {
        let paid = payment(100, 0, PaymentStatus::Paid);
        assert_eq!(paid.ensure_open(), Err(PaymentRuleError::AlreadyPaid));
        assert!(payment(100, 0, PaymentStatus::Overdue).ensure_open().is_ok());
    }

    #[test]
    fn test_check_update_uses_existing_values() {
        let p = payment(10000, 1000, PaymentStatus::Pending);
        let lower_amount = UpdatePaymentRequest {
            amount_cents: Some(500),
            ..Default::default()
        };
        assert_eq!(
            p.check_update(&lower_amount),
            Err(PaymentRuleError::DiscountExceedsAmount)
        );

        let raise_discount = UpdatePaymentRequest {
            discount_cents: Some(9000),
            ..Default::default()
        };
        assert!(p.check_update(&raise_discount).is_ok());
    }

    #[test]
    fn test_create_request_rejects_negative_amount() {
        let req: CreatePaymentRequest = serde_json::from_value(serde_json::json!({
            "patientId": Uuid::nil(),
            "amountCents": -1,
            "dueDate": "2024-07-10"
        }))
        .unwrap();
        assert_eq!(req.discount_cents, 0);
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_response_includes_net() {
        let json = serde_json::to_value(PaymentResponse::from(payment(
            15000,
            5000,
            PaymentStatus::Pending,
        )))
        .unwrap();
        assert_eq!(json["netCents"], 10000);
        assert_eq!(json["amountCents"], 15000);
        assert_eq!(json["status"], "pending");
    }

    #[test]
    fn test_list_response_totals() {
        let list = ListPaymentsResponse::new(vec![
            payment(10000, 0, PaymentStatus::Paid),
            payment(8000, 3000, PaymentStatus::Pending),
        ]);
        assert_eq!(list.total, 2);
        assert_eq!(list.total_net_cents, 15000);
    }

    #[test]
    fn test_payment_method_roundtrip_names() {
        assert_eq!(
            serde_json::to_string(&PaymentMethod::CreditCard).unwrap(),
            "\"credit_card\""
        );
        assert_eq!("pix".parse::<PaymentMethod>().unwrap(), PaymentMethod::Pix);
    }
}
