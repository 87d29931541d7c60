//! Payment processor seam.
//!
//! Billing routes talk to a [`PaymentProvider`] instead of Stripe directly,
//! so the app runs with billing disabled and tests can script responses.

use async_trait::async_trait;
use domain::models::PlanType;
use thiserror::Error;
use uuid::Uuid;

use super::stripe::{CheckoutSession, StripeSubscription};
use crate::error::ApiError;

#[derive(Debug, Error)]
pub enum PaymentProviderError {
    #[error("Payments are not configured")]
    NotConfigured,

    #[error("No price configured for plan {0}")]
    MissingPrice(PlanType),

    #[error("Checkout session not found")]
    SessionNotFound,

    #[error("Payment processor request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Payment processor returned {status}: {message}")]
    Api { status: u16, message: String },
}

impl From<PaymentProviderError> for ApiError {
    fn from(err: PaymentProviderError) -> Self {
        match err {
            PaymentProviderError::NotConfigured => {
                ApiError::ServiceUnavailable("Payments are not configured".to_string())
            }
            PaymentProviderError::MissingPrice(plan) => {
                ApiError::ServiceUnavailable(format!("Plan {} is not available for purchase", plan))
            }
            PaymentProviderError::SessionNotFound => {
                ApiError::NotFound("Checkout session not found".to_string())
            }
            other => ApiError::BadGateway(other.to_string()),
        }
    }
}

/// Everything needed to open a hosted checkout for one plan.
#[derive(Debug, Clone)]
pub struct CheckoutParams {
    pub user_id: Uuid,
    pub email: Option<String>,
    pub plan_type: PlanType,
    pub success_url: String,
    pub cancel_url: String,
}

impl CheckoutParams {
    pub fn new(user_id: Uuid, email: Option<String>, plan_type: PlanType, app_base_url: &str) -> Self {
        let base = app_base_url.trim_end_matches('/');
        Self {
            user_id,
            email,
            plan_type,
            success_url: format!("{base}/checkout/success?session_id={{CHECKOUT_SESSION_ID}}"),
            cancel_url: format!("{base}/pricing"),
        }
    }
}

#[async_trait]
pub trait PaymentProvider: Send + Sync {
    async fn create_checkout_session(
        &self,
        params: &CheckoutParams,
    ) -> Result<CheckoutSession, PaymentProviderError>;

    /// Fetches a session with its subscription expanded.
    async fn retrieve_checkout_session(
        &self,
        session_id: &str,
    ) -> Result<CheckoutSession, PaymentProviderError>;

    async fn cancel_at_period_end(
        &self,
        subscription_id: &str,
    ) -> Result<StripeSubscription, PaymentProviderError>;
}

/// Used when Stripe is disabled. Every call fails with `NotConfigured`.
#[derive(Debug, Default)]
pub struct DisabledPaymentProvider;

#[async_trait]
impl PaymentProvider for DisabledPaymentProvider {
    async fn create_checkout_session(
        &self,
        _params: &CheckoutParams,
    ) -> Result<CheckoutSession, PaymentProviderError> {
        Err(PaymentProviderError::NotConfigured)
    }

    async fn retrieve_checkout_session(
        &self,
        _session_id: &str,
    ) -> Result<CheckoutSession, PaymentProviderError> {
        Err(PaymentProviderError::NotConfigured)
    }

    async fn cancel_at_period_end(
        &self,
        _subscription_id: &str,
    ) -> Result<StripeSubscription, PaymentProviderError> {
        Err(PaymentProviderError::NotConfigured)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    #[test]
    fn test_checkout_urls() {
        let params = CheckoutParams::new(
            Uuid::nil(),
            None,
            PlanType::Premium,
            "https://app.clinic.example/",
        );
        assert_eq!(
            params.success_url,
            "https://app.clinic.example/checkout/success?session_id={CHECKOUT_SESSION_ID}"
        );
        assert_eq!(params.cancel_url, "https://app.clinic.example/pricing");
    }

    #[tokio::test]
    async fn test_disabled_provider_maps_to_503() {
        let err = DisabledPaymentProvider
            .retrieve_checkout_session("cs_test")
            .await
            .unwrap_err();
        assert_eq!(
            ApiError::from(err).into_response().status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_api_failure_maps_to_502() {
        let err = PaymentProviderError::Api {
            status: 500,
            message: "boom".into(),
        };
        assert_eq!(
            ApiError::from(err).into_response().status(),
            StatusCode::BAD_GATEWAY
        );
    }
}
