//! Stripe REST client and the subset of its objects we read.
//!
//! Stripe takes form-encoded bodies and answers JSON. Only the fields the
//! billing flow uses are modelled; everything else is ignored.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

use super::payments::{CheckoutParams, PaymentProvider, PaymentProviderError};
use crate::config::StripeConfig;

#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    #[serde(default)]
    pub url: Option<String>,
    /// `open`, `complete` or `expired`
    #[serde(default)]
    pub status: Option<String>,
    /// `paid`, `unpaid` or `no_payment_required`
    #[serde(default)]
    pub payment_status: Option<String>,
    #[serde(default)]
    pub client_reference_id: Option<String>,
    #[serde(default)]
    pub customer: Option<Expandable<Customer>>,
    #[serde(default)]
    pub subscription: Option<Expandable<StripeSubscription>>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl CheckoutSession {
    pub fn is_complete(&self) -> bool {
        self.status.as_deref() == Some("complete") || self.payment_status.as_deref() == Some("paid")
    }

    pub fn customer_id(&self) -> Option<&str> {
        self.customer.as_ref().map(Expandable::id)
    }

    pub fn subscription_id(&self) -> Option<&str> {
        self.subscription.as_ref().map(Expandable::id)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Customer {
    pub id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StripeSubscription {
    pub id: String,
    pub status: String,
    #[serde(default)]
    pub current_period_start: Option<i64>,
    #[serde(default)]
    pub current_period_end: Option<i64>,
    #[serde(default)]
    pub cancel_at_period_end: bool,
    #[serde(default)]
    pub customer: Option<Expandable<Customer>>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

/// A Stripe reference that is either a bare id or the expanded object.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Expandable<T> {
    Id(String),
    Object(Box<T>),
}

pub trait HasId {
    fn id(&self) -> &str;
}

impl HasId for Customer {
    fn id(&self) -> &str {
        &self.id
    }
}

impl HasId for StripeSubscription {
    fn id(&self) -> &str {
        &self.id
    }
}

impl<T: HasId> Expandable<T> {
    pub fn id(&self) -> &str {
        match self {
            Expandable::Id(id) => id,
            Expandable::Object(object) => object.id(),
        }
    }

    pub fn as_object(&self) -> Option<&T> {
        match self {
            Expandable::Id(_) => None,
            Expandable::Object(object) => Some(object),
        }
    }
}

#[derive(Debug, Deserialize)]
struct StripeErrorBody {
    error: StripeErrorDetail,
}

#[derive(Debug, Deserialize)]
struct StripeErrorDetail {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    code: Option<String>,
}

pub struct StripeClient {
    client: Client,
    secret_key: String,
    api_base_url: String,
    prices: StripeConfig,
}

impl StripeClient {
    pub fn new(config: &StripeConfig) -> Result<Self, PaymentProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;

        Ok(Self {
            client,
            secret_key: config.secret_key.clone(),
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            prices: config.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base_url, path)
    }

    async fn send<T: for<'de> Deserialize<'de>>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, PaymentProviderError> {
        let response = request.bearer_auth(&self.secret_key).send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response.json::<T>().await?);
        }

        let message = match response.json::<StripeErrorBody>().await {
            Ok(body) => body
                .error
                .message
                .or(body.error.code)
                .unwrap_or_else(|| "unknown error".to_string()),
            Err(_) => "unreadable error body".to_string(),
        };

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(PaymentProviderError::SessionNotFound);
        }

        Err(PaymentProviderError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

/// Form fields for `POST /v1/checkout/sessions`.
fn checkout_form(params: &CheckoutParams, price_id: &str) -> Vec<(&'static str, String)> {
    let user_id = params.user_id.to_string();
    let plan = params.plan_type.as_str().to_string();

    let mut form = vec![
        ("mode", "subscription".to_string()),
        ("line_items[0][price]", price_id.to_string()),
        ("line_items[0][quantity]", "1".to_string()),
        ("client_reference_id", user_id.clone()),
        ("success_url", params.success_url.clone()),
        ("cancel_url", params.cancel_url.clone()),
        ("metadata[user_id]", user_id.clone()),
        ("metadata[plan_type]", plan.clone()),
        ("subscription_data[metadata][user_id]", user_id),
        ("subscription_data[metadata][plan_type]", plan),
    ];
    if let Some(email) = &params.email {
        form.push(("customer_email", email.clone()));
    }
    form
}

#[async_trait]
impl PaymentProvider for StripeClient {
    async fn create_checkout_session(
        &self,
        params: &CheckoutParams,
    ) -> Result<CheckoutSession, PaymentProviderError> {
        let price_id = self
            .prices
            .price_for(params.plan_type)
            .ok_or(PaymentProviderError::MissingPrice(params.plan_type))?;

        let request = self
            .client
            .post(self.url("/v1/checkout/sessions"))
            .form(&checkout_form(params, price_id));

        let session: CheckoutSession = self.send(request).await?;
        tracing::info!(session_id = %session.id, plan = %params.plan_type, "Checkout session created");
        Ok(session)
    }

    async fn retrieve_checkout_session(
        &self,
        session_id: &str,
    ) -> Result<CheckoutSession, PaymentProviderError> {
        let request = self
            .client
            .get(self.url(&format!("/v1/checkout/sessions/{}", session_id)))
            .query(&[("expand[]", "subscription")]);
        self.send(request).await
    }

    async fn cancel_at_period_end(
        &self,
        subscription_id: &str,
    ) -> Result<StripeSubscription, PaymentProviderError> {
        let request = self
            .client
            .post(self.url(&format!("/v1/subscriptions/{}", subscription_id)))
            .form(&[("cancel_at_period_end", "true")]);
        self.send(request).await
    }
}
