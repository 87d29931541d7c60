//! Subscription plans, their limits, and billing state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// Plan tiers available for a clinic account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanType {
    Basic,
    Premium,
    Master,
}

/// Resource caps for a plan. `None` means unlimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanLimits {
    pub patients: Option<i64>,
    pub professionals: Option<i64>,
}

impl PlanType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanType::Basic => "basic",
            PlanType::Premium => "premium",
            PlanType::Master => "master",
        }
    }

    pub fn limits(&self) -> PlanLimits {
        match self {
            PlanType::Basic => PlanLimits {
                patients: Some(50),
                professionals: Some(1),
            },
            PlanType::Premium => PlanLimits {
                patients: Some(200),
                professionals: Some(5),
            },
            PlanType::Master => PlanLimits {
                patients: None,
                professionals: None,
            },
        }
    }
}

impl FromStr for PlanType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "basic" => Ok(PlanType::Basic),
            "premium" => Ok(PlanType::Premium),
            "master" => Ok(PlanType::Master),
            _ => Err(format!("Unknown plan type: {}", s)),
        }
    }
}

impl std::fmt::Display for PlanType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    Active,
    Canceled,
    Expired,
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::Canceled => "canceled",
            SubscriptionStatus::Expired => "expired",
        }
    }

    /// Maps a Stripe subscription status onto ours. Transitional Stripe
    /// states (`incomplete`, `paused`) yield `None` and leave the row as is.
    pub fn from_stripe(status: &str) -> Option<Self> {
        match status {
            "active" | "trialing" | "past_due" => Some(SubscriptionStatus::Active),
            "canceled" => Some(SubscriptionStatus::Canceled),
            "incomplete_expired" | "unpaid" => Some(SubscriptionStatus::Expired),
            _ => None,
        }
    }
}

/// A tenant's subscription. At most one per user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub id: Uuid,
    #[serde(skip_serializing)]
    pub user_id: Uuid,
    pub plan_type: PlanType,
    pub status: SubscriptionStatus,
    pub current_period_start: DateTime<Utc>,
    pub current_period_end: DateTime<Utc>,
    #[serde(skip_serializing)]
    pub stripe_customer_id: Option<String>,
    #[serde(skip_serializing)]
    pub stripe_subscription_id: Option<String>,
    pub cancel_at_period_end: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Subscription {
    /// Active subscriptions grant their plan; canceled ones keep it until
    /// the paid period ends.
    pub fn grants_plan(&self, now: DateTime<Utc>) -> bool {
        match self.status {
            SubscriptionStatus::Active => true,
            SubscriptionStatus::Canceled => self.current_period_end > now,
            SubscriptionStatus::Expired => false,
        }
    }
}

/// The plan whose limits apply right now. Accounts without a usable
/// subscription fall back to `basic`.
pub fn effective_plan(subscription: Option<&Subscription>, now: DateTime<Utc>) -> PlanType {
    subscription
        .filter(|s| s.grants_plan(now))
        .map(|s| s.plan_type)
        .unwrap_or(PlanType::Basic)
}

/// Response for `GET /subscription`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionResponse {
    pub subscription: Option<Subscription>,
    pub effective_plan: PlanType,
    pub limits: PlanLimits,
}

impl SubscriptionResponse {
    pub fn new(subscription: Option<Subscription>, now: DateTime<Utc>) -> Self {
        let effective_plan = effective_plan(subscription.as_ref(), now);
        Self {
            subscription,
            effective_plan,
            limits: effective_plan.limits(),
        }
    }
}

/// Request payload for starting a hosted checkout.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub plan_type: PlanType,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub session_id: String,
    pub url: String,
}

/// Query string of the checkout success redirect.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfirmCheckoutQuery {
    pub session_id: String,
}

/// Values written when a checkout completes or Stripe reports a change.
#[derive(Debug, Clone)]
pub struct SubscriptionUpsert {
    pub user_id: Uuid,
    pub plan_type: PlanType,
    pub status: SubscriptionStatus,
    pub current_period_start: DateTime<Utc>,
    pub current_period_end: DateTime<Utc>,
    pub stripe_customer_id: Option<String>,
    pub stripe_subscription_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn subscription(status: SubscriptionStatus, period_end: DateTime<Utc>) -> Subscription {
        Subscription {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            plan_type: PlanType::Premium,
            status,
            current_period_start: period_end - Duration::days(30),
            current_period_end: period_end,
            stripe_customer_id: Some("cus_123".to_string()),
            stripe_subscription_id: Some("sub_123".to_string()),
            cancel_at_period_end: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_plan_limits() {
        assert_eq!(PlanType::Basic.limits().patients, Some(50));
        assert_eq!(PlanType::Basic.limits().professionals, Some(1));
        assert_eq!(PlanType::Premium.limits().patients, Some(200));
        assert_eq!(PlanType::Premium.limits().professionals, Some(5));
        assert_eq!(PlanType::Master.limits().patients, None);
    }

    #[test]
    fn test_effective_plan_without_subscription() {
        assert_eq!(effective_plan(None, Utc::now()), PlanType::Basic);
    }

    #[test]
    fn test_effective_plan_active() {
        let now = Utc::now();
        let sub = subscription(SubscriptionStatus::Active, now - Duration::days(1));
        assert_eq!(effective_plan(Some(&sub), now), PlanType::Premium);
    }

    #[test]
    fn test_effective_plan_canceled_until_period_end() {
        let now = Utc::now();
        let still_paid = subscription(SubscriptionStatus::Canceled, now + Duration::days(5));
        assert_eq!(effective_plan(Some(&still_paid), now), PlanType::Premium);

        let lapsed = subscription(SubscriptionStatus::Canceled, now - Duration::days(1));
        assert_eq!(effective_plan(Some(&lapsed), now), PlanType::Basic);
    }

    #[test]
    fn test_effective_plan_expired() {
        let now = Utc::now();
        let sub = subscription(SubscriptionStatus::Expired, now + Duration::days(5));
        assert_eq!(effective_plan(Some(&sub), now), PlanType::Basic);
    }

    #[test]
    fn test_stripe_status_mapping() {
        use SubscriptionStatus::*;
        assert_eq!(SubscriptionStatus::from_stripe("active"), Some(Active));
        assert_eq!(SubscriptionStatus::from_stripe("trialing"), Some(Active));
        assert_eq!(SubscriptionStatus::from_stripe("past_due"), Some(Active));
        assert_eq!(SubscriptionStatus::from_stripe("canceled"), Some(Canceled));
        assert_eq!(SubscriptionStatus::from_stripe("unpaid"), Some(Expired));
        assert_eq!(
            SubscriptionStatus::from_stripe("incomplete_expired"),
            Some(Expired)
        );
        assert_eq!(SubscriptionStatus::from_stripe("incomplete"), None);
    }

    #[test]
    fn test_subscription_hides_stripe_ids() {
        let json =
            serde_json::to_value(subscription(SubscriptionStatus::Active, Utc::now())).unwrap();
        assert!(json.get("stripeCustomerId").is_none());
        assert_eq!(json["planType"], "premium");
    }

    #[test]
    fn test_subscription_response_limits() {
        let response = SubscriptionResponse::new(None, Utc::now());
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["effectivePlan"], "basic");
        assert_eq!(json["limits"]["patients"], 50);
        assert!(json["subscription"].is_null());
    }

    #[test]
    fn test_checkout_request_rejects_unknown_plan() {
        let result: Result<CheckoutRequest, _> =
            serde_json::from_value(serde_json::json!({"planType": "gold"}));
        assert!(result.is_err());
    }
}
