//! Stripe webhook events.

use serde::Deserialize;
use shared::crypto::{verify_stripe_signature, SignatureError};

use super::stripe::{CheckoutSession, StripeSubscription};

#[derive(Debug, Deserialize)]
pub struct StripeEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: EventData,
}

#[derive(Debug, Deserialize)]
pub struct EventData {
    pub object: serde_json::Value,
}

/// What a verified event asks us to do.
#[derive(Debug)]
pub enum WebhookAction {
    CheckoutCompleted(Box<CheckoutSession>),
    SubscriptionUpdated(StripeSubscription),
    SubscriptionDeleted(StripeSubscription),
    Ignore,
}

impl StripeEvent {
    /// Checks the `Stripe-Signature` header, then parses the body.
    pub fn construct(
        payload: &[u8],
        signature_header: &str,
        secret: &str,
        tolerance_secs: i64,
        now: i64,
    ) -> Result<Self, WebhookError> {
        verify_stripe_signature(payload, signature_header, secret, tolerance_secs, now)?;
        serde_json::from_slice(payload).map_err(|e| WebhookError::Payload(e.to_string()))
    }

    pub fn action(&self) -> Result<WebhookAction, WebhookError> {
        let object = || self.data.object.clone();
        let parse_err = |e: serde_json::Error| WebhookError::Payload(e.to_string());

        Ok(match self.event_type.as_str() {
            "checkout.session.completed" => WebhookAction::CheckoutCompleted(Box::new(
                serde_json::from_value(object()).map_err(parse_err)?,
            )),
            "customer.subscription.updated" => WebhookAction::SubscriptionUpdated(
                serde_json::from_value(object()).map_err(parse_err)?,
            ),
            "customer.subscription.deleted" => WebhookAction::SubscriptionDeleted(
                serde_json::from_value(object()).map_err(parse_err)?,
            ),
            _ => WebhookAction::Ignore,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    #[error("Invalid signature: {0}")]
    Signature(#[from] SignatureError),

    #[error("Malformed event: {0}")]
    Payload(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use shared::crypto::sign_stripe_payload;

    const SECRET: &str = "whsec_test_secret";

    fn event(event_type: &str, object: serde_json::Value) -> Vec<u8> {
        serde_json::to_vec(&json!({
            "id": "evt_1",
            "type": event_type,
            "data": {"object": object}
        }))
        .unwrap()
    }

    #[test]
    fn test_construct_verifies_signature() {
        let payload = event("invoice.paid", json!({"id": "in_1"}));
        let header = sign_stripe_payload(&payload, SECRET, 1_700_000_000);

        let parsed = StripeEvent::construct(&payload, &header, SECRET, 300, 1_700_000_100).unwrap();
        assert_eq!(parsed.id, "evt_1");
        assert!(matches!(parsed.action().unwrap(), WebhookAction::Ignore));

        assert!(matches!(
            StripeEvent::construct(&payload, &header, "whsec_other", 300, 1_700_000_100),
            Err(WebhookError::Signature(_))
        ));
        assert!(matches!(
            StripeEvent::construct(&payload, &header, SECRET, 300, 1_700_000_301),
            Err(WebhookError::Signature(_))
        ));
    }

    #[test]
    fn test_subscription_events() {
        let payload = event(
            "customer.subscription.updated",
            json!({"id": "sub_1", "status": "past_due", "cancel_at_period_end": true}),
        );
        let header = sign_stripe_payload(&payload, SECRET, 10);
        let parsed = StripeEvent::construct(&payload, &header, SECRET, 300, 10).unwrap();
        match parsed.action().unwrap() {
            WebhookAction::SubscriptionUpdated(sub) => {
                assert_eq!(sub.id, "sub_1");
                assert!(sub.cancel_at_period_end);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_malformed_object_is_rejected() {
        let payload = event("checkout.session.completed", json!({"status": "complete"}));
        let header = sign_stripe_payload(&payload, SECRET, 10);
        let parsed = StripeEvent::construct(&payload, &header, SECRET, 300, 10).unwrap();
        assert!(matches!(parsed.action(), Err(WebhookError::Payload(_))));
    }
}
