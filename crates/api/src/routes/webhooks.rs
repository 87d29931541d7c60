//! Stripe webhook receiver.
//!
//! Events are verified against the signing secret and recorded by ID before
//! they are applied, so Stripe's retries of an event we already handled are
//! acknowledged without side effects. When applying fails the record is
//! dropped again and a 500 asks Stripe to redeliver.

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};
use chrono::Utc;
use domain::models::SubscriptionStatus;
use persistence::repositories::SubscriptionRepository;
use serde::Serialize;
use tracing::{error, info, warn};

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::metrics::record_webhook_event;
use crate::services::billing::{subscription_from_session, subscription_period, BillingError};
use crate::services::stripe_webhook::{StripeEvent, WebhookAction};

const SIGNATURE_HEADER: &str = "stripe-signature";

#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub received: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub duplicate: bool,
}

/// POST /api/webhooks/stripe
pub async fn stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<WebhookAck>), ApiError> {
    let stripe = &state.config.stripe;
    if !stripe.enabled || stripe.webhook_secret.is_empty() {
        return Err(ApiError::ServiceUnavailable(
            "Payments are not configured".to_string(),
        ));
    }

    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Validation("Missing Stripe-Signature header".to_string()))?;

    let event = StripeEvent::construct(
        &body,
        signature,
        &stripe.webhook_secret,
        stripe.webhook_tolerance_secs,
        Utc::now().timestamp(),
    )
    .map_err(|e| {
        warn!(error = %e, "Rejected Stripe webhook");
        record_webhook_event("unknown", "rejected");
        ApiError::Validation(e.to_string())
    })?;

    let repo = SubscriptionRepository::new(state.pool.clone());
    if !repo.record_stripe_event(&event.id, &event.event_type).await? {
        info!(event_id = %event.id, event_type = %event.event_type, "Duplicate Stripe event");
        record_webhook_event(&event.event_type, "duplicate");
        return Ok((
            StatusCode::OK,
            Json(WebhookAck {
                received: true,
                duplicate: true,
            }),
        ));
    }

    match apply_event(&repo, &event).await {
        Ok(outcome) => {
            record_webhook_event(&event.event_type, outcome);
            Ok((
                StatusCode::OK,
                Json(WebhookAck {
                    received: true,
                    duplicate: false,
                }),
            ))
        }
        Err(e) => {
            error!(
                event_id = %event.id,
                event_type = %event.event_type,
                error = %e,
                "Failed to apply Stripe event"
            );
            record_webhook_event(&event.event_type, "failed");
            if let Err(forget_err) = repo.forget_stripe_event(&event.id).await {
                error!(event_id = %event.id, error = %forget_err, "Failed to release Stripe event");
            }
            Err(ApiError::Internal(e.to_string()))
        }
    }
}

/// Applies a recorded event. Payloads we cannot act on are acknowledged
/// and logged; only storage failures are returned as errors.
async fn apply_event(
    repo: &SubscriptionRepository,
    event: &StripeEvent,
) -> Result<&'static str, sqlx::Error> {
    let action = match event.action() {
        Ok(action) => action,
        Err(e) => {
            warn!(event_id = %event.id, error = %e, "Malformed Stripe event payload");
            return Ok("malformed");
        }
    };

    match action {
        WebhookAction::CheckoutCompleted(session) => {
            match subscription_from_session(&session, None, Utc::now()) {
                Ok(upsert) => {
                    let Some(subscription) = repo.upsert(&upsert).await? else {
                        warn!(
                            session_id = %session.id,
                            user_id = %upsert.user_id,
                            "Checkout completed for a subscription that already ended"
                        );
                        return Ok("ignored");
                    };
                    info!(
                        user_id = %upsert.user_id,
                        plan = %subscription.plan_type,
                        "Subscription activated from webhook"
                    );
                    Ok("applied")
                }
                // Delayed payment methods complete later via another event.
                Err(BillingError::Incomplete) => Ok("ignored"),
                Err(e) => {
                    warn!(session_id = %session.id, error = %e, "Unusable checkout session");
                    Ok("ignored")
                }
            }
        }
        WebhookAction::SubscriptionUpdated(sub) => {
            let status = SubscriptionStatus::from_stripe(&sub.status);
            let period = subscription_period(&sub);
            let updated = repo
                .update_from_stripe(
                    &sub.id,
                    status,
                    period.map(|(start, _)| start),
                    period.map(|(_, end)| end),
                    sub.cancel_at_period_end,
                )
                .await?;
            if updated.is_none() {
                warn!(stripe_subscription_id = %sub.id, "Update for unknown subscription");
                return Ok("ignored");
            }
            Ok("applied")
        }
        WebhookAction::SubscriptionDeleted(sub) => {
            if !repo.mark_expired_by_stripe_id(&sub.id).await? {
                warn!(stripe_subscription_id = %sub.id, "Deletion for unknown subscription");
                return Ok("ignored");
            }
            Ok("applied")
        }
        WebhookAction::Ignore => Ok("ignored"),
    }
}
