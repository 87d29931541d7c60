//! Subscription and checkout endpoint handlers.

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Utc;
use domain::models::subscription::{
    effective_plan, CheckoutRequest, CheckoutResponse, ConfirmCheckoutQuery, SubscriptionResponse,
};
use domain::models::usage_warning::PlanUsageResponse;
use domain::models::SubscriptionStatus;
use domain::services::LimitedResource;
use persistence::repositories::{SubscriptionRepository, UserRepository};
use tracing::{info, warn};

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::UserAuth;
use crate::middleware::metrics::record_checkout_started;
use crate::services::billing::{subscription_from_session, BillingError};
use crate::services::{plans, CheckoutParams};

/// GET /api/v1/subscription
pub async fn get_subscription(
    State(state): State<AppState>,
    auth: UserAuth,
) -> Result<Json<SubscriptionResponse>, ApiError> {
    let subscription = SubscriptionRepository::new(state.pool.clone())
        .find_by_user(auth.user_id)
        .await?;
    Ok(Json(SubscriptionResponse::new(subscription, Utc::now())))
}

/// GET /api/v1/subscription/usage
pub async fn get_usage(
    State(state): State<AppState>,
    auth: UserAuth,
) -> Result<Json<PlanUsageResponse>, ApiError> {
    let (plan, patients, professionals) = tokio::try_join!(
        plans::current_plan(&state.pool, auth.user_id),
        plans::resource_count(&state.pool, auth.user_id, LimitedResource::Patients),
        plans::resource_count(&state.pool, auth.user_id, LimitedResource::Professionals),
    )?;
    Ok(Json(PlanUsageResponse::new(plan, patients, professionals)))
}

/// POST /api/v1/subscription/checkout
///
/// Opens a hosted checkout for `planType`. Buying the plan that is already
/// active and renewing is refused.
pub async fn create_checkout(
    State(state): State<AppState>,
    auth: UserAuth,
    Json(request): Json<CheckoutRequest>,
) -> Result<Json<CheckoutResponse>, ApiError> {
    let current = SubscriptionRepository::new(state.pool.clone())
        .find_by_user(auth.user_id)
        .await?;
    if let Some(subscription) = &current {
        if subscription.status == SubscriptionStatus::Active
            && effective_plan(Some(subscription), Utc::now()) == request.plan_type
        {
            return Err(ApiError::Conflict(format!(
                "You already have an active {} subscription",
                request.plan_type
            )));
        }
    }

    let user = UserRepository::new(state.pool.clone())
        .find_by_id(auth.user_id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("User not found".to_string()))?;

    let params = CheckoutParams::new(
        auth.user_id,
        Some(user.email),
        request.plan_type,
        &state.config.server.app_base_url,
    );
    let session = state.payments.create_checkout_session(&params).await?;

    let url = session.url.ok_or_else(|| {
        ApiError::BadGateway("Checkout session was created without a URL".to_string())
    })?;

    record_checkout_started(request.plan_type.as_str());
    info!(
        user_id = %auth.user_id,
        plan = %request.plan_type,
        session_id = %session.id,
        "Checkout session created"
    );

    Ok(Json(CheckoutResponse {
        session_id: session.id,
        url,
    }))
}

/// GET /api/v1/subscription/checkout/confirm?session_id=...
///
/// Activates the plan from the success redirect without waiting for the
/// webhook. Both paths write the same row, so either may arrive first.
pub async fn confirm_checkout(
    State(state): State<AppState>,
    auth: UserAuth,
    Query(query): Query<ConfirmCheckoutQuery>,
) -> Result<Json<SubscriptionResponse>, ApiError> {
    let session = state
        .payments
        .retrieve_checkout_session(&query.session_id)
        .await?;

    let now = Utc::now();
    let upsert = subscription_from_session(&session, Some(auth.user_id), now)?;
    let subscription = SubscriptionRepository::new(state.pool.clone())
        .upsert(&upsert)
        .await?
        .ok_or_else(|| {
            warn!(
                user_id = %auth.user_id,
                session_id = %query.session_id,
                "Replayed checkout for a canceled subscription"
            );
            ApiError::from(BillingError::InactiveSubscription)
        })?;

    info!(
        user_id = %auth.user_id,
        plan = %subscription.plan_type,
        "Subscription activated from checkout"
    );
    Ok(Json(SubscriptionResponse::new(Some(subscription), now)))
}

/// POST /api/v1/subscription/cancel
///
/// The plan stays in effect until the end of the paid period.
pub async fn cancel_subscription(
    State(state): State<AppState>,
    auth: UserAuth,
) -> Result<Json<SubscriptionResponse>, ApiError> {
    let repo = SubscriptionRepository::new(state.pool.clone());
    let current = repo
        .find_by_user(auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("No subscription to cancel".to_string()))?;

    if current.status != SubscriptionStatus::Active {
        return Err(ApiError::Conflict(
            "Subscription is not active".to_string(),
        ));
    }

    if let Some(stripe_id) = current.stripe_subscription_id.as_deref() {
        state.payments.cancel_at_period_end(stripe_id).await?;
    } else {
        warn!(user_id = %auth.user_id, "Canceling subscription without a Stripe reference");
    }

    let canceled = repo
        .mark_canceled(auth.user_id)
        .await?
        .ok_or_else(|| ApiError::Conflict("Subscription is not active".to_string()))?;

    info!(
        user_id = %auth.user_id,
        period_end = %canceled.current_period_end,
        "Subscription canceled at period end"
    );
    Ok(Json(SubscriptionResponse::new(Some(canceled), Utc::now())))
}
