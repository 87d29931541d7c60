//! Plan resolution and limit checks for tenant creates.

use chrono::Utc;
use domain::models::subscription::effective_plan;
use domain::models::usage_warning::UsageWarning;
use domain::models::PlanType;
use domain::services::{ensure_capacity, warning_after_create, LimitedResource};
use persistence::repositories::{PatientRepository, ProfessionalRepository, SubscriptionRepository};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::ApiError;

pub async fn current_plan(pool: &PgPool, user_id: Uuid) -> Result<PlanType, ApiError> {
    let subscription = SubscriptionRepository::new(pool.clone())
        .find_by_user(user_id)
        .await?;
    Ok(effective_plan(subscription.as_ref(), Utc::now()))
}

pub async fn resource_count(
    pool: &PgPool,
    user_id: Uuid,
    resource: LimitedResource,
) -> Result<i64, ApiError> {
    let count = match resource {
        LimitedResource::Patients => PatientRepository::new(pool.clone()).count(user_id).await?,
        LimitedResource::Professionals => {
            ProfessionalRepository::new(pool.clone())
                .count(user_id)
                .await?
        }
    };
    Ok(count)
}

/// Refuses the create when the tenant is at its plan limit for `resource`.
///
/// Count-then-insert is not atomic, so two concurrent creates can overshoot
/// the cap by one. The limit is a billing tier, not a security boundary.
pub async fn check_capacity(
    pool: &PgPool,
    user_id: Uuid,
    resource: LimitedResource,
) -> Result<PlanType, ApiError> {
    let plan = current_plan(pool, user_id).await?;
    if resource.limit_for(plan).is_some() {
        let current = resource_count(pool, user_id, resource).await?;
        ensure_capacity(plan, resource, current)?;
    }
    Ok(plan)
}

/// Usage banner to attach to a successful create.
pub async fn usage_after_create(
    pool: &PgPool,
    user_id: Uuid,
    plan: PlanType,
    resource: LimitedResource,
) -> Result<Option<UsageWarning>, ApiError> {
    if resource.limit_for(plan).is_none() {
        return Ok(None);
    }
    let count = resource_count(pool, user_id, resource).await?;
    Ok(warning_after_create(plan, resource, count))
}
