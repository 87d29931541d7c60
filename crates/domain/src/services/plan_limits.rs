//! Plan-limit enforcement for patients and professionals.

use thiserror::Error;

use crate::models::subscription::PlanType;
use crate::models::usage_warning::{check_usage_warning, ResourceUsage, UsageWarning};

/// Resources capped by the subscription plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitedResource {
    Patients,
    Professionals,
}

impl LimitedResource {
    pub fn as_str(&self) -> &'static str {
        match self {
            LimitedResource::Patients => "patients",
            LimitedResource::Professionals => "professionals",
        }
    }

    pub fn limit_for(&self, plan: PlanType) -> Option<i64> {
        let limits = plan.limits();
        match self {
            LimitedResource::Patients => limits.patients,
            LimitedResource::Professionals => limits.professionals,
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Your {plan} plan allows up to {limit} {resource}. Upgrade your plan to add more.")]
pub struct PlanLimitError {
    pub plan: PlanType,
    pub resource: &'static str,
    pub limit: i64,
}

/// Refuses creation when the current count already sits at the plan limit.
pub fn ensure_capacity(
    plan: PlanType,
    resource: LimitedResource,
    current: i64,
) -> Result<(), PlanLimitError> {
    let limit = resource.limit_for(plan);
    if ResourceUsage::new(resource.as_str(), current, limit).is_blocked() {
        return Err(PlanLimitError {
            plan,
            resource: resource.as_str(),
            limit: limit.unwrap_or_default(),
        });
    }
    Ok(())
}

/// Banner to return alongside a successful create, computed on the count
/// after the insert.
pub fn warning_after_create(
    plan: PlanType,
    resource: LimitedResource,
    count_after: i64,
) -> Option<UsageWarning> {
    check_usage_warning(resource.as_str(), count_after, resource.limit_for(plan))
}
