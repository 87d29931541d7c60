//! Plan usage tracking and the upgrade banner.
//!
//! Usage is `current / limit * 100`. At 80% the banner warns; at 100%
//! creating more of that resource is blocked. Unlimited plans never warn.

use serde::{Deserialize, Serialize};

use super::subscription::PlanType;

/// Usage percentage at which the banner appears.
pub const WARNING_THRESHOLD_PERCENT: f64 = 80.0;

/// Usage percentage at which creation is refused.
pub const BLOCK_THRESHOLD_PERCENT: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UsageLevel {
    Ok,
    Warning,
    Blocked,
}

impl UsageLevel {
    pub fn from_percentage(percentage: f64) -> Self {
        if percentage >= BLOCK_THRESHOLD_PERCENT {
            UsageLevel::Blocked
        } else if percentage >= WARNING_THRESHOLD_PERCENT {
            UsageLevel::Warning
        } else {
            UsageLevel::Ok
        }
    }
}

/// Usage of one plan-limited resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceUsage {
    pub resource_type: String,
    pub current: i64,
    /// `None` when the plan is unlimited for this resource.
    pub limit: Option<i64>,
    pub remaining: Option<i64>,
    pub percentage: Option<f64>,
    pub level: UsageLevel,
}

impl ResourceUsage {
    pub fn new(resource_type: &str, current: i64, limit: Option<i64>) -> Self {
        let percentage = limit.map(|limit| {
            if limit > 0 {
                (current as f64 / limit as f64) * 100.0
            } else {
                BLOCK_THRESHOLD_PERCENT
            }
        });

        Self {
            resource_type: resource_type.to_string(),
            current,
            limit,
            remaining: limit.map(|limit| (limit - current).max(0)),
            percentage,
            level: percentage
                .map(UsageLevel::from_percentage)
                .unwrap_or(UsageLevel::Ok),
        }
    }

    pub fn is_blocked(&self) -> bool {
        self.level == UsageLevel::Blocked
    }

    /// Banner for this resource, if usage has reached the warning threshold.
    pub fn warning(&self) -> Option<UsageWarning> {
        match (self.limit, self.percentage) {
            (Some(limit), Some(percentage)) if self.level != UsageLevel::Ok => {
                Some(UsageWarning::new(&self.resource_type, self.current, limit, percentage))
            }
            _ => None,
        }
    }
}

/// A warning about usage approaching or reaching the plan limit.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageWarning {
    pub resource_type: String,
    pub current: i64,
    pub limit: i64,
    pub remaining: i64,
    pub percentage: f64,
    pub level: UsageLevel,
    /// Human-readable banner text
    pub message: String,
}

impl UsageWarning {
    fn new(resource_type: &str, current: i64, limit: i64, percentage: f64) -> Self {
        let remaining = (limit - current).max(0);
        let level = UsageLevel::from_percentage(percentage);

        let message = match level {
            UsageLevel::Blocked => format!(
                "You have reached your plan limit of {} {}. Upgrade your plan to add more.",
                limit, resource_type
            ),
            _ => format!(
                "You have used {}/{} {} ({}% of your plan). {} remaining.",
                current,
                limit,
                resource_type,
                percentage.round() as i64,
                remaining
            ),
        };

        Self {
            resource_type: resource_type.to_string(),
            current,
            limit,
            remaining,
            percentage,
            level,
            message,
        }
    }
}

/// Returns the banner for `current` against `limit`, or `None` below 80%
/// or when unlimited.
pub fn check_usage_warning(
    resource_type: &str,
    current: i64,
    limit: Option<i64>,
) -> Option<UsageWarning> {
    ResourceUsage::new(resource_type, current, limit).warning()
}

/// Response for `GET /subscription/usage`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanUsageResponse {
    pub plan_type: PlanType,
    pub patients: ResourceUsage,
    pub professionals: ResourceUsage,
    /// The most severe warning, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub banner: Option<UsageWarning>,
}

impl PlanUsageResponse {
    pub fn new(plan_type: PlanType, patients: i64, professionals: i64) -> Self {
        let limits = plan_type.limits();
        let patients = ResourceUsage::new("patients", patients, limits.patients);
        let professionals =
            ResourceUsage::new("professionals", professionals, limits.professionals);

        let banner = [patients.warning(), professionals.warning()]
            .into_iter()
            .flatten()
            .max_by(|a, b| {
                a.level
                    .cmp(&b.level)
                    .then(a.percentage.total_cmp(&b.percentage))
            });

        Self {
            plan_type,
            patients,
            professionals,
            banner,
        }
    }
}

/// A generic response wrapper that can include usage warnings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseWithWarnings<T> {
    #[serde(flatten)]
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warnings: Option<Vec<UsageWarning>>,
}

impl<T> ResponseWithWarnings<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            warnings: None,
        }
    }

    pub fn maybe_with_warning(data: T, warning: Option<UsageWarning>) -> Self {
        Self {
            data,
            warnings: warning.map(|w| vec![w]),
        }
    }
}
