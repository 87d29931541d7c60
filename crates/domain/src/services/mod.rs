//! Business rules that operate on domain models.

pub mod plan_limits;
pub mod scheduling;

pub use plan_limits::{ensure_capacity, warning_after_create, LimitedResource, PlanLimitError};
pub use scheduling::{check_availability, SchedulingError};
