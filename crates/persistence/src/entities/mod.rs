//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod appointment;
pub mod attendance;
pub mod goal;
pub mod note;
pub mod patient;
pub mod payment;
pub mod professional;
pub mod subscription;
pub mod todo;
pub mod user;

pub use appointment::{AppointmentEntity, AppointmentStatusDb, AppointmentWithNamesEntity};
pub use attendance::{AttendanceEntity, AttendanceStatusDb, AttendanceUpsertEntity};
pub use goal::{GoalEntity, GoalStatusDb};
pub use note::NoteEntity;
pub use patient::{PatientEntity, PatientStatusDb};
pub use payment::{PaymentEntity, PaymentStatusDb};
pub use professional::ProfessionalEntity;
pub use subscription::{PlanTypeDb, SubscriptionEntity, SubscriptionStatusDb};
pub use todo::TodoEntity;
pub use user::{UserEntity, UserSessionEntity};
