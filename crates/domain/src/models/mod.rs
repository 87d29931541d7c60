//! Domain models for the Clinic Manager backend.

pub mod appointment;
pub mod attendance;
pub mod goal;
pub mod note;
pub mod patient;
pub mod payment;
pub mod professional;
pub mod report;
pub mod subscription;
pub mod todo;
pub mod usage_warning;
pub mod user;

pub use appointment::{Appointment, AppointmentStatus};
pub use attendance::{Attendance, AttendanceStatus};
pub use goal::{Goal, GoalStatus};
pub use note::Note;
pub use patient::{Patient, PatientStatus};
pub use payment::{Payment, PaymentMethod, PaymentStatus};
pub use professional::{Professional, WorkDay};
pub use subscription::{PlanType, Subscription, SubscriptionStatus};
pub use todo::Todo;
pub use user::User;
