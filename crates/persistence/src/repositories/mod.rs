//! Repository implementations for database operations.

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
pub mod user;

pub use appointment::{AppointmentInput, AppointmentRepository, AppointmentUpdateInput};
pub use attendance::AttendanceRepository;
pub use goal::GoalRepository;
pub use note::NoteRepository;
pub use patient::PatientRepository;
pub use payment::PaymentRepository;
pub use professional::ProfessionalRepository;
pub use report::ReportRepository;
pub use subscription::SubscriptionRepository;
pub use todo::TodoRepository;
pub use user::UserRepository;
