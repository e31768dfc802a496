pub mod appointment;
pub mod doctor;
pub mod error;
pub mod patient;

pub use appointment::{format_time_range, Appointment, AppointmentStatus};
pub use doctor::Doctor;
pub use error::AppError;
pub use patient::Patient;
