pub mod booking;
pub mod conflict;
pub mod schedule;
pub mod slots;

pub use booking::AppointmentBookingService;
pub use conflict::ConflictDetectionService;
pub use schedule::ScheduleAggregationService;
pub use slots::SlotPlannerService;
