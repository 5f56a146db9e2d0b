pub mod booking;
pub mod customer;
pub mod revenue;
pub mod technician;

pub use booking::{AcTypeLine, Booking, BookingService, BookingStatus};
pub use customer::Customer;
pub use revenue::Revenue;
pub use technician::Technician;
