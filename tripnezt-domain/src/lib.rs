pub mod admission;
pub mod audit;
pub mod booking;
pub mod transition;
pub mod trip;
pub mod user;

pub use admission::decide_admission;
pub use booking::{Booking, BookingStatus};
pub use transition::{seat_adjustment, TransitionError, TransitionTable};
pub use trip::{SeatSnapshot, Trip};
