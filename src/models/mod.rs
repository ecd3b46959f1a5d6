pub mod booking;
pub mod event;

pub use booking::{Booking, DataCreateBooking, PartialBooking};
pub use event::{DataCreateEvent, Event, EventMode, PartialEvent};
