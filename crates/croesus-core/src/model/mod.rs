pub mod booking;
pub mod person;
pub mod turnover;

pub use booking::{Account, Booking};
pub use person::{Person, PersonAccount};
pub use turnover::{BookingStatus, NewTurnover, Turnover};
