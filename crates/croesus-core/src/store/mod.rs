mod bookings;
pub mod filter;
mod persons;
mod turnovers;

pub use filter::{PersonFilter, TurnoverFilter};
