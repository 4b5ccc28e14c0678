//! Bank-account turnovers imported from Hibiscus, their bookings, and the
//! month-grouped dump report, kept in a SQLite ledger.

pub mod dump;
pub mod error;
pub mod ledger;
pub mod matching;
pub mod migrations;
pub mod model;
pub mod setup;
pub mod state;
pub mod store;

pub use dump::{DumpSummary, write_dump};
pub use error::{ClientError, ClientResult};
pub use ledger::Ledger;
pub use matching::{IbanMatch, MatchSummary};
pub use model::{Account, Booking, BookingStatus, NewTurnover, Person, PersonAccount, Turnover};
pub use store::{PersonFilter, TurnoverFilter};

pub const API_VERSION: &str = env!("CARGO_PKG_VERSION");
