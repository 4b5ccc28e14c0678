use std::path::{Path, PathBuf};

use rusqlite::Connection;

use crate::setup::{ensure_initialized_with_home_override, prepare_schema};
use crate::state::{IN_MEMORY_PATH, map_sqlite_error, open_connection, open_in_memory_connection};
use crate::{ClientError, ClientResult};

/// Handle on an initialized croesus ledger.
///
/// All store operations (turnovers, bookings, persons, IBAN matching, dumps)
/// are methods on this type.
#[derive(Debug)]
pub struct Ledger {
    connection: Connection,
    db_path: PathBuf,
}

impl Ledger {
    /// Opens the ledger in `CROESUS_HOME` or `~/.croesus`.
    pub fn open() -> ClientResult<Self> {
        Self::open_with_home_override(None)
    }

    pub fn open_at(home: &Path) -> ClientResult<Self> {
        Self::open_with_home_override(Some(home))
    }

    /// Opens a private ledger that lives only as long as the handle.
    pub fn open_in_memory() -> ClientResult<Self> {
        let db_path = PathBuf::from(IN_MEMORY_PATH);
        let mut connection = open_in_memory_connection()?;
        prepare_schema(&mut connection, &db_path)?;
        Ok(Self {
            connection,
            db_path,
        })
    }

    fn open_with_home_override(home_override: Option<&Path>) -> ClientResult<Self> {
        let setup = ensure_initialized_with_home_override(home_override)?;
        let db_path = PathBuf::from(&setup.db_path);
        let connection = open_connection(&db_path)?;
        Ok(Self {
            connection,
            db_path,
        })
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    pub(crate) fn connection(&self) -> &Connection {
        &self.connection
    }

    pub(crate) fn sqlite_error(&self, error: &rusqlite::Error) -> ClientError {
        map_sqlite_error(&self.db_path, error)
    }
}
