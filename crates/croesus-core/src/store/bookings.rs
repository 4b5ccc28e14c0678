use rusqlite::{OptionalExtension, params};

use crate::ledger::Ledger;
use crate::model::{Account, Booking, Turnover};
use crate::{ClientError, ClientResult};

impl Ledger {
    pub fn create_account(&self, name: &str) -> ClientResult<Account> {
        self.connection()
            .execute("INSERT INTO accounts (name) VALUES (?1)", [name])
            .map_err(|error| self.sqlite_error(&error))?;

        Ok(Account {
            id: self.connection().last_insert_rowid(),
            name: name.to_string(),
        })
    }

    pub fn account(&self, id: i64) -> ClientResult<Option<Account>> {
        self.connection()
            .query_row("SELECT id, name FROM accounts WHERE id = ?1", [id], |row| {
                Ok(Account {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            })
            .optional()
            .map_err(|error| self.sqlite_error(&error))
    }

    /// Allocates `amount` of `turnover` to `account`.
    ///
    /// The sum of a turnover's bookings may exceed its amount; that state is
    /// reported through [`crate::model::BookingStatus::overbooked`] on the next
    /// read rather than rejected here.
    pub fn book(
        &self,
        turnover: &Turnover,
        account: &Account,
        amount: f64,
    ) -> ClientResult<Booking> {
        if !amount.is_finite() {
            return Err(ClientError::invalid_argument(
                "Booking amount must be a finite number.",
            ));
        }

        self.connection()
            .execute(
                "INSERT INTO bookings (turnover_id, account_id, amount) VALUES (?1, ?2, ?3)",
                params![turnover.id, account.id, amount],
            )
            .map_err(|error| self.sqlite_error(&error))?;

        let booking = Booking {
            id: self.connection().last_insert_rowid(),
            turnover_id: turnover.id,
            account_id: account.id,
            amount,
        };
        tracing::debug!(
            booking_id = booking.id,
            turnover_id = turnover.id,
            account_id = account.id,
            amount,
            "created booking"
        );
        Ok(booking)
    }

    pub fn bookings_for(&self, turnover_id: i64) -> ClientResult<Vec<Booking>> {
        let mut statement = self
            .connection()
            .prepare(
                "SELECT id, turnover_id, account_id, amount
                 FROM bookings
                 WHERE turnover_id = ?1
                 ORDER BY id ASC",
            )
            .map_err(|error| self.sqlite_error(&error))?;

        let rows_iter = statement
            .query_map([turnover_id], |row| {
                Ok(Booking {
                    id: row.get(0)?,
                    turnover_id: row.get(1)?,
                    account_id: row.get(2)?,
                    amount: row.get(3)?,
                })
            })
            .map_err(|error| self.sqlite_error(&error))?;

        let mut rows = Vec::new();
        for row in rows_iter {
            rows.push(row.map_err(|error| self.sqlite_error(&error))?);
        }
        Ok(rows)
    }
}
