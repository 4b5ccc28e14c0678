use chrono::NaiveDate;
use rusqlite::{OptionalExtension, Row, params, params_from_iter};

use crate::ledger::Ledger;
use crate::model::{BookingStatus, NewTurnover, Turnover};
use crate::state::{ConstraintKind, constraint_kind};
use crate::store::filter::TurnoverFilter;
use crate::{ClientError, ClientResult};

const TURNOVER_SELECT: &str = "SELECT
        t.id,
        t.account_id,
        t.turnover_id,
        t.type,
        t.balance,
        t.amount,
        t.date,
        t.value_date,
        t.name,
        t.customer_ref,
        t.iban,
        t.bic,
        t.purpose,
        t.comment,
        t.commercial_transaction_code,
        t.primanota,
        t.person_id,
        p.name AS person_name,
        (SELECT SUM(b.amount) FROM bookings b WHERE b.turnover_id = t.id) AS bookings_amount
     FROM hibiscus_turnovers t
     LEFT JOIN persons p ON p.id = t.person_id";

const TURNOVER_ORDER: &str = "ORDER BY t.account_id ASC, t.turnover_id ASC";

impl Ledger {
    pub fn create_turnover(&self, turnover: NewTurnover) -> ClientResult<Turnover> {
        turnover.validate()?;

        let inserted = self.connection().execute(
            "INSERT INTO hibiscus_turnovers (
                account_id,
                turnover_id,
                type,
                balance,
                amount,
                date,
                value_date,
                name,
                customer_ref,
                iban,
                bic,
                purpose,
                comment,
                commercial_transaction_code,
                primanota,
                person_id
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
            params![
                turnover.account_id,
                turnover.turnover_id,
                &turnover.kind,
                turnover.balance,
                turnover.amount,
                turnover.date,
                turnover.value_date,
                &turnover.name,
                &turnover.customer_ref,
                &turnover.iban,
                &turnover.bic,
                &turnover.purpose,
                &turnover.comment,
                turnover.commercial_transaction_code,
                turnover.primanota,
                turnover.person_id
            ],
        );

        if let Err(error) = inserted {
            if constraint_kind(&error) == Some(ConstraintKind::Unique) {
                tracing::warn!(
                    account_id = turnover.account_id,
                    turnover_id = turnover.turnover_id,
                    "rejected duplicate turnover"
                );
                return Err(ClientError::duplicate_turnover(
                    turnover.account_id,
                    turnover.turnover_id,
                ));
            }
            return Err(self.sqlite_error(&error));
        }

        let id = self.connection().last_insert_rowid();
        tracing::debug!(
            id,
            account_id = turnover.account_id,
            turnover_id = turnover.turnover_id,
            "created turnover"
        );

        self.turnover(id)?
            .ok_or_else(|| ClientError::record_not_found("turnover", id))
    }

    pub fn turnover(&self, id: i64) -> ClientResult<Option<Turnover>> {
        let sql = format!("{TURNOVER_SELECT} WHERE t.id = ?1");
        self.connection()
            .query_row(&sql, [id], turnover_from_row)
            .optional()
            .map_err(|error| self.sqlite_error(&error))
    }

    /// Turnovers matching `filter`, ordered by account and turnover id, with
    /// their booking status freshly derived.
    pub fn turnovers(&self, filter: &TurnoverFilter) -> ClientResult<Vec<Turnover>> {
        let (where_clause, values) = filter.to_sql()?;
        let sql = format!("{TURNOVER_SELECT} {where_clause} {TURNOVER_ORDER}");

        let mut statement = self
            .connection()
            .prepare(&sql)
            .map_err(|error| self.sqlite_error(&error))?;
        let rows_iter = statement
            .query_map(params_from_iter(values), turnover_from_row)
            .map_err(|error| self.sqlite_error(&error))?;

        let mut rows = Vec::new();
        for row in rows_iter {
            rows.push(row.map_err(|error| self.sqlite_error(&error))?);
        }
        Ok(rows)
    }

    /// Persists the mutable parts of a turnover: its person and comment.
    pub fn save_turnover(&self, turnover: &Turnover) -> ClientResult<()> {
        let updated = self
            .connection()
            .execute(
                "UPDATE hibiscus_turnovers SET person_id = ?1, comment = ?2 WHERE id = ?3",
                params![turnover.person_id, &turnover.comment, turnover.id],
            )
            .map_err(|error| self.sqlite_error(&error))?;

        if updated == 0 {
            return Err(ClientError::record_not_found("turnover", turnover.id));
        }
        Ok(())
    }

    /// Earliest and latest turnover date within `filter`, `None` when nothing
    /// matches.
    pub fn date_range(
        &self,
        filter: &TurnoverFilter,
    ) -> ClientResult<Option<(NaiveDate, NaiveDate)>> {
        let (where_clause, values) = filter.to_sql()?;
        let sql =
            format!("SELECT MIN(t.date), MAX(t.date) FROM hibiscus_turnovers t {where_clause}");

        let bounds = self
            .connection()
            .query_row(&sql, params_from_iter(values), |row| {
                Ok((
                    row.get::<_, Option<NaiveDate>>(0)?,
                    row.get::<_, Option<NaiveDate>>(1)?,
                ))
            })
            .map_err(|error| self.sqlite_error(&error))?;

        match bounds {
            (Some(earliest), Some(latest)) => Ok(Some((earliest, latest))),
            _ => Ok(None),
        }
    }
}

fn turnover_from_row(row: &Row<'_>) -> rusqlite::Result<Turnover> {
    let amount: f64 = row.get(5)?;
    let bookings_amount: Option<f64> = row.get(18)?;

    Ok(Turnover {
        id: row.get(0)?,
        account_id: row.get(1)?,
        turnover_id: row.get(2)?,
        kind: row.get(3)?,
        balance: row.get(4)?,
        amount,
        date: row.get(6)?,
        value_date: row.get(7)?,
        name: row.get(8)?,
        customer_ref: row.get(9)?,
        iban: row.get(10)?,
        bic: row.get(11)?,
        purpose: row.get(12)?,
        comment: row.get(13)?,
        commercial_transaction_code: row.get(14)?,
        primanota: row.get(15)?,
        person_id: row.get(16)?,
        person_name: row.get(17)?,
        status: BookingStatus::from_amounts(amount, bookings_amount),
    })
}
