use rusqlite::{OptionalExtension, params};

use crate::ClientResult;
use crate::ledger::Ledger;
use crate::model::{Person, PersonAccount};

impl Ledger {
    pub fn create_person(&self, name: &str) -> ClientResult<Person> {
        self.connection()
            .execute("INSERT INTO persons (name) VALUES (?1)", [name])
            .map_err(|error| self.sqlite_error(&error))?;

        Ok(Person {
            id: self.connection().last_insert_rowid(),
            name: name.to_string(),
        })
    }

    pub fn person(&self, id: i64) -> ClientResult<Option<Person>> {
        self.connection()
            .query_row("SELECT id, name FROM persons WHERE id = ?1", [id], |row| {
                Ok(Person {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            })
            .optional()
            .map_err(|error| self.sqlite_error(&error))
    }

    pub fn create_person_account(
        &self,
        person: &Person,
        iban: &str,
        bic: Option<&str>,
    ) -> ClientResult<PersonAccount> {
        self.connection()
            .execute(
                "INSERT INTO person_accounts (person_id, iban, bic) VALUES (?1, ?2, ?3)",
                params![person.id, iban, bic],
            )
            .map_err(|error| self.sqlite_error(&error))?;

        Ok(PersonAccount {
            id: self.connection().last_insert_rowid(),
            person_id: person.id,
            iban: iban.to_string(),
            bic: bic.map(str::to_string),
        })
    }

    pub fn person_accounts_by_iban(&self, iban: &str) -> ClientResult<Vec<PersonAccount>> {
        let mut statement = self
            .connection()
            .prepare(
                "SELECT id, person_id, iban, bic
                 FROM person_accounts
                 WHERE iban = ?1
                 ORDER BY id ASC",
            )
            .map_err(|error| self.sqlite_error(&error))?;

        let rows_iter = statement
            .query_map([iban], |row| {
                Ok(PersonAccount {
                    id: row.get(0)?,
                    person_id: row.get(1)?,
                    iban: row.get(2)?,
                    bic: row.get(3)?,
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
