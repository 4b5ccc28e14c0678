use chrono::{Datelike, NaiveDate};
use rusqlite::types::Value;

use crate::{ClientError, ClientResult};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PersonFilter {
    #[default]
    Any,
    Unset,
    Is(i64),
}

/// Selection of turnovers; all set criteria must hold.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TurnoverFilter {
    pub account_id: Option<i64>,
    /// Inclusive lower bound on `date`.
    pub from: Option<NaiveDate>,
    /// Inclusive upper bound on `date`.
    pub to: Option<NaiveDate>,
    pub month: Option<(i32, u32)>,
    pub person: PersonFilter,
    pub iban: Option<String>,
}

impl TurnoverFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn account(mut self, account_id: i64) -> Self {
        self.account_id = Some(account_id);
        self
    }

    pub fn between(mut self, from: NaiveDate, to: NaiveDate) -> Self {
        self.from = Some(from);
        self.to = Some(to);
        self
    }

    pub fn in_month(mut self, year: i32, month: u32) -> Self {
        self.month = Some((year, month));
        self
    }

    pub fn without_person(mut self) -> Self {
        self.person = PersonFilter::Unset;
        self
    }

    pub fn person(mut self, person_id: i64) -> Self {
        self.person = PersonFilter::Is(person_id);
        self
    }

    pub fn iban(mut self, iban: &str) -> Self {
        self.iban = Some(iban.to_string());
        self
    }

    /// Renders the criteria as a `WHERE` clause over alias `t` plus its
    /// positional parameters.
    pub(crate) fn to_sql(&self) -> ClientResult<(String, Vec<Value>)> {
        let mut clauses: Vec<String> = Vec::new();
        let mut values: Vec<Value> = Vec::new();

        if let (Some(from), Some(to)) = (self.from, self.to)
            && from > to
        {
            return Err(ClientError::invalid_argument(
                "Invalid date range: `from` must be on or before `to`.",
            ));
        }

        if let Some(account_id) = self.account_id {
            values.push(Value::Integer(account_id));
            clauses.push(format!("t.account_id = ?{}", values.len()));
        }

        if let Some(from) = self.from {
            values.push(Value::Text(format_date(from)));
            clauses.push(format!("t.date >= ?{}", values.len()));
        }

        if let Some(to) = self.to {
            values.push(Value::Text(format_date(to)));
            clauses.push(format!("t.date <= ?{}", values.len()));
        }

        if let Some((year, month)) = self.month {
            let (first, next) = month_bounds(year, month)?;
            values.push(Value::Text(format_date(first)));
            clauses.push(format!("t.date >= ?{}", values.len()));
            values.push(Value::Text(format_date(next)));
            clauses.push(format!("t.date < ?{}", values.len()));
        }

        match self.person {
            PersonFilter::Any => {}
            PersonFilter::Unset => clauses.push("t.person_id IS NULL".to_string()),
            PersonFilter::Is(person_id) => {
                values.push(Value::Integer(person_id));
                clauses.push(format!("t.person_id = ?{}", values.len()));
            }
        }

        if let Some(iban) = &self.iban {
            values.push(Value::Text(iban.clone()));
            clauses.push(format!("t.iban = ?{}", values.len()));
        }

        if clauses.is_empty() {
            return Ok((String::new(), values));
        }

        Ok((format!("WHERE {}", clauses.join(" AND ")), values))
    }
}

pub(crate) fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// First day of the month and first day of the following month.
fn month_bounds(year: i32, month: u32) -> ClientResult<(NaiveDate, NaiveDate)> {
    let invalid = || ClientError::invalid_argument(&format!("Invalid month {year}-{month:02}."));

    let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
    let next = if first.month() == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or_else(invalid)?;

    Ok((first, next))
}
