use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

use crate::{ClientError, ClientResult};

const NAME_MAX_CHARS: usize = 100;
const IBAN_MAX_CHARS: usize = 30;
const BIC_MAX_CHARS: usize = 11;

/// How far the bookings of a turnover cover its amount.
///
/// Derived on every read from the sum of the turnover's bookings and never
/// stored. `booked` and `overbooked` are not exclusive: a turnover whose
/// bookings exceed its amount reports both.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct BookingStatus {
    /// Sum of all booking amounts, `None` without bookings.
    pub bookings_amount: Option<f64>,
    /// Amount still unallocated.
    pub bookable: f64,
    pub underbooked: bool,
    pub booked: bool,
    pub overbooked: bool,
}

impl BookingStatus {
    pub fn from_amounts(amount: f64, bookings_amount: Option<f64>) -> Self {
        match bookings_amount {
            None => Self {
                bookings_amount: None,
                bookable: amount,
                underbooked: true,
                booked: false,
                overbooked: false,
            },
            Some(booked_sum) => Self {
                bookings_amount: Some(booked_sum),
                bookable: amount - booked_sum,
                underbooked: booked_sum < amount,
                booked: booked_sum >= amount,
                overbooked: booked_sum > amount,
            },
        }
    }
}

/// A single line of a bank account statement as imported from Hibiscus.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Turnover {
    pub id: i64,
    pub account_id: i64,
    pub turnover_id: i64,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub balance: Option<f64>,
    pub amount: f64,
    pub date: NaiveDate,
    pub value_date: Option<NaiveDate>,
    pub name: Option<String>,
    pub customer_ref: Option<String>,
    pub iban: Option<String>,
    pub bic: Option<String>,
    pub purpose: Option<String>,
    pub comment: Option<String>,
    pub commercial_transaction_code: Option<u32>,
    pub primanota: Option<u32>,
    #[serde(rename = "person")]
    pub person_id: Option<i64>,
    #[serde(skip)]
    pub person_name: Option<String>,
    #[serde(skip)]
    pub status: BookingStatus,
}

impl Turnover {
    pub fn is_in_month(&self, year: i32, month: u32) -> bool {
        use chrono::Datelike;

        self.date.year() == year && self.date.month() == month
    }

    pub fn has_person(&self) -> bool {
        self.person_id.is_some()
    }

    /// The IBAN exactly as stored, unless absent or empty.
    pub fn matchable_iban(&self) -> Option<&str> {
        self.iban.as_deref().filter(|value| !value.is_empty())
    }
}

impl fmt::Display for Turnover {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<HibiscusTurnover:{}, {}, {}, {}>",
            self.id,
            self.person_name.as_deref().unwrap_or("None"),
            self.date,
            decimal(self.amount)
        )
    }
}

/// Whole amounts keep one fractional digit (`100.0`, not `100`).
fn decimal(amount: f64) -> String {
    if amount.is_finite() && amount.fract() == 0.0 {
        format!("{amount:.1}")
    } else {
        amount.to_string()
    }
}

/// Attributes of a turnover before the store assigned it an id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTurnover {
    pub account_id: i64,
    pub turnover_id: i64,
    pub kind: Option<String>,
    pub balance: Option<f64>,
    pub amount: f64,
    pub date: NaiveDate,
    pub value_date: Option<NaiveDate>,
    pub name: Option<String>,
    pub customer_ref: Option<String>,
    pub iban: Option<String>,
    pub bic: Option<String>,
    pub purpose: Option<String>,
    pub comment: Option<String>,
    pub commercial_transaction_code: Option<u32>,
    pub primanota: Option<u32>,
    pub person_id: Option<i64>,
}

impl NewTurnover {
    pub fn new(account_id: i64, turnover_id: i64, amount: f64, date: NaiveDate) -> Self {
        Self {
            account_id,
            turnover_id,
            kind: None,
            balance: None,
            amount,
            date,
            value_date: None,
            name: None,
            customer_ref: None,
            iban: None,
            bic: None,
            purpose: None,
            comment: None,
            commercial_transaction_code: None,
            primanota: None,
            person_id: None,
        }
    }

    pub fn with_iban(mut self, iban: &str) -> Self {
        self.iban = Some(iban.to_string());
        self
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn with_purpose(mut self, purpose: &str) -> Self {
        self.purpose = Some(purpose.to_string());
        self
    }

    pub(crate) fn validate(&self) -> ClientResult<()> {
        check_length("name", self.name.as_deref(), NAME_MAX_CHARS)?;
        check_length("iban", self.iban.as_deref(), IBAN_MAX_CHARS)?;
        check_length("bic", self.bic.as_deref(), BIC_MAX_CHARS)?;

        if !self.amount.is_finite() {
            return Err(ClientError::invalid_argument(
                "Turnover amount must be a finite number.",
            ));
        }

        if self.balance.is_some_and(|balance| !balance.is_finite()) {
            return Err(ClientError::invalid_argument(
                "Turnover balance must be a finite number.",
            ));
        }

        Ok(())
    }
}

fn check_length(field: &str, value: Option<&str>, max_chars: usize) -> ClientResult<()> {
    if let Some(text) = value {
        let actual_chars = text.chars().count();
        if actual_chars > max_chars {
            return Err(ClientError::field_too_long(field, max_chars, actual_chars));
        }
    }
    Ok(())
}
