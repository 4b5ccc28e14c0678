use serde::Serialize;

/// Target of a booking, e.g. an income or expense category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Account {
    pub id: i64,
    pub name: String,
}

/// Allocation of (part of) a turnover's amount to an [`Account`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Booking {
    pub id: i64,
    pub turnover_id: i64,
    pub account_id: i64,
    pub amount: f64,
}
