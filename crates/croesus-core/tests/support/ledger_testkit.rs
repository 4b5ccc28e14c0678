#![allow(dead_code)]

use chrono::NaiveDate;
use croesus_core::{Ledger, NewTurnover, Turnover};
use tempfile::{TempDir, tempdir};

pub fn temp_ledger() -> Option<(TempDir, Ledger)> {
    let dir = tempdir().ok()?;
    let home = dir.path().join("ledger-home");
    let ledger = Ledger::open_at(&home);
    assert!(ledger.is_ok());
    let ledger = ledger.ok()?;
    Some((dir, ledger))
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

pub fn import(
    ledger: &Ledger,
    account_id: i64,
    turnover_id: i64,
    amount: f64,
    on: NaiveDate,
) -> Option<Turnover> {
    import_row(ledger, NewTurnover::new(account_id, turnover_id, amount, on))
}

pub fn import_row(ledger: &Ledger, row: NewTurnover) -> Option<Turnover> {
    let created = ledger.create_turnover(row);
    assert!(created.is_ok());
    created.ok()
}

pub fn reload(ledger: &Ledger, turnover: &Turnover) -> Option<Turnover> {
    let loaded = ledger.turnover(turnover.id);
    assert!(loaded.is_ok());
    let found = loaded.ok().flatten();
    assert!(found.is_some(), "turnover {} is missing", turnover.id);
    found
}
