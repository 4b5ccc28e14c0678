use serde::Serialize;

use crate::ClientResult;
use crate::ledger::Ledger;
use crate::model::Turnover;
use crate::store::{PersonFilter, TurnoverFilter};

/// Outcome of linking one turnover to a person by its IBAN.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum IbanMatch {
    Matched { person_id: i64 },
    /// Several person accounts share the IBAN; the turnover is left alone.
    Ambiguous { candidates: usize },
    Unmatched,
    NoIban,
    AlreadyMatched,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MatchSummary {
    pub matched: usize,
    pub ambiguous: usize,
    pub unmatched: usize,
    pub skipped: usize,
}

impl MatchSummary {
    fn record(&mut self, outcome: IbanMatch) {
        match outcome {
            IbanMatch::Matched { .. } => self.matched += 1,
            IbanMatch::Ambiguous { .. } => self.ambiguous += 1,
            IbanMatch::Unmatched => self.unmatched += 1,
            IbanMatch::NoIban | IbanMatch::AlreadyMatched => self.skipped += 1,
        }
    }
}

impl Ledger {
    /// Assigns the owner of the turnover's IBAN when exactly one person
    /// account carries it, and persists the change.
    pub fn match_iban(&self, turnover: &mut Turnover) -> ClientResult<IbanMatch> {
        if turnover.has_person() {
            return Ok(IbanMatch::AlreadyMatched);
        }

        let Some(iban) = turnover.matchable_iban() else {
            return Ok(IbanMatch::NoIban);
        };

        let accounts = self.person_accounts_by_iban(iban)?;
        let [account] = accounts.as_slice() else {
            if accounts.is_empty() {
                return Ok(IbanMatch::Unmatched);
            }
            tracing::debug!(
                turnover = turnover.id,
                candidates = accounts.len(),
                "skipping ambiguous IBAN"
            );
            return Ok(IbanMatch::Ambiguous {
                candidates: accounts.len(),
            });
        };

        let person = self.person(account.person_id)?;
        turnover.person_id = Some(account.person_id);
        turnover.person_name = person.map(|found| found.name);
        self.save_turnover(turnover)?;

        tracing::debug!(
            turnover = turnover.id,
            person_id = account.person_id,
            "matched turnover by IBAN"
        );
        Ok(IbanMatch::Matched {
            person_id: account.person_id,
        })
    }

    /// Runs [`Ledger::match_iban`] over every turnover lacking a person.
    pub fn match_ibans_for_all(&self, turnovers: &mut [Turnover]) -> ClientResult<MatchSummary> {
        let mut summary = MatchSummary::default();
        for turnover in turnovers.iter_mut() {
            summary.record(self.match_iban(turnover)?);
        }

        tracing::info!(
            matched = summary.matched,
            ambiguous = summary.ambiguous,
            unmatched = summary.unmatched,
            skipped = summary.skipped,
            "IBAN matching finished"
        );
        Ok(summary)
    }

    /// Loads the unmatched turnovers selected by `filter` and matches them.
    pub fn match_ibans(&self, filter: &TurnoverFilter) -> ClientResult<MatchSummary> {
        let mut selection = filter.clone();
        selection.person = PersonFilter::Unset;

        let mut turnovers = self.turnovers(&selection)?;
        self.match_ibans_for_all(&mut turnovers)
    }
}
