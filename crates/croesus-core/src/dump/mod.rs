pub mod pretty;

use std::io::Write;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::ledger::Ledger;
use crate::model::Turnover;
use crate::store::TurnoverFilter;
use crate::{ClientError, ClientResult};

pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DumpSummary {
    /// Month sections written, including empty ones.
    pub sections: usize,
    pub turnovers: usize,
    /// `YYYY-MM` of the first section.
    pub first_month: Option<String>,
    pub last_month: Option<String>,
}

/// Every (year, month) from `first` to `last`, both inclusive.
pub fn month_sequence(first: NaiveDate, last: NaiveDate) -> Vec<(i32, u32)> {
    let mut months = Vec::new();

    for year in first.year()..=last.year() {
        let month_min = if year == first.year() { first.month() } else { 1 };
        let month_max = if year == last.year() { last.month() } else { 12 };

        for month in month_min..=month_max {
            months.push((year, month));
        }
    }

    months
}

pub fn month_title(year: i32, month: u32) -> String {
    let name = usize::try_from(month)
        .ok()
        .and_then(|number| number.checked_sub(1))
        .and_then(|index| MONTH_NAMES.get(index))
        .copied()
        .unwrap_or("?");
    format!("{year} {name}")
}

pub fn write_title<W: Write>(sink: &mut W, title: &str) -> std::io::Result<()> {
    let underline = "=".repeat(title.chars().count());
    write!(sink, "{title}\n{underline}\n\n")
}

/// Writes `turnovers` grouped into one section per calendar month between the
/// earliest and latest turnover date.
///
/// Turnovers keep their order within a section. An empty slice writes nothing.
pub fn write_dump<W: Write>(turnovers: &[Turnover], sink: &mut W) -> ClientResult<DumpSummary> {
    let dates = turnovers.iter().map(|turnover| turnover.date);
    let (Some(first), Some(last)) = (dates.clone().min(), dates.max()) else {
        tracing::debug!("no turnovers to dump");
        return Ok(DumpSummary::default());
    };

    let months = month_sequence(first, last);
    let mut written = 0_usize;

    for &(year, month) in &months {
        write_title(sink, &month_title(year, month)).map_err(write_failed)?;

        for turnover in turnovers
            .iter()
            .filter(|turnover| turnover.is_in_month(year, month))
        {
            let block = pretty::render_record(turnover)?;
            sink.write_all(block.as_bytes()).map_err(write_failed)?;
            sink.write_all(b"\n").map_err(write_failed)?;
            written += 1;
        }
    }

    tracing::debug!(sections = months.len(), turnovers = written, "dump written");

    Ok(DumpSummary {
        sections: months.len(),
        turnovers: written,
        first_month: Some(format!("{}-{:02}", first.year(), first.month())),
        last_month: Some(format!("{}-{:02}", last.year(), last.month())),
    })
}

fn write_failed(error: std::io::Error) -> ClientError {
    ClientError::dump_write_failed(&error.to_string())
}

impl Ledger {
    /// Dumps the turnovers selected by `filter` in store order.
    pub fn dump<W: Write>(
        &self,
        filter: &TurnoverFilter,
        sink: &mut W,
    ) -> ClientResult<DumpSummary> {
        let turnovers = self.turnovers(filter)?;
        write_dump(&turnovers, sink)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{month_sequence, month_title, write_dump, write_title};

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
    }

    #[test]
    fn sequence_within_one_month() {
        assert_eq!(
            month_sequence(date(2024, 5, 1), date(2024, 5, 31)),
            vec![(2024, 5)]
        );
    }

    #[test]
    fn sequence_crosses_year_boundary() {
        assert_eq!(
            month_sequence(date(2023, 11, 15), date(2024, 2, 10)),
            vec![(2023, 11), (2023, 12), (2024, 1), (2024, 2)]
        );
    }

    #[test]
    fn interior_years_cover_all_months() {
        let months = month_sequence(date(2021, 12, 1), date(2023, 1, 1));
        assert_eq!(months.len(), 14);
        assert_eq!(months.first(), Some(&(2021, 12)));
        assert_eq!(months.get(1), Some(&(2022, 1)));
        assert_eq!(months.get(12), Some(&(2022, 12)));
        assert_eq!(months.last(), Some(&(2023, 1)));
    }

    #[test]
    fn titles_use_english_month_names() {
        assert_eq!(month_title(2023, 11), "2023 November");
        assert_eq!(month_title(2024, 1), "2024 January");
        assert_eq!(month_title(2024, 13), "2024 ?");
    }

    #[test]
    fn title_is_underlined() {
        let mut sink: Vec<u8> = Vec::new();
        assert!(write_title(&mut sink, "2024 May").is_ok());
        assert_eq!(String::from_utf8_lossy(&sink), "2024 May\n========\n\n");
    }

    #[test]
    fn empty_input_writes_nothing() {
        let mut sink: Vec<u8> = Vec::new();
        let summary = write_dump(&[], &mut sink);
        assert!(summary.is_ok());
        if let Ok(summary) = summary {
            assert_eq!(summary.sections, 0);
            assert_eq!(summary.turnovers, 0);
            assert_eq!(summary.first_month, None);
        }
        assert!(sink.is_empty());
    }
}
