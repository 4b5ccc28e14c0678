use std::io::{self, Write};

use croesus_core::{NewTurnover, TurnoverFilter, write_dump};

mod support;

use support::ledger_testkit::{date, import, import_row, temp_ledger};

const TITLES: [&str; 4] = [
    "2023 November",
    "2023 December",
    "2024 January",
    "2024 February",
];

fn dump_text(ledger: &croesus_core::Ledger, filter: &TurnoverFilter) -> String {
    let mut sink: Vec<u8> = Vec::new();
    let summary = ledger.dump(filter, &mut sink);
    assert!(summary.is_ok());
    String::from_utf8_lossy(&sink).into_owned()
}

fn title_lines(text: &str) -> Vec<String> {
    let lines: Vec<&str> = text.lines().collect();
    lines
        .windows(2)
        .filter(|pair| !pair[1].is_empty() && pair[1].chars().all(|ch| ch == '='))
        .map(|pair| pair[0].to_string())
        .collect()
}

fn section<'a>(text: &'a str, title: &str) -> &'a str {
    let Some(start) = text.find(&format!("{title}\n")) else {
        return "";
    };
    let rest = &text[start + title.len() + 1..];
    let body_start = rest.find("\n\n").map_or(rest.len(), |index| index + 2);
    let body = &rest[body_start..];
    let end = TITLES
        .iter()
        .filter_map(|next| body.find(&format!("{next}\n")))
        .min()
        .unwrap_or(body.len());
    &body[..end]
}

#[test]
fn dump_spans_every_month_between_first_and_last_turnover() {
    let Some((_dir, ledger)) = temp_ledger() else {
        return;
    };
    assert!(import(&ledger, 1, 10, -50.0, date(2024, 2, 10)).is_some());
    assert!(import(&ledger, 1, 20, 75.5, date(2023, 11, 15)).is_some());

    let mut sink: Vec<u8> = Vec::new();
    let summary = ledger.dump(&TurnoverFilter::all(), &mut sink);
    assert!(summary.is_ok());
    if let Ok(summary) = summary {
        assert_eq!(summary.sections, 4);
        assert_eq!(summary.turnovers, 2);
        assert_eq!(summary.first_month.as_deref(), Some("2023-11"));
        assert_eq!(summary.last_month.as_deref(), Some("2024-02"));
    }

    let text = String::from_utf8_lossy(&sink).into_owned();
    assert_eq!(title_lines(&text), TITLES.to_vec());

    let november = section(&text, "2023 November");
    assert!(november.contains("turnover_id: 20\n"));
    assert!(november.contains("date: 2023-11-15\n"));
    assert!(!november.contains("turnover_id: 10\n"));

    assert!(section(&text, "2023 December").is_empty());
    assert!(section(&text, "2024 January").is_empty());

    let february = section(&text, "2024 February");
    assert!(february.contains("turnover_id: 10\n"));
    assert!(february.contains("amount: -50.0\n"));
}

#[test]
fn dump_starts_with_underlined_title_and_separates_records() {
    let Some((_dir, ledger)) = temp_ledger() else {
        return;
    };
    assert!(import(&ledger, 1, 1, 10.0, date(2024, 5, 3)).is_some());
    assert!(import(&ledger, 1, 2, 20.0, date(2024, 5, 4)).is_some());

    let text = dump_text(&ledger, &TurnoverFilter::all());
    assert!(text.starts_with("2024 May\n========\n\n- id: "));
    assert_eq!(text.matches("\n\n- id: ").count(), 2);
    assert!(text.ends_with("\n\n"));
}

#[test]
fn records_within_a_month_follow_account_then_turnover_order() {
    let Some((_dir, ledger)) = temp_ledger() else {
        return;
    };
    assert!(import(&ledger, 2, 1, 1.0, date(2024, 5, 1)).is_some());
    assert!(import(&ledger, 1, 9, 1.0, date(2024, 5, 30)).is_some());
    assert!(import(&ledger, 1, 4, 1.0, date(2024, 5, 15)).is_some());

    let text = dump_text(&ledger, &TurnoverFilter::all());
    let positions: Vec<usize> = ["turnover_id: 4\n", "turnover_id: 9\n", "turnover_id: 1\n"]
        .iter()
        .filter_map(|needle| text.find(needle))
        .collect();
    assert_eq!(positions.len(), 3);
    assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
}

#[test]
fn record_lists_turnover_fields_in_declaration_order() {
    let Some((_dir, ledger)) = temp_ledger() else {
        return;
    };
    let person = ledger.create_person("Grace Hopper");
    assert!(person.is_ok());
    let Ok(person) = person else {
        return;
    };

    let mut row = NewTurnover::new(7, 3, 12.0, date(2024, 8, 1))
        .with_name("Grace Hopper")
        .with_purpose("Beitrag\n2024");
    row.kind = Some("Gutschrift".to_string());
    row.person_id = Some(person.id);
    assert!(import_row(&ledger, row).is_some());

    let text = dump_text(&ledger, &TurnoverFilter::all());
    let expected_order = [
        "- id: ",
        "  account_id: 7\n",
        "  turnover_id: 3\n",
        "  type: Gutschrift\n",
        "  balance: null\n",
        "  amount: 12.0\n",
        "  date: 2024-08-01\n",
        "  value_date: null\n",
        "  name: Grace Hopper\n",
        "  purpose: |-\n    Beitrag\n    2024\n",
        "  person: ",
    ];
    let positions: Vec<usize> = expected_order
        .iter()
        .filter_map(|needle| text.find(needle))
        .collect();
    assert_eq!(positions.len(), expected_order.len());
    assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
    assert!(!text.contains("bookable"));
    assert!(!text.contains("person_name"));
}

#[test]
fn dump_respects_filter() {
    let Some((_dir, ledger)) = temp_ledger() else {
        return;
    };
    assert!(import(&ledger, 1, 1, 1.0, date(2024, 1, 10)).is_some());
    assert!(import(&ledger, 2, 2, 1.0, date(2024, 3, 10)).is_some());

    let text = dump_text(&ledger, &TurnoverFilter::all().account(2));
    assert_eq!(title_lines(&text), vec!["2024 March".to_string()]);
}

#[test]
fn empty_ledger_dump_writes_nothing() {
    let Some((_dir, ledger)) = temp_ledger() else {
        return;
    };

    let mut sink: Vec<u8> = Vec::new();
    let summary = ledger.dump(&TurnoverFilter::all(), &mut sink);
    assert!(summary.is_ok());
    if let Ok(summary) = summary {
        assert_eq!(summary.sections, 0);
        assert_eq!(summary.turnovers, 0);
        assert_eq!(summary.last_month, None);
    }
    assert!(sink.is_empty());
}

struct BrokenSink;

impl Write for BrokenSink {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::other("disk full"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn failing_sink_surfaces_dump_write_failed() {
    let Some((_dir, ledger)) = temp_ledger() else {
        return;
    };
    let Some(turnover) = import(&ledger, 1, 1, 1.0, date(2024, 1, 10)) else {
        return;
    };

    let result = write_dump(&[turnover], &mut BrokenSink);
    assert!(result.is_err());
    if let Err(error) = result {
        assert_eq!(error.code, "dump_write_failed");
        assert!(error.message.contains("disk full"));
    }
}
