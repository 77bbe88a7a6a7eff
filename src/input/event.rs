use core::fmt;
use std::path::Path;

use chrono::NaiveDateTime;
use log::{debug, info};

use crate::input::{ColumnSpec, LoadError, Table};
use crate::time::parse_flexible_date;

const DATE: usize = 0;
const TOPIC: usize = 1;
const SPEAKER: usize = 2;
const LOCATION: usize = 3;
const TIME: usize = 4;

const CALENDAR_COLUMNS: [ColumnSpec; 5] = [
    ColumnSpec::required("date"),
    ColumnSpec::required("topic"),
    ColumnSpec::required("speaker"),
    ColumnSpec::optional("location"),
    ColumnSpec::optional("time"),
];

/// The date of an event as it was written in the spreadsheet, together with
/// the parsed value if the text could be understood.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDate {
    raw: String,
    parsed: Option<NaiveDateTime>,
}

impl EventDate {
    #[must_use]
    pub fn parse(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let parsed = parse_flexible_date(&raw).ok();

        Self { raw, parsed }
    }

    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    #[must_use]
    pub fn parsed(&self) -> Option<NaiveDateTime> {
        self.parsed
    }

    /// The date as `YYYY-MM-DD` if it was parsed, the raw text otherwise.
    #[must_use]
    pub fn iso(&self) -> String {
        self.parsed.map_or_else(
            || self.raw.clone(),
            |date| date.format("%Y-%m-%d").to_string(),
        )
    }
}

impl fmt::Display for EventDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    date: EventDate,
    topic: String,
    speaker: String,
    location: String,
    time: String,
}

impl Event {
    #[must_use]
    pub fn new(
        date: impl Into<String>,
        topic: impl Into<String>,
        speaker: impl Into<String>,
    ) -> Self {
        Self {
            date: EventDate::parse(date),
            topic: topic.into(),
            speaker: speaker.into(),
            location: String::new(),
            time: String::new(),
        }
    }

    #[must_use]
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    #[must_use]
    pub fn with_time(mut self, time: impl Into<String>) -> Self {
        self.time = time.into();
        self
    }

    #[must_use]
    pub fn date(&self) -> &EventDate {
        &self.date
    }

    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }

    #[must_use]
    pub fn speaker(&self) -> &str {
        &self.speaker
    }

    #[must_use]
    pub fn location(&self) -> &str {
        &self.location
    }

    #[must_use]
    pub fn time(&self) -> &str {
        &self.time
    }
}

fn read_events(table: &Table, header_rows: usize) -> Result<Vec<Event>, LoadError> {
    let columns = table.columns(&CALENDAR_COLUMNS, header_rows)?;

    Ok(columns
        .records(table.rows())
        .map(|record| {
            Event::new(
                record.get(DATE).trim(),
                record.get(TOPIC),
                record.get(SPEAKER),
            )
            .with_location(record.get(LOCATION))
            .with_time(record.get(TIME))
        })
        .collect())
}

/// Reads the events that can be announced in a notice.
///
/// Only the first row is a header. Rows with a date that can not be parsed
/// are left out.
pub fn notice_events(table: &Table) -> Result<Vec<Event>, LoadError> {
    table.ensure_data_rows()?;

    let events = read_events(table, 1)?
        .into_iter()
        .filter(|event| {
            let keep = event.date().parsed().is_some();
            if !keep {
                debug!(
                    "skipping event \"{}\": unable to parse date \"{}\"",
                    event.topic(),
                    event.date()
                );
            }
            keep
        })
        .collect::<Vec<_>>();

    info!(
        "found {} events with a valid date in `{}`",
        events.len(),
        table.path().display()
    );

    Ok(events)
}

/// Reads the events a certificate can be issued for.
///
/// The header may be preceded by a banner row. An event needs a date, a topic
/// and a speaker, the date does not have to be parseable.
pub fn certificate_events(table: &Table) -> Result<Vec<Event>, LoadError> {
    table.ensure_data_rows()?;

    let events = read_events(table, 2)?
        .into_iter()
        .filter(|event| {
            !event.date().raw().is_empty()
                && !event.topic().is_empty()
                && !event.speaker().is_empty()
        })
        .collect::<Vec<_>>();

    info!(
        "found {} events in `{}`",
        events.len(),
        table.path().display()
    );

    Ok(events)
}

pub fn load_notice_events(path: impl AsRef<Path>) -> Result<Vec<Event>, LoadError> {
    notice_events(&Table::from_path(path)?)
}

pub fn load_certificate_events(path: impl AsRef<Path>) -> Result<Vec<Event>, LoadError> {
    certificate_events(&Table::from_path(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn table(rows: &[&[&str]]) -> Table {
        Table::new(
            "calendar.csv",
            rows.iter()
                .map(|row| row.iter().map(|cell| cell.to_string()).collect())
                .collect(),
        )
    }

    #[test]
    fn test_event_date_keeps_raw_text() {
        let date = EventDate::parse("Oct 15, 2025");

        assert_eq!(date.raw(), "Oct 15, 2025");
        assert_eq!(date.to_string(), "Oct 15, 2025");
        assert_eq!(
            date.parsed(),
            NaiveDate::from_ymd_opt(2025, 10, 15).and_then(|d| d.and_hms_opt(0, 0, 0))
        );
        assert_eq!(date.iso(), "2025-10-15");

        let unparsed = EventDate::parse("TBD");
        assert_eq!(unparsed.parsed(), None);
        assert_eq!(unparsed.iso(), "TBD");
    }

    #[test]
    fn test_notice_events_skip_unparseable_dates() {
        let table = table(&[
            &["Date", "Topic", "Speaker", "Location", "Time"],
            &["10/15/2025", "Bridges", "Jane Roe", "Main Library", "11:30 AM"],
            &["TBD", "Dams", "John Roe", "", ""],
            &["2025-11-19", "Levees", "Ann Poe"],
        ]);

        let events = notice_events(&table).unwrap();

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].topic(), "Bridges");
        assert_eq!(events[0].location(), "Main Library");
        assert_eq!(events[0].time(), "11:30 AM");
        assert_eq!(events[1].topic(), "Levees");
        assert_eq!(events[1].location(), "");
    }

    #[test]
    fn test_notice_events_need_data() {
        let table = table(&[&["Date", "Topic", "Speaker"]]);

        assert!(matches!(
            notice_events(&table),
            Err(LoadError::TooFewRows { .. })
        ));
    }

    #[test]
    fn test_notice_events_need_required_columns() {
        let table = table(&[&["Date", "Speaker"], &["10/15/2025", "Jane Roe"]]);

        match notice_events(&table) {
            Err(LoadError::MissingColumn { source, .. }) => assert_eq!(source.column(), "topic"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_certificate_events_need_data() {
        let table = table(&[&["Date", "Topic", "Speaker"]]);

        assert!(matches!(
            certificate_events(&table),
            Err(LoadError::TooFewRows { .. })
        ));
    }

    #[test]
    fn test_certificate_events_keep_unparsed_dates() {
        let table = table(&[
            &["2025-2026 Program Calendar"],
            &["Meeting Date", "Topic", "Speaker", "Location"],
            &["TBD", "Dams", "John Roe"],
            &["9/17/2025", "Bridges", "Jane Roe", "Main Library"],
            &["10/15/2025", "", "Ann Poe"],
            &["", "Levees", "Ann Poe"],
        ]);

        let events = certificate_events(&table).unwrap();

        assert_eq!(
            events.iter().map(Event::topic).collect::<Vec<_>>(),
            vec!["Dams", "Bridges"]
        );
        assert_eq!(events[0].date().parsed(), None);
        assert_eq!(events[1].location(), "Main Library");
    }
}
