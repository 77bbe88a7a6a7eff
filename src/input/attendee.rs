use std::collections::HashMap;
use std::path::Path;

use log::{debug, info, warn};

use crate::input::{ColumnSpec, LoadError, Table};

/// Converts `"Last, First"` to `"First Last"`.
///
/// Names without exactly one comma are only trimmed.
#[must_use]
pub fn normalize_name(name: &str) -> String {
    match name.split(',').collect::<Vec<_>>().as_slice() {
        [last, first] => format!("{} {}", first.trim(), last.trim()),
        _ => name.trim().to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attendee {
    name: String,
    email: Option<String>,
}

impl Attendee {
    /// Creates an attendee without an email address, the `name` is normalized.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: normalize_name(name),
            email: None,
        }
    }

    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }
}

/// Maps normalized member names to their email address.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RosterIndex {
    emails: HashMap<String, String>,
}

impl RosterIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a member, later entries for the same name replace earlier ones.
    pub fn insert(&mut self, name: &str, email: impl Into<String>) {
        self.emails.insert(normalize_name(name), email.into());
    }

    #[must_use]
    pub fn email_of(&self, name: &str) -> Option<&str> {
        self.emails.get(name).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.emails.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.emails.is_empty()
    }

    /// Assigns the email address to every attendee whose name is in the roster.
    ///
    /// Attendees without an exact match keep no email address.
    pub fn assign_emails(&self, attendees: &mut [Attendee]) {
        for attendee in attendees.iter_mut() {
            match self.email_of(&attendee.name) {
                Some(email) => attendee.email = Some(email.to_string()),
                None => warn!("\"{}\" is not in the roster", attendee.name),
            }
        }
    }

    pub fn from_table(table: &Table) -> Result<Self, LoadError> {
        const NAME: usize = 0;
        const EMAIL: usize = 1;

        table.ensure_data_rows()?;
        let columns = table.columns(
            &[ColumnSpec::required("name"), ColumnSpec::required("email")],
            1,
        )?;

        let mut roster = Self::new();
        for record in columns.records(table.rows()) {
            let name = record.get(NAME).trim();
            let email = record.get(EMAIL).trim();

            if name.is_empty() || email.is_empty() {
                debug!("skipping roster row {}: missing name or email", record.number());
                continue;
            }

            roster.insert(name, email);
        }

        if roster.is_empty() {
            warn!("no member of `{}` has an email address", table.path().display());
        }

        info!(
            "found {} members in `{}`",
            roster.len(),
            table.path().display()
        );

        Ok(roster)
    }
}

pub fn attendees_from_table(table: &Table) -> Result<Vec<Attendee>, LoadError> {
    const NAME: usize = 0;

    table.ensure_data_rows()?;
    let columns = table.columns(&[ColumnSpec::required("name")], 1)?;

    let attendees = columns
        .records(table.rows())
        .map(|record| record.get(NAME))
        .filter(|name| !name.trim().is_empty())
        .map(Attendee::new)
        .collect::<Vec<_>>();

    info!(
        "found {} attendees in `{}`",
        attendees.len(),
        table.path().display()
    );

    Ok(attendees)
}

pub fn load_attendance(path: impl AsRef<Path>) -> Result<Vec<Attendee>, LoadError> {
    attendees_from_table(&Table::from_path(path)?)
}

pub fn load_roster(path: impl AsRef<Path>) -> Result<RosterIndex, LoadError> {
    RosterIndex::from_table(&Table::from_path(path)?)
}
