use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime};
use tempfile::TempDir;

use club_clerk::certificate::{Certificate, CertificateRenderer};
use club_clerk::input::{Config, ConfigBuilder};

/// A temporary directory with the spreadsheets of one run.
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("should be able to create a temporary directory"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.path().join(name);
        std::fs::write(&path, contents).expect("should be able to write the fixture");
        path
    }

    pub fn output_dir(&self) -> PathBuf {
        self.path().join("certificates")
    }

    /// The embedded defaults, pointed at the spreadsheets in this workspace.
    #[allow(dead_code)]
    pub fn config(&self) -> ConfigBuilder {
        let mut builder = Config::embedded().expect("embedded config should be valid");
        builder
            .attendance(self.write("attendance.csv", ATTENDANCE))
            .roster(self.write("roster.csv", ROSTER))
            .calendar(self.write("calendar.csv", CALENDAR))
            .output_dir(self.output_dir());
        builder
    }
}

pub const ATTENDANCE: &str = concat!(
    "Name,Signed in\n",
    "\"Doe, Jon\",yes\n",
    "Mary Smith,yes\n",
    "\"Lee, Ann\",yes\n",
);

pub const ROSTER: &str = concat!(
    "Member Name,Email Address\n",
    "Jon Doe,jon@example.com\n",
    "\"Lee, Ann\",ann@example.com\n",
    "Bob Stone,bob@example.com\n",
);

pub const CALENDAR: &str = concat!(
    "LREC Calendar 2025-2026,,,,\n",
    "Date,Topic,Speaker,Location,Time\n",
    "9/17/2025,Levee Design,Sam Hill,Main Library,11:30 AM\n",
    "10/15/2025,Bridge Inspection,Jane Roe,Main Library,11:30 AM\n",
    "11/19/2025,Solar Farms,Pat Kim,City Hall,11:30 AM\n",
);

#[must_use]
pub fn at(year: i32, month: u32, day: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(9, 0, 0))
        .expect("date should be valid")
}

/// Writes the attendee name instead of compiling LaTeX.
pub struct FakeRenderer;

impl CertificateRenderer for FakeRenderer {
    fn render(&self, certificate: &Certificate<'_>) -> anyhow::Result<Vec<u8>> {
        Ok(format!("%PDF {}", certificate.attendee().name()).into_bytes())
    }
}
