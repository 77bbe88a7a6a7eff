use std::io;
use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto, Data, Reader};
use chrono::NaiveTime;
use log::{debug, trace, warn};
use thiserror::Error;

use crate::input::{ColumnMap, ColumnSpec, MissingColumnError};
use crate::time::{date_from_serial, DISPLAY_FORMAT};
use crate::utils::PathExt;

/// File extensions that are opened as a workbook, everything else is read as csv.
const WORKBOOK_EXTENSIONS: [&str; 5] = ["xlsx", "xlsm", "xlsb", "xls", "ods"];

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read `{path}` as csv")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("failed to open workbook `{path}`")]
    Workbook {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },
    #[error("no sheets found in `{path}`")]
    NoSheets { path: PathBuf },
    #[error("`{path}` must have a header and at least one data row")]
    TooFewRows { path: PathBuf },
    #[error("missing a required column in `{path}`")]
    MissingColumn {
        path: PathBuf,
        #[source]
        source: MissingColumnError,
    },
}

/// The cells of a spreadsheet as text, row by row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    path: PathBuf,
    rows: Vec<Vec<String>>,
}

impl Table {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, rows: Vec<Vec<String>>) -> Self {
        Self {
            path: path.into(),
            rows,
        }
    }

    /// Opens the first sheet of a workbook or a csv file, depending on the
    /// file extension.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();

        let table = if path.has_any_extension(&WORKBOOK_EXTENSIONS) {
            Self::from_workbook(path)?
        } else {
            Self::from_csv(path)?
        };

        debug!("loaded {} rows from `{}`", table.rows.len(), path.display());

        Ok(table)
    }

    pub fn from_csv(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        trace!("reading csv from: {}", path.display());

        let csv_error = |source| LoadError::Csv {
            path: path.to_path_buf(),
            source,
        };

        let reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(path)
            .map_err(csv_error)?;

        Self::from_csv_reader(path, reader).map_err(csv_error)
    }

    /// Reads every record of `reader`. A record that can not be decoded is
    /// logged and skipped, only I/O errors end the read.
    fn from_csv_reader<R: io::Read>(
        path: &Path,
        mut reader: csv::Reader<R>,
    ) -> Result<Self, csv::Error> {
        let mut rows = Vec::new();

        for record in reader.records() {
            match record {
                Ok(record) => rows.push(record.iter().map(str::to_string).collect()),
                Err(e) if e.is_io_error() => return Err(e),
                Err(e) => {
                    let line = e.position().map_or(0, csv::Position::line);
                    warn!(
                        "skipping line {} of `{}`: {}",
                        line,
                        path.display(),
                        e
                    );
                }
            }
        }

        Ok(Self::new(path, rows))
    }

    pub fn from_workbook(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        trace!("reading workbook from: {}", path.display());

        let workbook_error = |source| LoadError::Workbook {
            path: path.to_path_buf(),
            source,
        };

        let mut workbook = open_workbook_auto(path).map_err(workbook_error)?;
        let sheet = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| LoadError::NoSheets {
                path: path.to_path_buf(),
            })?;

        debug!("using sheet \"{}\" of `{}`", sheet, path.display());

        let range = workbook.worksheet_range(&sheet).map_err(workbook_error)?;
        let rows = range
            .rows()
            .map(|row| row.iter().map(cell_to_string).collect())
            .collect();

        Ok(Self::new(path, rows))
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Fails if there is not at least a header and one more row.
    pub fn ensure_data_rows(&self) -> Result<(), LoadError> {
        if self.rows.len() < 2 {
            return Err(LoadError::TooFewRows {
                path: self.path.clone(),
            });
        }

        Ok(())
    }

    /// Finds the given columns in the first `header_rows` rows.
    pub fn columns(&self, specs: &[ColumnSpec], header_rows: usize) -> Result<ColumnMap, LoadError> {
        ColumnMap::locate(&self.rows, specs, header_rows).map_err(|source| {
            LoadError::MissingColumn {
                path: self.path.clone(),
                source,
            }
        })
    }
}

fn format_serial(serial: f64) -> String {
    // values below one day are a time of day without a date
    if (0.0..1.0).contains(&serial) {
        let seconds = (serial * 86_400.0).round() as u32 % 86_400;
        return NaiveTime::from_num_seconds_from_midnight_opt(seconds, 0)
            .map_or_else(|| serial.to_string(), |time| time.format("%-I:%M %p").to_string());
    }

    date_from_serial(serial).map_or_else(
        || serial.to_string(),
        |date| date.format(DISPLAY_FORMAT).to_string(),
    )
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty | Data::Error(_) => String::new(),
        Data::String(value) | Data::DateTimeIso(value) | Data::DurationIso(value) => value.clone(),
        // `Display` of f64 leaves out the fraction of whole numbers
        Data::Float(value) => value.to_string(),
        Data::Int(value) => value.to_string(),
        Data::Bool(value) => value.to_string(),
        Data::DateTime(value) => format_serial(value.as_f64()),
    }
}
