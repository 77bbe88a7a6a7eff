use log::debug;
use thiserror::Error;

/// A column that should be looked up in the header of a spreadsheet.
///
/// A header cell matches if it contains the `key` ignoring case, so `"name"`
/// finds `"Full Name"` as well as `"Speaker Name"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    key: &'static str,
    required: bool,
}

impl ColumnSpec {
    #[must_use]
    pub const fn required(key: &'static str) -> Self {
        Self {
            key,
            required: true,
        }
    }

    #[must_use]
    pub const fn optional(key: &'static str) -> Self {
        Self {
            key,
            required: false,
        }
    }

    #[must_use]
    pub const fn key(&self) -> &'static str {
        self.key
    }

    #[must_use]
    pub const fn is_required(&self) -> bool {
        self.required
    }

    fn matches(&self, header: &str) -> bool {
        header.to_lowercase().contains(self.key)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("required column \"{column}\" not found")]
pub struct MissingColumnError {
    column: String,
}

impl MissingColumnError {
    #[must_use]
    pub fn column(&self) -> &str {
        &self.column
    }
}

/// The resolved positions of a list of [`ColumnSpec`]s.
///
/// Columns are addressed by the position of their spec in the list that was
/// passed to [`ColumnMap::locate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    indices: Vec<Option<usize>>,
    header_row: usize,
    min_row_len: usize,
}

impl ColumnMap {
    /// Scans at most `header_rows` rows for the header cells.
    ///
    /// A header cell is claimed by the first spec whose key it contains, and
    /// within a row the first cell found for a spec wins. A match in a later
    /// row replaces one from an earlier row, so a banner above the header can
    /// not keep a column. Scanning stops as soon as every required column has
    /// been found.
    pub fn locate(
        rows: &[Vec<String>],
        specs: &[ColumnSpec],
        header_rows: usize,
    ) -> Result<Self, MissingColumnError> {
        let mut indices = vec![None; specs.len()];
        let mut header_row = 0;

        for (row_index, row) in rows.iter().enumerate().take(header_rows.max(1)) {
            header_row = row_index;

            let mut row_indices = vec![None; specs.len()];
            for (column, cell) in row.iter().enumerate() {
                if let Some(target) = specs.iter().position(|spec| spec.matches(cell)) {
                    if row_indices[target].is_none() {
                        row_indices[target] = Some(column);
                    }
                }
            }

            for (index, found) in indices.iter_mut().zip(row_indices) {
                if found.is_some() {
                    *index = found;
                }
            }

            let all_required_found = specs
                .iter()
                .zip(&indices)
                .all(|(spec, index)| !spec.is_required() || index.is_some());

            if all_required_found {
                break;
            }
        }

        if let Some((spec, _)) = specs
            .iter()
            .zip(&indices)
            .find(|(spec, index)| spec.is_required() && index.is_none())
        {
            return Err(MissingColumnError {
                column: spec.key().to_string(),
            });
        }

        let min_row_len = specs
            .iter()
            .zip(&indices)
            .filter(|(spec, _)| spec.is_required())
            .filter_map(|(_, index)| *index)
            .max()
            .map_or(0, |index| index + 1);

        Ok(Self {
            indices,
            header_row,
            min_row_len,
        })
    }

    /// Returns the column index of the spec at position `column`.
    #[must_use]
    pub fn index(&self, column: usize) -> Option<usize> {
        self.indices.get(column).copied().flatten()
    }

    /// The row that was the last header row, data starts right after it.
    #[must_use]
    pub fn header_row(&self) -> usize {
        self.header_row
    }

    /// Iterates over all data rows that are long enough to hold every required
    /// column. Shorter rows are skipped.
    pub fn records<'a>(&'a self, rows: &'a [Vec<String>]) -> impl Iterator<Item = Record<'a>> + 'a {
        rows.iter()
            .enumerate()
            .skip(self.header_row + 1)
            .filter_map(move |(number, row)| {
                if row.len() < self.min_row_len {
                    debug!("skipping row {}: only {} cells", number + 1, row.len());
                    return None;
                }

                Some(Record {
                    number: number + 1,
                    row,
                    map: self,
                })
            })
    }
}

/// A single data row, seen through a [`ColumnMap`].
#[derive(Debug, Clone, Copy)]
pub struct Record<'a> {
    number: usize,
    row: &'a [String],
    map: &'a ColumnMap,
}

impl<'a> Record<'a> {
    /// The one-based row number in the source, used for log messages.
    #[must_use]
    pub fn number(&self) -> usize {
        self.number
    }

    /// Returns the cell of the spec at position `column`, or an empty string
    /// if the column is unknown or the row is too short.
    #[must_use]
    pub fn get(&self, column: usize) -> &'a str {
        self.map
            .index(column)
            .and_then(|index| self.row.get(index))
            .map_or("", String::as_str)
    }
}
