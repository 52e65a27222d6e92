//! Column descriptors for the data grid.
//!
//! A column is an explicit capability bundle: how to identify the field,
//! how to title it, how to extract a cell string from a row, and whether
//! (and by what key) it participates in sorting. Descriptors are validated
//! at construction so a malformed column is a constructor error, not a
//! render-time surprise.

use thiserror::Error;

/// Extracts a display string from a row.
pub type CellFn<T> = Box<dyn Fn(&T) -> String + Send + Sync>;

/// Errors produced when building a column descriptor.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ColumnError {
    /// The column id was empty.
    #[error("column id must not be empty")]
    EmptyId,

    /// Two columns in the same grid share an id.
    #[error("duplicate column id: {0}")]
    DuplicateId(String),
}

/// A single column of the grid.
///
/// The grid never interprets row shape beyond what columns extract.
pub struct Column<T> {
    /// Unique identifier within one grid.
    id: String,
    /// Header text.
    header: String,
    /// Cell renderer.
    cell: CellFn<T>,
    /// Optional sort-key extractor; falls back to the cell text.
    sort_key: Option<CellFn<T>>,
    /// Whether header activation cycles a sort on this column.
    sortable: bool,
    /// Optional maximum rendered width, in cells.
    width: Option<u16>,
}

impl<T> Column<T> {
    /// Create a new column with an id, a header, and a cell renderer.
    pub fn new(
        id: impl Into<String>,
        header: impl Into<String>,
        cell: impl Fn(&T) -> String + Send + Sync + 'static,
    ) -> Result<Self, ColumnError> {
        let id = id.into();
        if id.is_empty() {
            return Err(ColumnError::EmptyId);
        }
        Ok(Self {
            id,
            header: header.into(),
            cell: Box::new(cell),
            sort_key: None,
            sortable: false,
            width: None,
        })
    }

    /// Mark the column as sortable.
    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    /// Use a dedicated sort key instead of the cell text.
    ///
    /// Implies the column is sortable.
    pub fn sort_by(mut self, key: impl Fn(&T) -> String + Send + Sync + 'static) -> Self {
        self.sort_key = Some(Box::new(key));
        self.sortable = true;
        self
    }

    /// Cap the rendered width of this column.
    pub fn max_width(mut self, width: u16) -> Self {
        self.width = Some(width);
        self
    }

    /// Get the column id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Get the header text.
    pub fn header(&self) -> &str {
        &self.header
    }

    /// Check whether the column is sortable.
    pub fn is_sortable(&self) -> bool {
        self.sortable
    }

    /// Get the configured width cap, if any.
    pub fn width_cap(&self) -> Option<u16> {
        self.width
    }

    /// Render the cell value for a row.
    pub fn cell_text(&self, row: &T) -> String {
        (self.cell)(row)
    }

    /// Extract the sort key for a row.
    ///
    /// Uses the dedicated key when configured, the cell text otherwise.
    pub fn sort_value(&self, row: &T) -> String {
        match &self.sort_key {
            Some(key) => key(row),
            None => self.cell_text(row),
        }
    }
}

/// Check a column set for duplicate ids.
pub(crate) fn validate_ids<T>(columns: &[Column<T>]) -> Result<(), ColumnError> {
    for (i, column) in columns.iter().enumerate() {
        if columns[..i].iter().any(|c| c.id == column.id) {
            return Err(ColumnError::DuplicateId(column.id.clone()));
        }
    }
    Ok(())
}
