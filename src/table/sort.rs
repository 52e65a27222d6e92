//! Sorting state and the header-activation sort cycle.
//!
//! The state carries an ordered sequence of `(column, direction)` entries
//! so hosts that want multi-column sorting have a place to put it, but
//! [`SortState::cycle_column`], the only mutation the grid itself performs,
//! always collapses to zero or one entries: activating a sortable header
//! cycles unsorted → ascending → descending → unsorted.

use super::column::Column;

/// Direction of an active sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    /// Smallest sort key first.
    Ascending,
    /// Largest sort key first.
    Descending,
}

impl SortDirection {
    /// The marker rendered next to a sorted header.
    pub fn marker(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "▲",
            SortDirection::Descending => "▼",
        }
    }
}

/// One active sort entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sort {
    /// The sorted column's id.
    pub column_id: String,
    /// The sort direction.
    pub direction: SortDirection,
}

/// The full sorting state of a grid.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SortState {
    entries: Vec<Sort>,
}

impl SortState {
    /// Create an unsorted state.
    pub fn unsorted() -> Self {
        Self::default()
    }

    /// Create a single-column sort.
    pub fn single(column_id: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            entries: vec![Sort {
                column_id: column_id.into(),
                direction,
            }],
        }
    }

    /// Check whether no sort is active.
    pub fn is_unsorted(&self) -> bool {
        self.entries.is_empty()
    }

    /// The active entry, if any.
    ///
    /// In practice the sequence holds at most one entry; this returns the
    /// first.
    pub fn active(&self) -> Option<&Sort> {
        self.entries.first()
    }

    /// All entries, in priority order.
    pub fn entries(&self) -> &[Sort] {
        &self.entries
    }

    /// The direction active on the given column, if any.
    pub fn direction_of(&self, column_id: &str) -> Option<SortDirection> {
        self.entries
            .iter()
            .find(|s| s.column_id == column_id)
            .map(|s| s.direction)
    }

    /// Advance the sort cycle for a column.
    ///
    /// Unsorted (or sorted on another column) → ascending → descending →
    /// unsorted. The result always has zero or one entries.
    pub fn cycle_column(&mut self, column_id: &str) {
        let next = match self.active() {
            Some(sort) if sort.column_id == column_id => match sort.direction {
                SortDirection::Ascending => Some(SortDirection::Descending),
                SortDirection::Descending => None,
            },
            _ => Some(SortDirection::Ascending),
        };

        self.entries.clear();
        if let Some(direction) = next {
            self.entries.push(Sort {
                column_id: column_id.to_string(),
                direction,
            });
        }
    }
}

/// Stable in-place sort of rows by a column's extracted key.
///
/// Used in client mode only; in manual mode the host reorders (usually by
/// re-querying its backend).
pub fn sort_rows<T>(rows: &mut [T], column: &Column<T>, direction: SortDirection) {
    match direction {
        SortDirection::Ascending => {
            rows.sort_by(|a, b| column.sort_value(a).cmp(&column.sort_value(b)));
        }
        SortDirection::Descending => {
            rows.sort_by(|a, b| column.sort_value(b).cmp(&column.sort_value(a)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsorted_by_default() {
        let state = SortState::default();
        assert!(state.is_unsorted());
        assert!(state.active().is_none());
    }

    #[test]
    fn test_three_activations_cycle_back_to_unsorted() {
        let mut state = SortState::unsorted();

        state.cycle_column("price");
        assert_eq!(
            state.active(),
            Some(&Sort {
                column_id: "price".to_string(),
                direction: SortDirection::Ascending,
            })
        );

        state.cycle_column("price");
        assert_eq!(state.direction_of("price"), Some(SortDirection::Descending));

        state.cycle_column("price");
        assert!(state.is_unsorted());

        // A fourth activation restarts the cycle.
        state.cycle_column("price");
        assert_eq!(state.direction_of("price"), Some(SortDirection::Ascending));
    }

    #[test]
    fn test_cycling_another_column_replaces_the_active_sort() {
        let mut state = SortState::single("price", SortDirection::Descending);

        state.cycle_column("name");

        assert_eq!(state.entries().len(), 1);
        assert_eq!(state.direction_of("name"), Some(SortDirection::Ascending));
        assert_eq!(state.direction_of("price"), None);
    }

    #[test]
    fn test_cycle_always_collapses_to_at_most_one_entry() {
        let mut state = SortState::unsorted();
        for id in ["a", "b", "c", "a"] {
            state.cycle_column(id);
            assert!(state.entries().len() <= 1);
        }
    }

    #[test]
    fn test_sort_rows_ascending_and_descending() {
        let column = Column::new("v", "V", |s: &String| s.clone()).unwrap();
        let mut rows = vec!["pear".to_string(), "apple".to_string(), "plum".to_string()];

        sort_rows(&mut rows, &column, SortDirection::Ascending);
        assert_eq!(rows, vec!["apple", "pear", "plum"]);

        sort_rows(&mut rows, &column, SortDirection::Descending);
        assert_eq!(rows, vec!["plum", "pear", "apple"]);
    }

    #[test]
    fn test_sort_rows_is_stable() {
        // Equal keys keep their relative order.
        let column = Column::new("k", "K", |p: &(String, u32)| p.0.clone()).unwrap();
        let mut rows = vec![
            ("b".to_string(), 1),
            ("a".to_string(), 1),
            ("b".to_string(), 2),
            ("a".to_string(), 2),
        ];

        sort_rows(&mut rows, &column, SortDirection::Ascending);
        assert_eq!(
            rows,
            vec![
                ("a".to_string(), 1),
                ("a".to_string(), 2),
                ("b".to_string(), 1),
                ("b".to_string(), 2),
            ]
        );
    }

    #[test]
    fn test_markers() {
        assert_eq!(SortDirection::Ascending.marker(), "▲");
        assert_eq!(SortDirection::Descending.marker(), "▼");
    }
}
