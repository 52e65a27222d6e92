//! lazygrid - a data-grid engine for terminal dashboards.
//!
//! Building blocks for list-heavy TUI screens: an interactive table with
//! pagination and sorting, filter dropdowns, and a debounced search box
//! with autocomplete, plus the plumbing they share (newest-wins background
//! fetches, a REST source, configuration, logging).
//!
//! The grid never fetches data itself. In manual mode it emits
//! [`table::GridAction`]s and the host re-queries its backend, usually
//! through [`remote::RestSource`] behind a [`fetch::QueryStream`]; in
//! client mode it pages, sorts, and filters a local row set.

pub mod components;
pub mod config;
pub mod debounce;
pub mod error;
pub mod fetch;
pub mod logging;
pub mod remote;
pub mod table;

pub use components::{
    FilterAction, FilterDropdown, FilterOption, FilterValue, SearchBox, SearchEvent, TextInput,
};
pub use config::GridConfig;
pub use debounce::Debouncer;
pub use error::{Error, Result};
pub use fetch::{FetchError, FetchResult, QueryStream};
pub use remote::{ListQuery, RestSource, RowsPage};
pub use table::{
    Column, DataGrid, GridAction, GridMode, PageInfo, Sort, SortDirection, SortState,
};
