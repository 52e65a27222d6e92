//! Interactive widgets that sit alongside the grid.

mod filter_dropdown;
mod input;
mod search_box;

pub use filter_dropdown::{FilterAction, FilterDropdown, FilterOption, FilterValue};
pub use input::TextInput;
pub use search_box::{SearchBox, SearchEvent};
