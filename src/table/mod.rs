//! The data grid: columns, sorting, pagination, and the widget itself.
//!
//! [`DataGrid`] renders rows it is handed; it never fetches. In manual mode
//! the host owns pagination and sorting (typically backed by a server) and
//! the grid emits [`GridAction`]s for the host to act on. In client mode
//! the grid filters, sorts, and pages its row set locally.
//!
//! Key bindings while focused:
//! `j`/`k` move the row cursor, `g`/`G` jump to the first/last row,
//! `Tab`/`BackTab` move the column focus, `s` cycles the sort on the
//! focused column, `n`/`p` change page, `z` cycles the page size,
//! `h`/`l` scroll unpinned columns, `r` refreshes, Enter activates a row.

pub mod column;
pub mod pagination;
pub mod sort;

pub use column::{CellFn, Column, ColumnError};
pub use pagination::{total_pages, PageInfo};
pub use sort::{sort_rows, Sort, SortDirection, SortState};

use std::collections::HashSet;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};
use tracing::debug;

use crate::fetch::FetchResult;

/// Where pagination, sorting, and filtering happen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridMode {
    /// The host supplies one page of rows at a time and reacts to
    /// [`GridAction`]s by re-querying.
    Manual,
    /// The grid holds the full row set and pages, sorts, and filters it
    /// locally.
    Client,
}

/// Action emitted by the grid for the host to apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridAction {
    /// Navigate to another page (manual mode).
    PageChanged(u32),
    /// The page size changed; the host should re-query page 1.
    PageSizeChanged(u32),
    /// The sort changed (manual mode).
    SortChanged(SortState),
    /// The host should re-query the current page.
    Refresh,
    /// Enter was pressed on a row; the index is into the displayed page.
    RowActivated(usize),
}

/// An interactive tabular grid over rows of `T`.
pub struct DataGrid<T> {
    title: String,
    columns: Vec<Column<T>>,
    mode: GridMode,
    /// In manual mode, the current page's rows; in client mode, all rows.
    rows: Vec<T>,
    page: PageInfo,
    sort: SortState,
    loading: bool,
    empty_text: String,
    /// Column indices pinned to the left edge, in pin order.
    pinned: Vec<usize>,
    /// Ids of columns currently hidden.
    hidden: HashSet<String>,
    /// Committed search text; filters locally in client mode and
    /// highlights matches in both modes.
    search: String,
    /// Page sizes the `z` key cycles through.
    page_sizes: Vec<u32>,
    /// Whether `r` emits a refresh.
    refresh_enabled: bool,
    /// Row cursor, an index into the displayed page.
    cursor: usize,
    /// Focused column, an index into the visible column order.
    col_focus: usize,
    /// How many unpinned columns are scrolled off to the left.
    h_scroll: usize,
}

impl<T> DataGrid<T> {
    /// Create a grid; fails if the column set is malformed.
    pub fn new(columns: Vec<Column<T>>, mode: GridMode) -> Result<Self, ColumnError> {
        column::validate_ids(&columns)?;
        Ok(Self {
            title: String::new(),
            columns,
            mode,
            rows: Vec::new(),
            page: PageInfo::default(),
            sort: SortState::unsorted(),
            loading: false,
            empty_text: "No results".to_string(),
            pinned: Vec::new(),
            hidden: HashSet::new(),
            search: String::new(),
            page_sizes: vec![10, 20, 50],
            refresh_enabled: false,
            cursor: 0,
            col_focus: 0,
            h_scroll: 0,
        })
    }

    /// Set the block title.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    /// Set the text shown when the row set is empty.
    pub fn set_empty_text(&mut self, text: impl Into<String>) {
        self.empty_text = text.into();
    }

    /// Pin columns (by index into the column set) to the left edge.
    ///
    /// Pinned columns render first, at their measured widths, and are
    /// unaffected by horizontal scrolling.
    pub fn pin_columns(&mut self, indices: Vec<usize>) {
        self.pinned = indices;
        self.pinned.retain(|&i| i < self.columns.len());
        self.pinned.dedup();
    }

    /// Set the page sizes offered by the page-size key.
    pub fn set_page_sizes(&mut self, sizes: Vec<u32>) {
        if !sizes.is_empty() {
            self.page_sizes = sizes;
        }
    }

    /// Enable or disable the refresh key.
    pub fn set_refresh_enabled(&mut self, enabled: bool) {
        self.refresh_enabled = enabled;
    }

    /// Toggle a column's visibility by id.
    pub fn toggle_column(&mut self, id: &str) {
        if !self.hidden.remove(id) && self.columns.iter().any(|c| c.id() == id) {
            self.hidden.insert(id.to_string());
        }
        self.clamp_focus();
    }

    /// Check whether a column is hidden.
    pub fn is_column_hidden(&self, id: &str) -> bool {
        self.hidden.contains(id)
    }

    /// Set the loading flag.
    ///
    /// While loading the body shows a single placeholder row; stale rows
    /// stay in memory but are not rendered.
    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    /// Check the loading flag.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// The current sort state.
    pub fn sort_state(&self) -> &SortState {
        &self.sort
    }

    /// Replace the rows.
    ///
    /// Manual mode expects exactly the current page; client mode expects
    /// the full row set.
    pub fn set_rows(&mut self, rows: Vec<T>) {
        self.rows = rows;
        self.cursor = 0;
        if self.mode == GridMode::Client {
            self.page = PageInfo::client(1, self.page.page_size, self.filtered_len());
        }
    }

    /// Set the pagination descriptor (manual mode).
    pub fn set_page_info(&mut self, page: PageInfo) {
        self.page = page;
    }

    /// Set the committed search text.
    ///
    /// In client mode this filters rows (case-insensitive substring over
    /// the visible columns' cell text) and resets to page 1; in manual mode
    /// it only drives match highlighting, with the host doing the actual
    /// filtering.
    pub fn set_search(&mut self, query: impl Into<String>) {
        self.search = query.into();
        self.cursor = 0;
        if self.mode == GridMode::Client {
            self.page = PageInfo::client(1, self.page.page_size, self.filtered_len());
        }
    }

    /// Deliver a page-fetch result (manual mode).
    ///
    /// A cancelled fetch is an expected outcome of superseding requests:
    /// the rows on screen stay as they are and nothing is surfaced. A real
    /// error clears the loading flag and is returned for the host to show.
    pub fn apply_fetch(&mut self, result: FetchResult<(Vec<T>, PageInfo)>) -> FetchResult<()> {
        match result {
            Ok((rows, page)) => {
                self.rows = rows;
                self.page = page;
                self.loading = false;
                self.cursor = 0;
                Ok(())
            }
            Err(e) if e.is_cancelled() => {
                debug!("page fetch cancelled; keeping current rows");
                Ok(())
            }
            Err(e) => {
                self.loading = false;
                Err(e)
            }
        }
    }

    /// The effective pagination descriptor.
    pub fn page_info(&self) -> PageInfo {
        match self.mode {
            GridMode::Manual => self.page,
            GridMode::Client => {
                PageInfo::client(self.page.page, self.page.page_size, self.filtered_len())
            }
        }
    }

    /// The row under the cursor, if any.
    pub fn selected_row(&self) -> Option<&T> {
        let indices = self.display_indices();
        indices.get(self.cursor).map(|&i| &self.rows[i])
    }

    /// Handle a key event, returning an action for the host.
    pub fn handle_input(&mut self, key: KeyEvent) -> Option<GridAction> {
        match (key.code, key.modifiers) {
            (KeyCode::Char('j'), KeyModifiers::NONE) | (KeyCode::Down, _) => {
                if self.cursor + 1 < self.display_indices().len() {
                    self.cursor += 1;
                }
                None
            }
            (KeyCode::Char('k'), KeyModifiers::NONE) | (KeyCode::Up, _) => {
                self.cursor = self.cursor.saturating_sub(1);
                None
            }
            (KeyCode::Char('g'), KeyModifiers::NONE) | (KeyCode::Home, _) => {
                self.cursor = 0;
                None
            }
            (KeyCode::Char('G'), KeyModifiers::SHIFT) | (KeyCode::End, _) => {
                self.cursor = self.display_indices().len().saturating_sub(1);
                None
            }
            (KeyCode::Char('l'), KeyModifiers::NONE) | (KeyCode::Right, _) => {
                let unpinned = self.unpinned_count();
                if self.h_scroll + 1 < unpinned {
                    self.h_scroll += 1;
                }
                None
            }
            (KeyCode::Char('h'), KeyModifiers::NONE) | (KeyCode::Left, _) => {
                self.h_scroll = self.h_scroll.saturating_sub(1);
                None
            }
            (KeyCode::Tab, _) => {
                let len = self.visible_column_order().len();
                if len > 0 {
                    self.col_focus = (self.col_focus + 1) % len;
                }
                None
            }
            (KeyCode::BackTab, _) => {
                let len = self.visible_column_order().len();
                if len > 0 {
                    self.col_focus = (self.col_focus + len - 1) % len;
                }
                None
            }
            (KeyCode::Char('s'), KeyModifiers::NONE) => self.cycle_sort(),
            (KeyCode::Char('n'), KeyModifiers::NONE) => self.next_page(),
            (KeyCode::Char('p'), KeyModifiers::NONE) => self.prev_page(),
            (KeyCode::Char('z'), KeyModifiers::NONE) => self.cycle_page_size(),
            (KeyCode::Char('r'), KeyModifiers::NONE) => {
                if self.refresh_enabled && !self.loading {
                    Some(GridAction::Refresh)
                } else {
                    None
                }
            }
            (KeyCode::Enter, KeyModifiers::NONE) => {
                if !self.loading && self.cursor < self.display_indices().len() {
                    Some(GridAction::RowActivated(self.cursor))
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    /// Cycle the sort on the focused column, if it is sortable.
    fn cycle_sort(&mut self) -> Option<GridAction> {
        let order = self.visible_column_order();
        let column_idx = *order.get(self.col_focus)?;
        if !self.columns[column_idx].is_sortable() {
            return None;
        }
        let id = self.columns[column_idx].id().to_string();
        self.sort.cycle_column(&id);

        match self.mode {
            GridMode::Manual => Some(GridAction::SortChanged(self.sort.clone())),
            GridMode::Client => {
                self.cursor = 0;
                None
            }
        }
    }

    /// Next page; a no-op at the last page.
    fn next_page(&mut self) -> Option<GridAction> {
        let next = self.page_info().next()?;
        match self.mode {
            GridMode::Manual => Some(GridAction::PageChanged(next)),
            GridMode::Client => {
                self.page.page = next;
                self.cursor = 0;
                None
            }
        }
    }

    /// Previous page; a no-op at the first page.
    fn prev_page(&mut self) -> Option<GridAction> {
        let prev = self.page_info().prev()?;
        match self.mode {
            GridMode::Manual => Some(GridAction::PageChanged(prev)),
            GridMode::Client => {
                self.page.page = prev;
                self.cursor = 0;
                None
            }
        }
    }

    /// Advance to the next configured page size, resetting to page 1.
    fn cycle_page_size(&mut self) -> Option<GridAction> {
        let current = self.page_info().page_size;
        let pos = self.page_sizes.iter().position(|&s| s == current);
        let next = match pos {
            Some(i) => self.page_sizes[(i + 1) % self.page_sizes.len()],
            None => self.page_sizes[0],
        };
        if next == current {
            return None;
        }
        match self.mode {
            GridMode::Manual => Some(GridAction::PageSizeChanged(next)),
            GridMode::Client => {
                self.page = self.page.with_page_size(next);
                self.cursor = 0;
                None
            }
        }
    }

    /// Indices into the column set, in render order: pinned first, then the
    /// remaining visible columns with the horizontal scroll applied.
    fn visible_column_order(&self) -> Vec<usize> {
        let mut order: Vec<usize> = self
            .pinned
            .iter()
            .copied()
            .filter(|&i| !self.hidden.contains(self.columns[i].id()))
            .collect();
        order.extend(
            (0..self.columns.len())
                .filter(|i| !self.pinned.contains(i))
                .filter(|&i| !self.hidden.contains(self.columns[i].id()))
                .skip(self.h_scroll),
        );
        order
    }

    /// Visible columns that are not pinned, before scrolling.
    fn unpinned_count(&self) -> usize {
        (0..self.columns.len())
            .filter(|i| !self.pinned.contains(i))
            .filter(|&i| !self.hidden.contains(self.columns[i].id()))
            .count()
    }

    fn clamp_focus(&mut self) {
        let len = self.visible_column_order().len();
        if len > 0 && self.col_focus >= len {
            self.col_focus = len - 1;
        }
    }

    /// Indices into `rows` that match the committed search, sorted.
    ///
    /// Client mode only; manual mode shows the host's rows verbatim.
    fn client_view(&self) -> Vec<usize> {
        let query = self.search.to_lowercase();
        let searchable: Vec<usize> = (0..self.columns.len())
            .filter(|&i| !self.hidden.contains(self.columns[i].id()))
            .collect();

        let indices: Vec<usize> = (0..self.rows.len())
            .filter(|&row| {
                query.is_empty()
                    || searchable.iter().any(|&c| {
                        self.columns[c]
                            .cell_text(&self.rows[row])
                            .to_lowercase()
                            .contains(&query)
                    })
            })
            .collect();

        let sort = match self.sort.active() {
            Some(sort) => sort,
            None => return indices,
        };
        let column = match self.columns.iter().find(|c| c.id() == sort.column_id) {
            Some(column) => column,
            None => return indices,
        };

        let mut keyed: Vec<(String, usize)> = indices
            .into_iter()
            .map(|i| (column.sort_value(&self.rows[i]), i))
            .collect();
        match sort.direction {
            SortDirection::Ascending => keyed.sort_by(|a, b| a.0.cmp(&b.0)),
            SortDirection::Descending => keyed.sort_by(|a, b| b.0.cmp(&a.0)),
        }
        keyed.into_iter().map(|(_, i)| i).collect()
    }

    fn filtered_len(&self) -> u64 {
        match self.mode {
            GridMode::Manual => self.page.total_items,
            GridMode::Client => self.client_view().len() as u64,
        }
    }

    /// Indices into `rows` for the currently displayed page.
    fn display_indices(&self) -> Vec<usize> {
        match self.mode {
            GridMode::Manual => (0..self.rows.len()).collect(),
            GridMode::Client => {
                let view = self.client_view();
                let info = PageInfo::client(self.page.page, self.page.page_size, view.len() as u64);
                let start = (info.offset() as usize).min(view.len());
                let end = (start + info.page_size as usize).min(view.len());
                view[start..end].to_vec()
            }
        }
    }

    /// Measured width per rendered column: the widest of the header and the
    /// displayed cells, capped by the column's width hint.
    fn measured_widths(&self, order: &[usize], indices: &[usize]) -> Vec<u16> {
        order
            .iter()
            .map(|&c| {
                let column = &self.columns[c];
                // Leave room for the sort marker.
                let mut width = column.header().chars().count() as u16 + 2;
                for &i in indices {
                    let cell = column.cell_text(&self.rows[i]).chars().count() as u16;
                    width = width.max(cell);
                }
                if let Some(cap) = column.width_cap() {
                    width = width.min(cap);
                }
                width.max(1)
            })
            .collect()
    }

    /// Render the grid.
    pub fn render(&self, frame: &mut Frame, area: Rect, focused: bool) {
        let border_style = if focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let block = Block::default()
            .title(format!(" {} ", self.title))
            .borders(Borders::ALL)
            .border_style(border_style);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let [body_area, footer_area] =
            Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(inner);

        let order = self.visible_column_order();
        let indices = self.display_indices();
        let widths = self.measured_widths(&order, &indices);

        let header_cells: Vec<Cell> = order
            .iter()
            .enumerate()
            .map(|(pos, &c)| {
                let column = &self.columns[c];
                let text = match self.sort.direction_of(column.id()) {
                    Some(direction) => format!("{} {}", column.header(), direction.marker()),
                    None => column.header().to_string(),
                };
                let mut style = Style::default().add_modifier(Modifier::BOLD);
                if focused && pos == self.col_focus {
                    style = style.add_modifier(Modifier::UNDERLINED).fg(Color::Cyan);
                }
                Cell::from(Span::styled(text, style))
            })
            .collect();

        let constraints: Vec<Constraint> =
            widths.iter().map(|&w| Constraint::Length(w)).collect();

        if self.loading {
            // Stale rows are hidden during a refetch, not dimmed.
            let table = Table::new(Vec::<Row>::new(), constraints)
                .header(Row::new(header_cells));
            frame.render_widget(table, body_area);
            self.render_notice(frame, body_area, "Loading...");
            self.render_footer(frame, footer_area);
            return;
        }

        if indices.is_empty() {
            let table = Table::new(Vec::<Row>::new(), constraints)
                .header(Row::new(header_cells));
            frame.render_widget(table, body_area);
            self.render_notice(frame, body_area, &self.empty_text);
            self.render_footer(frame, footer_area);
            return;
        }

        let rows: Vec<Row> = indices
            .iter()
            .map(|&i| {
                let cells: Vec<Cell> = order
                    .iter()
                    .map(|&c| {
                        let text = self.columns[c].cell_text(&self.rows[i]);
                        Cell::from(highlight_match(&text, &self.search))
                    })
                    .collect();
                Row::new(cells)
            })
            .collect();

        let table = Table::new(rows, constraints)
            .header(Row::new(header_cells))
            .column_spacing(1)
            .highlight_style(
                Style::default()
                    .bg(Color::DarkGray)
                    .add_modifier(Modifier::BOLD),
            );

        let mut state = TableState::default();
        state.select(Some(self.cursor.min(indices.len() - 1)));
        frame.render_stateful_widget(table, body_area, &mut state);

        self.render_footer(frame, footer_area);
    }

    /// A single full-width notice row under the header.
    fn render_notice(&self, frame: &mut Frame, body_area: Rect, text: &str) {
        let notice_area = Rect {
            y: body_area.y + 1,
            height: body_area.height.saturating_sub(1),
            ..body_area
        };
        let notice = Paragraph::new(text.to_string())
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(notice, notice_area);
    }

    fn render_footer(&self, frame: &mut Frame, area: Rect) {
        let info = self.page_info();
        let enabled = Style::default().fg(Color::Cyan);
        let disabled = Style::default().fg(Color::DarkGray);

        let line = Line::from(vec![
            Span::styled("p prev", if info.has_prev() { enabled } else { disabled }),
            Span::raw("  "),
            Span::raw(format!(
                "Page {} of {} ({} items, {}/page)",
                info.page,
                info.total_pages.max(1),
                info.total_items,
                info.page_size,
            )),
            Span::raw("  "),
            Span::styled("n next", if info.has_next() { enabled } else { disabled }),
        ]);
        frame.render_widget(Paragraph::new(line), area);
    }
}

/// Highlight occurrences of `query` within `text`, case-insensitively,
/// keeping the original casing.
pub fn highlight_match(text: &str, query: &str) -> Line<'static> {
    if query.is_empty() {
        return Line::from(text.to_string());
    }

    let text_lower = text.to_lowercase();
    let query_lower = query.to_lowercase();

    let mut spans = Vec::new();
    let mut last_end = 0;

    for (start, _) in text_lower.match_indices(&query_lower) {
        // Lowercasing can change byte lengths; stay on char boundaries.
        if start < last_end || !text.is_char_boundary(start) {
            continue;
        }
        let end = start + query_lower.len();
        if end > text.len() || !text.is_char_boundary(end) {
            continue;
        }

        if start > last_end {
            spans.push(Span::raw(text[last_end..start].to_string()));
        }
        spans.push(Span::styled(
            text[start..end].to_string(),
            Style::default()
                .bg(Color::Yellow)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        ));
        last_end = end;
    }

    if spans.is_empty() {
        return Line::from(text.to_string());
    }
    if last_end < text.len() {
        spans.push(Span::raw(text[last_end..].to_string()));
    }
    Line::from(spans)
}
