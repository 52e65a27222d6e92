//! Filter dropdown for one filter dimension.
//!
//! Presents a list of options for a single filter (status, category, ...),
//! optionally multi-select, with an internal text box to narrow the visible
//! options. The committed value is a [`FilterValue`]: either `All` (no
//! filter) or a non-empty set of selections. An empty selection is
//! unrepresentable, so deselecting the last concrete option returns to
//! `All` instead of leaving the host with an ambiguous empty state.
//!
//! The widget is a controlled view: it mirrors changes locally for
//! immediate feedback but the host owns the durable value and may overwrite
//! it with [`FilterDropdown::set_value`].

use std::collections::BTreeSet;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
    Frame,
};

/// A committed filter value: everything, or a non-empty selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    /// No filter applied.
    All,
    /// A non-empty set of selected option values.
    Selected(BTreeSet<String>),
}

impl FilterValue {
    /// Build from an iterator of values, normalizing empty to `All`.
    pub fn from_values<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let set: BTreeSet<String> = values.into_iter().map(Into::into).collect();
        if set.is_empty() {
            FilterValue::All
        } else {
            FilterValue::Selected(set)
        }
    }

    /// Check whether no filter is applied.
    pub fn is_all(&self) -> bool {
        matches!(self, FilterValue::All)
    }

    /// Check whether a concrete value is selected.
    pub fn contains(&self, value: &str) -> bool {
        match self {
            FilterValue::All => false,
            FilterValue::Selected(set) => set.contains(value),
        }
    }

    /// Number of concrete selections (0 for `All`).
    pub fn count(&self) -> usize {
        match self {
            FilterValue::All => 0,
            FilterValue::Selected(set) => set.len(),
        }
    }

    /// Toggle a concrete value.
    ///
    /// Selecting from `All` starts a fresh selection; deselecting the last
    /// concrete value returns to `All`, never to an empty set.
    pub fn toggled(&self, value: &str) -> FilterValue {
        match self {
            FilterValue::All => {
                let mut set = BTreeSet::new();
                set.insert(value.to_string());
                FilterValue::Selected(set)
            }
            FilterValue::Selected(set) => {
                let mut set = set.clone();
                if !set.remove(value) {
                    set.insert(value.to_string());
                }
                if set.is_empty() {
                    FilterValue::All
                } else {
                    FilterValue::Selected(set)
                }
            }
        }
    }

    /// The selections as a comma-joined query parameter, `None` for `All`.
    pub fn as_param(&self) -> Option<String> {
        match self {
            FilterValue::All => None,
            FilterValue::Selected(set) => {
                Some(set.iter().cloned().collect::<Vec<_>>().join(","))
            }
        }
    }
}

impl Default for FilterValue {
    fn default() -> Self {
        FilterValue::All
    }
}

/// One selectable option within a filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOption {
    /// The committed value.
    pub value: String,
    /// The display label.
    pub label: String,
    /// Optional result count shown next to the label.
    pub count: Option<u64>,
    /// Optional accent color for the label.
    pub color: Option<Color>,
}

impl FilterOption {
    /// Create a new option.
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
            count: None,
            color: None,
        }
    }

    /// Attach a result count.
    pub fn with_count(mut self, count: u64) -> Self {
        self.count = Some(count);
        self
    }

    /// Attach an accent color.
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }
}

/// Action resulting from filter dropdown input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterAction {
    /// The committed value changed.
    Changed(FilterValue),
    /// The dropdown closed without a change.
    Closed,
}

/// A dropdown for one filter dimension.
pub struct FilterDropdown {
    /// Field label.
    label: String,
    /// Available options (the "All" row is implicit).
    options: Vec<FilterOption>,
    /// Whether selections accumulate.
    multi: bool,
    /// The committed value (host-owned; mirrored here).
    value: FilterValue,
    /// Whether the option list is expanded.
    open: bool,
    /// Narrowing query; ephemeral, cleared when the dropdown closes.
    narrow: super::TextInput,
    /// Whether keystrokes go to the narrowing box.
    narrowing: bool,
    /// Highlighted index into the visible rows (0 is the "All" row).
    highlighted: usize,
}

impl FilterDropdown {
    /// Create a single-select filter dropdown.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            options: Vec::new(),
            multi: false,
            value: FilterValue::All,
            open: false,
            narrow: super::TextInput::new(),
            narrowing: false,
            highlighted: 0,
        }
    }

    /// Enable or disable multi-select.
    pub fn set_multi(&mut self, multi: bool) {
        self.multi = multi;
    }

    /// Check whether multi-select is enabled.
    pub fn is_multi(&self) -> bool {
        self.multi
    }

    /// Replace the option set.
    pub fn set_options(&mut self, options: Vec<FilterOption>) {
        self.options = options;
        self.highlighted = 0;
    }

    /// Set the committed value (the host owns it).
    pub fn set_value(&mut self, value: FilterValue) {
        self.value = value;
    }

    /// Get the committed value.
    pub fn value(&self) -> &FilterValue {
        &self.value
    }

    /// Number of concrete selections, for the badge.
    pub fn badge_count(&self) -> usize {
        self.value.count()
    }

    /// Check whether the option list is expanded.
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Expand the option list.
    pub fn open(&mut self) {
        self.open = true;
        self.highlighted = 0;
    }

    /// Collapse the option list, discarding the narrowing query.
    pub fn close(&mut self) {
        self.open = false;
        self.narrowing = false;
        self.narrow.clear();
        self.highlighted = 0;
    }

    /// Focus left the widget; same contract as closing.
    pub fn blur(&mut self) {
        self.close();
    }

    /// The narrowing query currently applied to the visible options.
    pub fn narrow_query(&self) -> &str {
        self.narrow.value()
    }

    /// Indices into `options` that match the narrowing query.
    ///
    /// Case-insensitive substring match on the label; the committed
    /// selection is never affected.
    fn visible_options(&self) -> Vec<usize> {
        let query = self.narrow.value().to_lowercase();
        self.options
            .iter()
            .enumerate()
            .filter(|(_, o)| query.is_empty() || o.label.to_lowercase().contains(&query))
            .map(|(i, _)| i)
            .collect()
    }

    /// Visible row count including the "All" row.
    fn visible_len(&self) -> usize {
        self.visible_options().len() + 1
    }

    /// Handle a key event.
    ///
    /// Returns an action for the host to apply.
    pub fn handle_input(&mut self, key: KeyEvent) -> Option<FilterAction> {
        if !self.open {
            if let (KeyCode::Enter, KeyModifiers::NONE) = (key.code, key.modifiers) {
                self.open();
            }
            return None;
        }

        if self.narrowing {
            return self.handle_narrowing_input(key);
        }

        match (key.code, key.modifiers) {
            (KeyCode::Char('j'), KeyModifiers::NONE) | (KeyCode::Down, _) => {
                if self.highlighted + 1 < self.visible_len() {
                    self.highlighted += 1;
                }
                None
            }
            (KeyCode::Char('k'), KeyModifiers::NONE) | (KeyCode::Up, _) => {
                self.highlighted = self.highlighted.saturating_sub(1);
                None
            }
            (KeyCode::Char('/'), KeyModifiers::NONE) => {
                self.narrowing = true;
                None
            }
            // Clear filters.
            (KeyCode::Char('c'), KeyModifiers::NONE) => {
                self.value = FilterValue::All;
                Some(FilterAction::Changed(FilterValue::All))
            }
            (KeyCode::Char(' '), KeyModifiers::NONE) => self.activate_highlighted(false),
            (KeyCode::Enter, KeyModifiers::NONE) => {
                if self.multi {
                    // In multi mode Enter confirms and closes; Space toggles.
                    self.close();
                    Some(FilterAction::Closed)
                } else {
                    self.activate_highlighted(true)
                }
            }
            (KeyCode::Esc, _) | (KeyCode::Char('q'), KeyModifiers::NONE) => {
                self.close();
                Some(FilterAction::Closed)
            }
            _ => None,
        }
    }

    /// Keystrokes while the narrowing box is focused.
    fn handle_narrowing_input(&mut self, key: KeyEvent) -> Option<FilterAction> {
        match (key.code, key.modifiers) {
            (KeyCode::Esc, _) | (KeyCode::Enter, KeyModifiers::NONE) => {
                self.narrowing = false;
                None
            }
            (KeyCode::Down, _) => {
                if self.highlighted + 1 < self.visible_len() {
                    self.highlighted += 1;
                }
                None
            }
            (KeyCode::Up, _) => {
                self.highlighted = self.highlighted.saturating_sub(1);
                None
            }
            _ => {
                if self.narrow.handle_input(key) {
                    self.highlighted = 0;
                }
                None
            }
        }
    }

    /// Apply the highlighted row.
    fn activate_highlighted(&mut self, close_single: bool) -> Option<FilterAction> {
        if self.highlighted == 0 {
            // The "All" row.
            self.value = FilterValue::All;
            if !self.multi || close_single {
                self.close();
            }
            return Some(FilterAction::Changed(FilterValue::All));
        }

        let visible = self.visible_options();
        let option_idx = *visible.get(self.highlighted - 1)?;
        let value = self.options[option_idx].value.clone();

        if self.multi {
            self.value = self.value.toggled(&value);
        } else {
            self.value = FilterValue::from_values([value]);
            self.close();
        }
        Some(FilterAction::Changed(self.value.clone()))
    }

    /// Summary text for the collapsed field.
    fn summary(&self) -> String {
        match &self.value {
            FilterValue::All => "All".to_string(),
            FilterValue::Selected(set) => match set.iter().next() {
                Some(value) if set.len() == 1 => self
                    .options
                    .iter()
                    .find(|o| &o.value == value)
                    .map(|o| o.label.clone())
                    .unwrap_or_else(|| value.clone()),
                _ => format!("{} selected", set.len()),
            },
        }
    }

    /// Render the collapsed field.
    pub fn render(&self, frame: &mut Frame, area: Rect, focused: bool) {
        let title = if self.multi && self.badge_count() > 0 {
            format!(" {} ({}) ", self.label, self.badge_count())
        } else {
            format!(" {} ", self.label)
        };

        let (text_style, border_style) = if focused {
            (
                Style::default().fg(Color::Cyan),
                Style::default().fg(Color::Cyan),
            )
        } else {
            (Style::default(), Style::default().fg(Color::DarkGray))
        };

        let indicator = if self.open { "▲" } else { "▼" };
        let text = format!("{} {}", self.summary(), indicator);

        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(border_style);
        frame.render_widget(Paragraph::new(text).style(text_style).block(block), area);
    }

    /// Render the expanded option list as a popup below the field.
    ///
    /// Call after [`render`](Self::render) while the dropdown is open.
    pub fn render_expanded_list(&self, frame: &mut Frame, field_area: Rect, screen_area: Rect) {
        if !self.open {
            return;
        }

        let visible = self.visible_options();
        let row_count = visible.len() + 1;
        // Rows, an optional narrowing line, and the borders.
        let narrow_line = u16::from(self.narrowing || !self.narrow.is_empty());
        let height = (row_count.min(8) as u16 + 2 + narrow_line)
            .min(screen_area.height.saturating_sub(field_area.y + field_area.height));
        if height < 3 {
            return;
        }

        let area = Rect::new(
            field_area.x,
            field_area.y + field_area.height - 1,
            field_area.width,
            height,
        );

        frame.render_widget(Clear, area);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .style(Style::default().bg(Color::Black));
        let mut inner = block.inner(area);
        frame.render_widget(block, area);

        if narrow_line == 1 && inner.height > 0 {
            let line = Line::from(vec![
                Span::styled("/", Style::default().fg(Color::Yellow)),
                Span::raw(self.narrow.value().to_string()),
            ]);
            frame.render_widget(Paragraph::new(line), Rect { height: 1, ..inner });
            inner.y += 1;
            inner.height = inner.height.saturating_sub(1);
        }

        let mut items: Vec<ListItem> = Vec::with_capacity(row_count);
        items.push(self.option_item("All", None, None, self.value.is_all()));
        for idx in &visible {
            let option = &self.options[*idx];
            items.push(self.option_item(
                &option.label,
                option.count,
                option.color,
                self.value.contains(&option.value),
            ));
        }

        let list = List::new(items)
            .highlight_style(
                Style::default()
                    .fg(Color::White)
                    .bg(Color::DarkGray)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("> ");

        let mut state = ListState::default();
        state.select(Some(self.highlighted));
        frame.render_stateful_widget(list, inner, &mut state);
    }

    /// Build one option row.
    fn option_item(
        &self,
        label: &str,
        count: Option<u64>,
        color: Option<Color>,
        selected: bool,
    ) -> ListItem<'static> {
        let mut spans = Vec::new();
        if self.multi {
            let checkbox = if selected { "[x] " } else { "[ ] " };
            let style = if selected {
                Style::default().fg(Color::Green)
            } else {
                Style::default()
            };
            spans.push(Span::styled(checkbox.to_string(), style));
        }

        let label_style = match color {
            Some(c) => Style::default().fg(c),
            None if selected && !self.multi => Style::default().fg(Color::Cyan),
            None => Style::default(),
        };
        spans.push(Span::styled(label.to_string(), label_style));

        if let Some(count) = count {
            spans.push(Span::styled(
                format!(" ({})", count),
                Style::default().fg(Color::DarkGray),
            ));
        }

        ListItem::new(Line::from(spans))
    }
}
