//! Search box with debounced submission and autocomplete suggestions.
//!
//! The visible text updates on every keystroke; the committed search fires
//! only after the text has settled for the search window (600 ms by
//! default). A second, shorter window (300 ms) drives suggestion fetches
//! once the query reaches the minimum length.
//!
//! Suggestion fetches are newest-wins: each fetch request carries a
//! generation number, and the host echoes it back with the result. A result
//! tagged with a superseded generation is dropped at delivery, so a slow
//! older fetch can never overwrite a newer one's suggestions. Superseded
//! and cancelled fetches never surface as errors or empty dropdowns.

use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Clear, List, ListItem, ListState},
    Frame,
};
use tracing::{debug, warn};

use crate::config::GridConfig;
use crate::debounce::Debouncer;
use crate::fetch::FetchResult;

/// Event emitted by the search box for the host to act on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchEvent {
    /// The committed search text settled (or was committed via Enter).
    Search(String),
    /// Fetch suggestions for `query` and echo `generation` back through
    /// [`SearchBox::apply_suggestions`].
    FetchSuggestions { query: String, generation: u64 },
}

/// A debounced search input with an optional suggestion dropdown.
pub struct SearchBox {
    input: super::TextInput,
    /// Settle window for the committed search.
    search: Debouncer<String>,
    /// Settle window for suggestion fetches.
    suggest: Debouncer<String>,
    /// Minimum query length before suggestions are fetched.
    min_chars: usize,
    /// Generation of the most recently requested suggestion fetch.
    generation: u64,
    suggestions: Vec<String>,
    /// Whether the suggestion dropdown is visible.
    open: bool,
    /// Highlighted suggestion index; -1 means none.
    highlighted: isize,
}

impl SearchBox {
    /// Create a search box with the given tuning.
    pub fn new(config: &GridConfig) -> Self {
        let mut input = super::TextInput::new();
        input.set_placeholder("Search...");
        Self {
            input,
            search: Debouncer::new(config.search_delay()),
            suggest: Debouncer::new(config.suggest_delay()),
            min_chars: config.suggest_min_chars,
            generation: 0,
            suggestions: Vec::new(),
            open: false,
            highlighted: -1,
        }
    }

    /// The current (uncommitted) text.
    pub fn text(&self) -> &str {
        self.input.value()
    }

    /// Replace the text without arming either debouncer.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.input.set_value(text);
    }

    /// Check whether the suggestion dropdown is visible.
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// The current suggestions.
    pub fn suggestions(&self) -> &[String] {
        &self.suggestions
    }

    /// The highlighted suggestion index, -1 when none.
    pub fn highlighted(&self) -> isize {
        self.highlighted
    }

    /// Handle a key event.
    pub fn handle_input(&mut self, key: KeyEvent) -> Option<SearchEvent> {
        self.handle_input_at(key, Instant::now())
    }

    /// Handle a key event as of `now`.
    ///
    /// Text changes arm the debouncers rather than firing immediately; the
    /// host collects the resulting events from [`tick_at`](Self::tick_at).
    /// Enter on a highlighted suggestion commits it right away.
    pub fn handle_input_at(&mut self, key: KeyEvent, now: Instant) -> Option<SearchEvent> {
        match (key.code, key.modifiers) {
            (KeyCode::Down, _) if self.open => {
                let max = self.suggestions.len() as isize - 1;
                self.highlighted = (self.highlighted + 1).min(max);
                None
            }
            (KeyCode::Up, _) if self.open => {
                self.highlighted = (self.highlighted - 1).max(-1);
                None
            }
            (KeyCode::Enter, KeyModifiers::NONE) => self.commit_highlighted(),
            (KeyCode::Esc, _) => {
                // Close the dropdown, keep the text.
                self.close();
                None
            }
            _ => {
                if self.input.handle_input(key) {
                    self.text_changed(now);
                }
                None
            }
        }
    }

    /// Focus left the widget; close the dropdown, keep the text.
    pub fn blur(&mut self) {
        self.close();
    }

    /// Poll both settle windows.
    pub fn tick(&mut self) -> Vec<SearchEvent> {
        self.tick_at(Instant::now())
    }

    /// Poll both settle windows as of `now`.
    ///
    /// A settled suggestion query bumps the generation so any in-flight
    /// fetch is invalidated before the new one starts.
    pub fn tick_at(&mut self, now: Instant) -> Vec<SearchEvent> {
        let mut events = Vec::new();
        if let Some(query) = self.suggest.poll_at(now) {
            self.generation += 1;
            events.push(SearchEvent::FetchSuggestions {
                query,
                generation: self.generation,
            });
        }
        if let Some(query) = self.search.poll_at(now) {
            events.push(SearchEvent::Search(query));
        }
        events
    }

    /// Deliver a suggestion fetch result.
    ///
    /// Results for superseded generations and cancelled fetches are dropped
    /// silently. A real error closes the dropdown without disturbing the
    /// text; it never masquerades as "no suggestions".
    pub fn apply_suggestions(&mut self, generation: u64, result: FetchResult<Vec<String>>) {
        if generation != self.generation {
            debug!(
                generation,
                current = self.generation,
                "dropping superseded suggestions"
            );
            return;
        }
        match result {
            Ok(suggestions) => {
                self.open = !suggestions.is_empty();
                self.suggestions = suggestions;
                self.highlighted = -1;
            }
            Err(e) if e.is_cancelled() => {
                debug!("suggestion fetch cancelled");
            }
            Err(e) => {
                warn!(error = %e, "suggestion fetch failed");
                self.close();
            }
        }
    }

    /// Every text change re-arms the search window and, when the query is
    /// long enough, the suggestion window.
    fn text_changed(&mut self, now: Instant) {
        let text = self.input.value().to_string();
        self.search.record_at(text.clone(), now);

        if text.chars().count() >= self.min_chars {
            self.suggest.record_at(text, now);
        } else {
            // Too short: no fetch, and whatever was showing is stale.
            self.suggest.cancel();
            self.generation += 1;
            self.close();
        }
    }

    /// Commit the highlighted suggestion; a no-op when nothing is
    /// highlighted.
    fn commit_highlighted(&mut self) -> Option<SearchEvent> {
        if !self.open || self.highlighted < 0 {
            return None;
        }
        let text = self.suggestions.get(self.highlighted as usize)?.clone();
        self.input.set_value(text.clone());
        self.close();
        // The choice is explicit, so the search fires immediately and any
        // pending windows are dropped.
        self.search.cancel();
        self.suggest.cancel();
        self.generation += 1;
        Some(SearchEvent::Search(text))
    }

    fn close(&mut self) {
        self.open = false;
        self.suggestions.clear();
        self.highlighted = -1;
    }

    /// Render the input field.
    pub fn render(&self, frame: &mut Frame, area: Rect, focused: bool) {
        self.input.render(frame, area, focused);
    }

    /// Render the suggestion dropdown below the field while open.
    pub fn render_suggestions(&self, frame: &mut Frame, field_area: Rect, screen_area: Rect) {
        if !self.open || self.suggestions.is_empty() {
            return;
        }

        let height = (self.suggestions.len().min(8) as u16 + 2)
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
        let items: Vec<ListItem> = self
            .suggestions
            .iter()
            .map(|s| ListItem::new(s.clone()))
            .collect();
        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Yellow))
                    .style(Style::default().bg(Color::Black)),
            )
            .highlight_style(
                Style::default()
                    .fg(Color::White)
                    .bg(Color::DarkGray)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("> ");

        let mut state = ListState::default();
        if self.highlighted >= 0 {
            state.select(Some(self.highlighted as usize));
        }
        frame.render_stateful_widget(list, area, &mut state);
    }
}
