//! Single-line text editor used inside the search box and the filter
//! dropdown's narrowing field.
//!
//! Supports character input and deletion, cursor movement, and a
//! placeholder. The cursor is tracked in characters so multibyte input
//! edits cleanly.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Position, Rect},
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// A single-line text input.
#[derive(Debug, Clone, Default)]
pub struct TextInput {
    /// Current contents.
    value: String,
    /// Cursor position in characters.
    cursor: usize,
    /// Placeholder shown while empty.
    placeholder: String,
}

impl TextInput {
    /// Create an empty input.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the placeholder text.
    pub fn set_placeholder(&mut self, placeholder: impl Into<String>) {
        self.placeholder = placeholder.into();
    }

    /// Get the current value.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Replace the value and move the cursor to the end.
    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
        self.cursor = self.value.chars().count();
    }

    /// Clear the value.
    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }

    /// Check whether the value is empty.
    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// Get the cursor position in characters.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Byte offset of the cursor.
    fn cursor_byte(&self) -> usize {
        self.value
            .char_indices()
            .nth(self.cursor)
            .map(|(i, _)| i)
            .unwrap_or(self.value.len())
    }

    /// Handle a key event.
    ///
    /// Returns true if the value changed.
    pub fn handle_input(&mut self, key: KeyEvent) -> bool {
        match (key.code, key.modifiers) {
            (KeyCode::Char(c), KeyModifiers::NONE | KeyModifiers::SHIFT) => {
                let at = self.cursor_byte();
                self.value.insert(at, c);
                self.cursor += 1;
                true
            }
            (KeyCode::Backspace, _) => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                    let at = self.cursor_byte();
                    self.value.remove(at);
                    true
                } else {
                    false
                }
            }
            (KeyCode::Delete, _) => {
                if self.cursor < self.value.chars().count() {
                    let at = self.cursor_byte();
                    self.value.remove(at);
                    true
                } else {
                    false
                }
            }
            (KeyCode::Left, KeyModifiers::NONE) => {
                self.cursor = self.cursor.saturating_sub(1);
                false
            }
            (KeyCode::Right, KeyModifiers::NONE) => {
                if self.cursor < self.value.chars().count() {
                    self.cursor += 1;
                }
                false
            }
            (KeyCode::Home, _) => {
                self.cursor = 0;
                false
            }
            (KeyCode::End, _) => {
                self.cursor = self.value.chars().count();
                false
            }
            // Ctrl+U - clear the line
            (KeyCode::Char('u'), KeyModifiers::CONTROL) => {
                if self.value.is_empty() {
                    false
                } else {
                    self.clear();
                    true
                }
            }
            _ => false,
        }
    }

    /// Render the input with a bordered block.
    pub fn render(&self, frame: &mut Frame, area: Rect, focused: bool) {
        let (display, style) = if self.value.is_empty() && !self.placeholder.is_empty() {
            (
                self.placeholder.clone(),
                Style::default().fg(Color::DarkGray),
            )
        } else if focused {
            (self.value.clone(), Style::default().fg(Color::Yellow))
        } else {
            (self.value.clone(), Style::default())
        };

        let border_style = if focused {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        let widget = Paragraph::new(display).style(style).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style),
        );
        frame.render_widget(widget, area);

        if focused {
            let cursor_x = area.x + 1 + self.cursor as u16;
            if cursor_x < area.x + area.width.saturating_sub(1) {
                frame.set_cursor_position(Position::new(cursor_x, area.y + 1));
            }
        }
    }
}
