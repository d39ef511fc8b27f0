//! Single-line text input used for prompts, edit instructions and the
//! sign-in token

use crate::theme::Palette;
use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

pub struct TextInput {
    value: String,
    pub active: bool,
    pub placeholder: String,
    pub title: String,
    /// Render as dots (for tokens)
    pub masked: bool,
}

impl Default for TextInput {
    fn default() -> Self {
        Self::new("Input")
    }
}

impl TextInput {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            value: String::new(),
            active: true,
            placeholder: "Type here...".to_string(),
            title: title.into(),
            masked: false,
        }
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    pub fn masked(mut self) -> Self {
        self.masked = true;
        self
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    pub fn clear(&mut self) {
        self.value.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// Apply an editing key. Returns true when the value changed.
    pub fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) -> bool {
        if !self.active {
            return false;
        }
        match key {
            KeyCode::Char('u') if modifiers.contains(KeyModifiers::CONTROL) => {
                let changed = !self.value.is_empty();
                self.value.clear();
                changed
            }
            KeyCode::Char('w') if modifiers.contains(KeyModifiers::CONTROL) => {
                let trimmed = self.value.trim_end().len();
                let cut = self.value[..trimmed]
                    .rfind(char::is_whitespace)
                    .map(|i| i + 1)
                    .unwrap_or(0);
                let changed = cut != self.value.len();
                self.value.truncate(cut);
                changed
            }
            KeyCode::Char(c) if !modifiers.contains(KeyModifiers::CONTROL) => {
                self.value.push(c);
                true
            }
            KeyCode::Backspace => self.value.pop().is_some(),
            _ => false,
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, p: &Palette) {
        let shown;
        let (text, style) = if self.value.is_empty() {
            (self.placeholder.as_str(), Style::default().fg(p.muted))
        } else if self.masked {
            shown = "•".repeat(self.value.chars().count().min(48));
            (shown.as_str(), Style::default().fg(p.fg))
        } else {
            (self.value.as_str(), Style::default().fg(p.fg))
        };

        let line = Line::from(vec![
            Span::styled("› ", Style::default().fg(p.focus)),
            Span::styled(text, style),
            if self.active {
                Span::styled(
                    "_",
                    Style::default()
                        .fg(p.focus)
                        .add_modifier(Modifier::SLOW_BLINK),
                )
            } else {
                Span::raw("")
            },
        ]);

        let paragraph = Paragraph::new(line).wrap(Wrap { trim: false }).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(p.border(self.active)))
                .title(Span::styled(
                    format!(" {} ", self.title),
                    Style::default().fg(p.fg).add_modifier(Modifier::BOLD),
                )),
        );
        frame.render_widget(paragraph, area);
    }
}
