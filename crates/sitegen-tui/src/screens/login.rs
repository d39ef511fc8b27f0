//! Login screen
//!
//! A terminal cannot host the Google sign-in widget, so the user pastes the
//! ID token obtained in a browser; verification is the same backend call.

use super::landing::centered_columns;
use super::{Action, RenderContext};
use crate::components::TextInput;
use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
    Frame,
};
use sitegen_core::Route;

pub struct LoginScreen {
    input: TextInput,
    pending: bool,
    error: Option<String>,
}

impl Default for LoginScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl LoginScreen {
    pub fn new() -> Self {
        Self {
            input: TextInput::new("Google ID token")
                .with_placeholder("Paste the ID token from the sign-in page")
                .masked(),
            pending: false,
            error: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Sign-in request finished; on failure the screen stays with the error
    pub fn finish(&mut self, error: Option<String>) {
        self.pending = false;
        self.error = error;
    }

    pub fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) -> Option<Action> {
        if self.pending {
            return None;
        }
        match key {
            KeyCode::Esc => Some(Action::Navigate(Route::Landing)),
            KeyCode::Enter => {
                let token = self.input.value().trim();
                if token.is_empty() {
                    self.error = Some("Please paste an ID token".to_string());
                    return None;
                }
                self.pending = true;
                self.error = None;
                Some(Action::SignIn(token.to_string()))
            }
            _ => {
                self.input.handle_key(key, modifiers);
                None
            }
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, ctx: &RenderContext) {
        let p = ctx.palette;
        let column = centered_columns(area, 72);
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Percentage(25),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(2),
                Constraint::Min(0),
            ])
            .split(column);

        let heading = vec![
            Line::from(Span::styled(
                "Welcome",
                Style::default().fg(p.focus).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                "Sign in with your Google account to continue",
                Style::default().fg(p.muted),
            )),
        ];
        frame.render_widget(
            Paragraph::new(heading).alignment(Alignment::Center),
            chunks[1],
        );

        self.input.render(frame, chunks[2], p);

        let status = if self.pending {
            Line::from(vec![
                ctx.spinner.clone(),
                Span::styled(" Signing in...", Style::default().fg(p.warning)),
            ])
        } else if let Some(error) = &self.error {
            Line::from(Span::styled(error.as_str(), Style::default().fg(p.error)))
        } else {
            Line::from(Span::styled(
                "[Enter] Sign in  [Esc] Back",
                Style::default().fg(p.muted),
            ))
        };
        frame.render_widget(
            Paragraph::new(status)
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true }),
            chunks[3],
        );
    }
}
