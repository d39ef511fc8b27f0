//! Landing screen

use super::{Action, RenderContext};
use crossterm::event::KeyCode;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use sitegen_core::Route;

const FEATURES: [(&str, &str); 3] = [
    ("Describe it", "Tell the AI what your business needs in one sentence"),
    ("Review the plan", "Check the layout, palette and sections before building"),
    ("Edit with AI", "Refine the result with plain-language instructions"),
];

#[derive(Debug, Default)]
pub struct LandingScreen;

impl LandingScreen {
    pub fn new() -> Self {
        Self
    }

    pub fn handle_key(&mut self, key: KeyCode) -> Option<Action> {
        match key {
            KeyCode::Enter | KeyCode::Char('s') => Some(Action::Navigate(Route::Generate)),
            KeyCode::Char('l') => Some(Action::Navigate(Route::Login)),
            KeyCode::Char('q') | KeyCode::Esc => Some(Action::Quit),
            _ => None,
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, ctx: &RenderContext) {
        let p = ctx.palette;
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Percentage(20),
                Constraint::Length(5),
                Constraint::Length(FEATURES.len() as u16 * 2 + 2),
                Constraint::Length(2),
                Constraint::Min(0),
            ])
            .split(area);

        let hero = vec![
            Line::from(Span::styled(
                "Build a website in minutes",
                Style::default().fg(p.focus).add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(Span::styled(
                "Describe your business, review the AI design plan, and get a complete site.",
                Style::default().fg(p.fg),
            )),
        ];
        frame.render_widget(
            Paragraph::new(hero)
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true }),
            chunks[1],
        );

        let mut features = Vec::new();
        for (title, detail) in FEATURES {
            features.push(Line::from(Span::styled(
                title,
                Style::default().fg(p.important).add_modifier(Modifier::BOLD),
            )));
            features.push(Line::from(Span::styled(detail, Style::default().fg(p.muted))));
        }
        let features_area = centered_columns(chunks[2], 70);
        frame.render_widget(
            Paragraph::new(features)
                .alignment(Alignment::Center)
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(p.muted)),
                ),
            features_area,
        );

        let cta = Line::from(vec![
            Span::styled("[Enter] ", Style::default().fg(p.success)),
            Span::styled("Get started  ", Style::default().fg(p.fg)),
            Span::styled("[l] ", Style::default().fg(p.focus)),
            Span::styled("Sign in  ", Style::default().fg(p.fg)),
            Span::styled("[q] ", Style::default().fg(p.muted)),
            Span::styled("Quit", Style::default().fg(p.fg)),
        ]);
        frame.render_widget(Paragraph::new(cta).alignment(Alignment::Center), chunks[3]);
    }
}

/// Horizontally centered slice of `area`, at most `width` columns
pub(crate) fn centered_columns(area: Rect, width: u16) -> Rect {
    let width = width.min(area.width);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y,
        width,
        height: area.height,
    }
}
