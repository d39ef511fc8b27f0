//! Pricing screen - token packages

use super::{Action, RenderContext};
use crossterm::event::KeyCode;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use sitegen_core::{format_tokens, PricingFlow, Route, TokenPackage, TOKEN_PACKAGES};
use std::time::Instant;
use tracing::warn;

pub struct PricingScreen {
    flow: PricingFlow,
    selected: usize,
}

impl PricingScreen {
    pub fn new(flow: PricingFlow) -> Self {
        let selected = TOKEN_PACKAGES.iter().position(|p| p.popular).unwrap_or(0);
        Self { flow, selected }
    }

    pub fn flow(&self) -> &PricingFlow {
        &self.flow
    }

    pub fn flow_mut(&mut self) -> &mut PricingFlow {
        &mut self.flow
    }

    pub fn selected(&self) -> &'static TokenPackage {
        &TOKEN_PACKAGES[self.selected]
    }

    /// Redirect back once the post-purchase delay has elapsed
    pub fn tick(&mut self, now: Instant) -> Option<Action> {
        self.flow
            .redirect_due(now)
            .map(|path| Action::Navigate(parse_return(&path)))
    }

    pub fn handle_key(&mut self, key: KeyCode) -> Option<Action> {
        if self.flow.is_busy() || self.flow.success().is_some() {
            return None;
        }
        let count = TOKEN_PACKAGES.len();
        match key {
            KeyCode::Left | KeyCode::Up | KeyCode::Char('h') | KeyCode::Char('k') => {
                self.selected = (self.selected + count - 1) % count;
                None
            }
            KeyCode::Right | KeyCode::Down | KeyCode::Char('l') | KeyCode::Char('j') => {
                self.selected = (self.selected + 1) % count;
                None
            }
            KeyCode::Char(c @ '1'..='9') => {
                let idx = c as usize - '1' as usize;
                if idx < count {
                    self.selected = idx;
                }
                None
            }
            KeyCode::Enter => Some(Action::Purchase(self.selected().id)),
            KeyCode::Esc | KeyCode::Char('b') => {
                Some(Action::Navigate(parse_return(&self.flow.back())))
            }
            KeyCode::Char('q') => Some(Action::Quit),
            _ => None,
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, ctx: &RenderContext) {
        let p = ctx.palette;
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(10),
                Constraint::Length(2),
            ])
            .split(area);

        let heading = vec![
            Line::from(Span::styled(
                "Choose your token package",
                Style::default().fg(p.focus).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                format!("Current balance: {} tokens", format_tokens(ctx.balance)),
                Style::default().fg(p.important),
            )),
        ];
        frame.render_widget(
            Paragraph::new(heading).alignment(Alignment::Center),
            chunks[0],
        );

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(
                TOKEN_PACKAGES
                    .iter()
                    .map(|_| Constraint::Ratio(1, TOKEN_PACKAGES.len() as u32))
                    .collect::<Vec<_>>(),
            )
            .split(chunks[1]);

        for (i, package) in TOKEN_PACKAGES.iter().enumerate() {
            self.render_package(frame, columns[i], package, i == self.selected, ctx);
        }

        let footer = if let Some(success) = self.flow.success() {
            Line::from(vec![
                Span::styled(
                    format!("✓ {} ", success),
                    Style::default().fg(p.success).add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!("Returning to {}...", self.flow.return_to()),
                    Style::default().fg(p.muted),
                ),
            ])
        } else if let Some(error) = self.flow.error() {
            Line::from(Span::styled(error.to_string(), Style::default().fg(p.error)))
        } else {
            Line::from(Span::styled(
                format!(
                    "[←/→] Select  [Enter] Purchase  [Esc] Back to {}",
                    self.flow.return_to()
                ),
                Style::default().fg(p.muted),
            ))
        };
        frame.render_widget(
            Paragraph::new(footer)
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true }),
            chunks[2],
        );
    }

    fn render_package(
        &self,
        frame: &mut Frame,
        area: Rect,
        package: &TokenPackage,
        selected: bool,
        ctx: &RenderContext,
    ) {
        let p = ctx.palette;
        let accent = if package.popular { p.important } else { p.focus };
        let mut title = vec![Span::styled(
            format!(" {} ", package.name),
            Style::default().fg(accent).add_modifier(Modifier::BOLD),
        )];
        if package.popular {
            title.push(Span::styled(
                "★ Most popular ",
                Style::default().fg(p.important),
            ));
        }

        let mut lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                format!("{} tokens", package.display_tokens()),
                Style::default().fg(p.fg).add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
        ];
        for feature in package.features {
            lines.push(Line::from(vec![
                Span::styled("✓ ", Style::default().fg(p.success)),
                Span::styled(feature, Style::default().fg(p.fg)),
            ]));
        }
        lines.push(Line::from(""));
        if self.flow.purchasing() == Some(package.id) {
            lines.push(Line::from(vec![
                ctx.spinner.clone(),
                Span::styled(" Processing...", Style::default().fg(p.warning)),
            ]));
        } else if selected {
            lines.push(Line::from(Span::styled(
                "[Enter] Purchase",
                Style::default().fg(p.success),
            )));
        }

        frame.render_widget(
            Paragraph::new(lines)
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true })
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(p.border(selected)))
                        .title(Line::from(title)),
                ),
            area,
        );
    }
}

fn parse_return(path: &str) -> Route {
    Route::parse(path).unwrap_or_else(|e| {
        warn!(path, error = %e, "Unusable return path, going to generate");
        Route::Generate
    })
}
