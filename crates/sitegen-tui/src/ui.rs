//! TUI rendering logic

use crate::app::{App, Screen};
use crate::screens::RenderContext;
use chrono::Local;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use sitegen_core::format_tokens;
use std::time::Instant;

/// Render the full UI
pub fn render(frame: &mut Frame, app: &mut App) {
    let size = frame.area();
    let palette = app.palette;
    let ctx = RenderContext {
        palette: &palette,
        balance: app.client.balance().current(),
        spinner: app.spinner.render(),
        now: Instant::now(),
    };

    let fullscreen = matches!(&app.screen, Screen::Preview(s) if s.state().is_fullscreen());
    if fullscreen {
        render_screen(frame, size, app, &ctx);
        app.toasts.render(frame, size, &palette);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Content
            Constraint::Length(1), // Status bar
        ])
        .split(size);

    render_header(frame, chunks[0], app, &ctx);
    render_screen(frame, chunks[1], app, &ctx);
    render_status_bar(frame, chunks[2], app, &ctx);

    // Toasts overlay everything
    app.toasts.render(frame, size, &palette);
}

fn render_screen(frame: &mut Frame, area: Rect, app: &App, ctx: &RenderContext) {
    match &app.screen {
        Screen::Landing(s) => s.render(frame, area, ctx),
        Screen::Login(s) => s.render(frame, area, ctx),
        Screen::Generate(s) => s.render(frame, area, ctx),
        Screen::Preview(s) => s.render(frame, area, ctx),
        Screen::Pricing(s) => s.render(frame, area, ctx),
    }
}

fn render_header(frame: &mut Frame, area: Rect, app: &App, ctx: &RenderContext) {
    let p = ctx.palette;
    let mut left = vec![
        Span::styled(
            " sitegen ",
            Style::default().fg(p.focus).add_modifier(Modifier::BOLD),
        ),
        Span::styled("│ ", Style::default().fg(p.muted)),
        Span::styled(app.screen.name(), Style::default().fg(p.fg)),
    ];

    if let Some(session) = app.client.session().current() {
        left.push(Span::styled("  │  ", Style::default().fg(p.muted)));
        left.push(Span::styled(
            session.user.display_name().to_string(),
            Style::default().fg(p.fg),
        ));
        left.push(Span::styled("  │  ", Style::default().fg(p.muted)));

        let balance = app.client.balance();
        match balance.known() {
            Some(raw) => {
                let color = if app.gate().allows(raw) { p.important } else { p.warning };
                left.push(Span::styled(
                    format!("{} tokens", format_tokens(raw)),
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                ));
                if let Some(at) = balance.refreshed_at() {
                    left.push(Span::styled(
                        format!(" (updated {})", at.with_timezone(&Local).format("%H:%M:%S")),
                        Style::default().fg(p.muted),
                    ));
                }
            }
            None => left.push(Span::styled("… tokens", Style::default().fg(p.muted))),
        }
    }

    let header = Paragraph::new(Line::from(left)).block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(p.muted)),
    );
    frame.render_widget(header, area);
}

fn render_status_bar(frame: &mut Frame, area: Rect, app: &App, ctx: &RenderContext) {
    let p = ctx.palette;
    let line = if let Some(message) = &app.status_message {
        Line::from(vec![
            Span::styled(" ⚠ ", Style::default().fg(p.warning)),
            Span::styled(message.as_str(), Style::default().fg(p.warning)),
        ])
    } else {
        let mut keys = vec![("Ctrl+C", "Quit")];
        if app.client.session().is_authenticated() {
            keys.extend([("F2", "Buy tokens"), ("F5", "Refresh balance"), ("F9", "Logout")]);
        }
        let mut spans = vec![Span::raw(" ")];
        for (key, label) in keys {
            spans.push(Span::styled(key, Style::default().fg(p.focus)));
            spans.push(Span::styled(format!(" {}  ", label), Style::default().fg(p.muted)));
        }
        Line::from(spans)
    };
    frame.render_widget(Paragraph::new(line), area);
}
