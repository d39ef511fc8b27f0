//! sitegen-tui - TUI frontend for sitegen using Ratatui

pub mod app;
pub mod components;
pub mod screens;
pub mod theme;
pub mod ui;

pub use app::App;
pub use theme::ColorScheme;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use sitegen_core::{Route, SitegenClient};
use std::io;
use std::time::{Duration, Instant};

/// Run the TUI application starting at `initial`
pub async fn run(client: SitegenClient, scheme: ColorScheme, initial: Route) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(client, scheme);
    app.navigate(initial);

    let result = run_loop(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

async fn run_loop<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()>
where
    <B as Backend>::Error: Send + Sync + 'static,
{
    loop {
        // Session/balance events, then finished requests
        app.poll_events();
        app.poll_tasks();
        app.tick(Instant::now());

        terminal.draw(|f| ui::render(f, app))?;

        // Short poll keeps the spinner moving and lets request tasks run
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key.code, key.modifiers);
                }
            }
        } else {
            tokio::task::yield_now().await;
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
