//! Edit-with-AI modal

use crate::components::TextInput;
use crate::theme::Palette;
use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use sitegen_core::workflow::{EditModalState, EditWorkflow, EXAMPLE_EDITS};

/// What the modal asks the screen to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalAction {
    Submit,
    Close,
}

/// Modal chrome around an [`EditWorkflow`]: instruction input plus the
/// example suggestions.
pub struct EditModal {
    input: TextInput,
    example_cursor: Option<usize>,
}

impl Default for EditModal {
    fn default() -> Self {
        Self::new()
    }
}

impl EditModal {
    pub fn new() -> Self {
        Self {
            input: TextInput::new("What would you like to change?")
                .with_placeholder("e.g. Make the header sticky"),
            example_cursor: None,
        }
    }

    pub fn instruction(&self) -> &str {
        self.input.value()
    }

    /// Forget the previous instruction (on open/close)
    pub fn reset(&mut self) {
        self.input.clear();
        self.example_cursor = None;
    }

    /// Handle a key while the modal is open.
    ///
    /// Text keys edit the instruction; the workflow is kept in sync so a
    /// submit always sees what is on screen. Keys are ignored mid-request.
    pub fn handle_key(
        &mut self,
        key: KeyCode,
        modifiers: KeyModifiers,
        workflow: &mut EditWorkflow,
    ) -> Option<ModalAction> {
        if workflow.is_busy() {
            return None;
        }
        match key {
            KeyCode::Esc => Some(ModalAction::Close),
            KeyCode::Enter => {
                workflow.set_instruction(self.input.value());
                Some(ModalAction::Submit)
            }
            KeyCode::Tab => {
                let next = self
                    .example_cursor
                    .map(|i| (i + 1) % EXAMPLE_EDITS.len())
                    .unwrap_or(0);
                if let Some(example) = workflow.use_example(next) {
                    self.input.set_value(example);
                    self.example_cursor = Some(next);
                }
                None
            }
            _ => {
                if self.input.handle_key(key, modifiers) {
                    workflow.set_instruction(self.input.value());
                }
                None
            }
        }
    }

    pub fn render(
        &self,
        frame: &mut Frame,
        area: Rect,
        workflow: &EditWorkflow,
        spinner: Span<'static>,
        p: &Palette,
    ) {
        if workflow.state() == EditModalState::Closed {
            return;
        }

        let width = (area.width as f32 * 0.6).max(50.0).min(area.width as f32) as u16;
        let height = 16.min(area.height);
        let modal_area = Rect {
            x: area.x + area.width.saturating_sub(width) / 2,
            y: area.y + area.height.saturating_sub(height) / 2,
            width,
            height,
        };

        frame.render_widget(Clear, modal_area);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(p.important))
            .title(Span::styled(
                " Edit with AI ",
                Style::default()
                    .fg(p.important)
                    .add_modifier(Modifier::BOLD),
            ))
            .title_alignment(Alignment::Center);
        let inner = block.inner(modal_area);
        frame.render_widget(block, modal_area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Min(5),
                Constraint::Length(2),
            ])
            .split(inner);

        self.input.render(frame, chunks[0], p);

        let mut examples = vec![Line::from(Span::styled(
            "Examples (Tab to use):",
            Style::default().fg(p.muted),
        ))];
        for (i, example) in EXAMPLE_EDITS.iter().enumerate() {
            let selected = self.example_cursor == Some(i);
            let style = if selected {
                Style::default().fg(p.focus).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(p.fg)
            };
            examples.push(Line::from(vec![
                Span::styled(if selected { "▶ " } else { "  " }, style),
                Span::styled(*example, style),
            ]));
        }
        frame.render_widget(Paragraph::new(examples), chunks[1]);

        let footer = if workflow.is_busy() {
            Line::from(vec![
                spinner,
                Span::styled(" Applying changes...", Style::default().fg(p.warning)),
            ])
        } else if let Some(error) = workflow.error() {
            Line::from(Span::styled(error.to_string(), Style::default().fg(p.error)))
        } else {
            Line::from(vec![
                Span::styled("[Enter] ", Style::default().fg(p.success)),
                Span::styled("Apply changes  ", Style::default().fg(p.fg)),
                Span::styled("[Esc] ", Style::default().fg(p.muted)),
                Span::styled("Cancel", Style::default().fg(p.fg)),
            ])
        };
        frame.render_widget(
            Paragraph::new(footer)
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true }),
            chunks[2],
        );
    }
}
