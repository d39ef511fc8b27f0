//! Generate screen - prompt, plan review and generation

use super::landing::centered_columns;
use super::{Action, RenderContext};
use crate::components::TextInput;
use crate::theme::{parse_hex_color, Palette};
use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use sitegen_core::workflow::EXAMPLE_PROMPTS;
use sitegen_core::{GenerationStep, GenerationWorkflow, TokenGate};
use sitegen_types::GenerationPlan;

pub struct GenerateScreen {
    workflow: GenerationWorkflow,
    input: TextInput,
    example_cursor: Option<usize>,
}

impl GenerateScreen {
    pub fn new(gate: TokenGate) -> Self {
        Self {
            workflow: GenerationWorkflow::new(gate),
            input: TextInput::new("Describe your website")
                .with_placeholder("e.g. A modern landing page for a coffee shop"),
            example_cursor: None,
        }
    }

    pub fn workflow(&self) -> &GenerationWorkflow {
        &self.workflow
    }

    pub fn workflow_mut(&mut self) -> &mut GenerationWorkflow {
        &mut self.workflow
    }

    fn reset(&mut self) {
        self.workflow.reset();
        self.input.clear();
        self.input.active = true;
        self.example_cursor = None;
    }

    pub fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) -> Option<Action> {
        if self.workflow.is_busy() {
            return None;
        }
        match self.workflow.step() {
            GenerationStep::Input => match key {
                KeyCode::Enter => {
                    self.workflow.set_prompt(self.input.value());
                    Some(Action::Analyze)
                }
                KeyCode::Tab => {
                    let next = self
                        .example_cursor
                        .map(|i| (i + 1) % EXAMPLE_PROMPTS.len())
                        .unwrap_or(0);
                    if let Some(example) = self.workflow.use_example(next) {
                        self.input.set_value(example);
                        self.example_cursor = Some(next);
                    }
                    None
                }
                _ => {
                    if self.input.handle_key(key, modifiers) {
                        self.workflow.set_prompt(self.input.value());
                    }
                    None
                }
            },
            GenerationStep::Plan => match key {
                KeyCode::Enter | KeyCode::Char('g') => Some(Action::Generate),
                KeyCode::Esc | KeyCode::Char('r') => {
                    self.reset();
                    None
                }
                KeyCode::Char('q') => Some(Action::Quit),
                _ => None,
            },
            GenerationStep::Generating => None,
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, ctx: &RenderContext) {
        let p = ctx.palette;
        let column = centered_columns(area, 90);
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Min(8),
                Constraint::Length(2),
            ])
            .split(column);

        frame.render_widget(
            Paragraph::new(step_indicator(self.workflow.step(), p)),
            chunks[0],
        );

        match (self.workflow.step(), self.workflow.plan()) {
            (GenerationStep::Input, _) | (_, None) => self.render_input(frame, chunks[1], p),
            (step, Some(plan)) => {
                let title = if step == GenerationStep::Generating {
                    " Generating your website "
                } else {
                    " Your design plan "
                };
                frame.render_widget(
                    Paragraph::new(plan_lines(plan, p))
                        .wrap(Wrap { trim: false })
                        .block(
                            Block::default()
                                .borders(Borders::ALL)
                                .border_style(Style::default().fg(p.border(true)))
                                .title(Span::styled(
                                    title,
                                    Style::default().fg(p.fg).add_modifier(Modifier::BOLD),
                                )),
                        ),
                    chunks[1],
                );
            }
        }

        frame.render_widget(
            Paragraph::new(self.footer(ctx)).wrap(Wrap { trim: true }),
            chunks[2],
        );
    }

    fn render_input(&self, frame: &mut Frame, area: Rect, p: &Palette) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(5), Constraint::Min(0)])
            .split(area);

        self.input.render(frame, chunks[0], p);

        let mut lines = vec![Line::from(Span::styled(
            "Need inspiration? Press Tab to use an example:",
            Style::default().fg(p.muted),
        ))];
        for (i, example) in EXAMPLE_PROMPTS.iter().enumerate() {
            let selected = self.example_cursor == Some(i);
            let style = if selected {
                Style::default().fg(p.focus).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(p.fg)
            };
            lines.push(Line::from(Span::styled(format!("  • {}", example), style)));
        }
        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), chunks[1]);
    }

    fn footer(&self, ctx: &RenderContext) -> Line<'static> {
        let p = ctx.palette;
        if self.workflow.is_busy() {
            let label = match self.workflow.step() {
                GenerationStep::Input => " Analyzing your prompt...",
                _ => " Generating your website. This can take a minute...",
            };
            return Line::from(vec![
                ctx.spinner.clone(),
                Span::styled(label, Style::default().fg(p.warning)),
            ]);
        }
        if let Some(error) = self.workflow.error() {
            return Line::from(Span::styled(error.to_string(), Style::default().fg(p.error)));
        }
        let hint = match self.workflow.step() {
            GenerationStep::Input => "[Enter] Analyze  [Tab] Example  [F2] Buy tokens",
            GenerationStep::Plan => "[Enter/g] Generate website  [r] Start over  [F2] Buy tokens",
            GenerationStep::Generating => "",
        };
        Line::from(Span::styled(hint, Style::default().fg(p.muted)))
    }
}

fn step_indicator(step: GenerationStep, p: &Palette) -> Line<'static> {
    let current = match step {
        GenerationStep::Input => 0,
        GenerationStep::Plan => 1,
        GenerationStep::Generating => 2,
    };
    let mut spans = Vec::new();
    for (i, label) in ["Describe", "Review plan", "Generate"].iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" › ", Style::default().fg(p.muted)));
        }
        let style = if i == current {
            Style::default().fg(p.focus).add_modifier(Modifier::BOLD)
        } else if i < current {
            Style::default().fg(p.success)
        } else {
            Style::default().fg(p.muted)
        };
        spans.push(Span::styled(format!("{} {}", i + 1, label), style));
    }
    Line::from(spans)
}

/// Summary of a design plan: type, style, audience, palette, fonts, sections
pub fn plan_lines(plan: &GenerationPlan, p: &Palette) -> Vec<Line<'static>> {
    let label = |text: &str| Span::styled(format!("{:<16}", text), Style::default().fg(p.muted));
    let value = |text: &str| Span::styled(text.to_string(), Style::default().fg(p.fg));

    let mut lines = vec![
        Line::from(vec![label("Website type"), value(plan.website_type())]),
        Line::from(vec![label("Design style"), value(plan.design_style())]),
        Line::from(vec![label("Audience"), value(plan.target_audience())]),
        Line::from(vec![
            label("Typography"),
            value(&format!("{} / {}", plan.heading_font(), plan.body_font())),
        ]),
        Line::from(""),
    ];

    if plan.colors().next().is_some() {
        lines.push(Line::from(label("Colors")));
        for (name, code) in plan.colors() {
            let chip = match parse_hex_color(code) {
                Some(color) => Span::styled("███ ", Style::default().fg(color)),
                None => Span::raw("    "),
            };
            lines.push(Line::from(vec![
                Span::raw("  "),
                chip,
                value(&format!("{:<12} {}", name, code)),
            ]));
        }
        lines.push(Line::from(""));
    }

    lines.push(Line::from(label(&format!("Sections ({})", plan.section_count()))));
    for (i, section) in plan.sections().enumerate() {
        lines.push(Line::from(vec![
            Span::styled(format!("  {:>2}. ", i + 1), Style::default().fg(p.important)),
            value(section),
        ]));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use sitegen_core::CoreError;
    use sitegen_types::AnalyzeResponse;

    fn screen() -> GenerateScreen {
        GenerateScreen::new(TokenGate::default())
    }

    fn plan() -> GenerationPlan {
        GenerationPlan::from(serde_json::json!({
            "websiteType": "Landing page",
            "sections": ["Hero", "Menu"],
            "colorPalette": {"primary": "#6F4E37"},
        }))
    }

    #[test]
    fn test_typing_updates_prompt() {
        let mut s = screen();
        for c in "Coffee".chars() {
            s.handle_key(KeyCode::Char(c), KeyModifiers::NONE);
        }
        assert_eq!(s.workflow().prompt(), "Coffee");
        assert_eq!(s.handle_key(KeyCode::Enter, KeyModifiers::NONE), Some(Action::Analyze));
    }

    #[test]
    fn test_tab_fills_example_without_submitting() {
        let mut s = screen();
        assert_eq!(s.handle_key(KeyCode::Tab, KeyModifiers::NONE), None);
        assert_eq!(s.workflow().prompt(), EXAMPLE_PROMPTS[0]);
        assert_eq!(s.input.value(), EXAMPLE_PROMPTS[0]);
        assert_eq!(s.workflow().step(), GenerationStep::Input);
    }

    #[test]
    fn test_plan_step_keys() {
        let mut s = screen();
        s.workflow_mut().set_prompt("Coffee shop");
        s.workflow_mut().begin_analyze(Some("u1"), 40_000).unwrap();
        assert_eq!(s.handle_key(KeyCode::Enter, KeyModifiers::NONE), None);

        s.workflow_mut()
            .complete_analyze(Ok(AnalyzeResponse {
                session_id: "s1".to_string(),
                plan: plan(),
            }))
            .unwrap();
        assert_eq!(s.handle_key(KeyCode::Char('g'), KeyModifiers::NONE), Some(Action::Generate));

        s.handle_key(KeyCode::Char('r'), KeyModifiers::NONE);
        assert_eq!(s.workflow().step(), GenerationStep::Input);
        assert!(s.input.is_empty());
        assert_eq!(s.workflow().epoch(), 1);
    }

    #[test]
    fn test_refusal_shows_in_footer() {
        let mut s = screen();
        s.workflow_mut().set_prompt("Coffee shop");
        let err = s.workflow_mut().begin_analyze(Some("u1"), 1_000).unwrap_err();
        assert!(matches!(err, CoreError::InsufficientTokens(_)));
        assert!(s.workflow().error().unwrap().contains("1.0"));
    }

    #[test]
    fn test_plan_lines_lists_sections_and_colors() {
        let lines = plan_lines(&plan(), &Palette::default());
        let text: Vec<String> = lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect();
        assert!(text.iter().any(|l| l.contains("Landing page")));
        assert!(text.iter().any(|l| l.contains("Sections (2)")));
        assert!(text.iter().any(|l| l.contains("2. Menu")));
        assert!(text.iter().any(|l| l.contains("#6F4E37")));
    }
}
