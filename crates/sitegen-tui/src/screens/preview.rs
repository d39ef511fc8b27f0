//! Preview screen - rendered outline / source view, copy, export and the
//! edit modal

use super::{Action, RenderContext};
use crate::components::{EditModal, ModalAction};
use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs, Wrap},
    Frame,
};
use sitegen_core::preview::low_balance_warning;
use sitegen_core::workflow::SUCCESS_NOTICE;
use sitegen_core::{CoreError, EditWorkflow, PreviewState, Route, TokenGate, ViewMode};

pub struct PreviewScreen {
    state: PreviewState,
    edit: EditWorkflow,
    modal: EditModal,
    gate: TokenGate,
    scroll: u16,
}

impl PreviewScreen {
    pub fn new(website_id: impl Into<String>, gate: TokenGate) -> Self {
        Self {
            state: PreviewState::new(website_id),
            edit: EditWorkflow::new(gate),
            modal: EditModal::new(),
            gate,
            scroll: 0,
        }
    }

    pub fn website_id(&self) -> &str {
        self.state.website_id()
    }

    pub fn state(&self) -> &PreviewState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut PreviewState {
        &mut self.state
    }

    pub fn edit(&self) -> &EditWorkflow {
        &self.edit
    }

    /// Split borrow for applying edit results to the artifact
    pub fn parts_mut(&mut self) -> (&mut PreviewState, &mut EditWorkflow) {
        (&mut self.state, &mut self.edit)
    }

    /// Open the edit modal; a gate refusal is shown on the page instead
    pub fn open_edit(&mut self, balance: u64) -> Result<(), CoreError> {
        if self.state.artifact().is_none() {
            return Ok(());
        }
        match self.edit.open(balance) {
            Ok(()) => {
                self.modal.reset();
                self.state.clear_error();
                Ok(())
            }
            Err(e) => {
                self.state.set_error(e.to_string());
                Err(e)
            }
        }
    }

    pub fn close_edit(&mut self) -> Result<(), CoreError> {
        self.edit.close()?;
        self.modal.reset();
        Ok(())
    }

    pub fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) -> Option<Action> {
        if self.edit.is_open() {
            return match self.modal.handle_key(key, modifiers, &mut self.edit)? {
                ModalAction::Submit => Some(Action::SubmitEdit),
                ModalAction::Close => Some(Action::CloseEdit),
            };
        }

        match key {
            KeyCode::Esc if self.state.is_fullscreen() => {
                self.state.exit_fullscreen();
                None
            }
            KeyCode::Char('q') => Some(Action::Quit),
            KeyCode::Char('v') | KeyCode::Tab => {
                self.state.toggle_mode();
                self.scroll = 0;
                None
            }
            KeyCode::Char('f') => {
                if self.state.is_fullscreen() {
                    self.state.exit_fullscreen();
                } else {
                    self.state.enter_fullscreen();
                }
                None
            }
            KeyCode::Char('e') => Some(Action::OpenEdit),
            KeyCode::Char('c') => Some(Action::CopyCode),
            KeyCode::Char('d') => Some(Action::Download),
            KeyCode::Char('o') => Some(Action::OpenInBrowser),
            KeyCode::Char('n') => Some(Action::Navigate(Route::Generate)),
            KeyCode::Down | KeyCode::Char('j') => {
                self.scroll = self.scroll.saturating_add(1);
                None
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.scroll = self.scroll.saturating_sub(1);
                None
            }
            KeyCode::PageDown => {
                self.scroll = self.scroll.saturating_add(20);
                None
            }
            KeyCode::PageUp => {
                self.scroll = self.scroll.saturating_sub(20);
                None
            }
            KeyCode::Home => {
                self.scroll = 0;
                None
            }
            _ => None,
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, ctx: &RenderContext) {
        let p = ctx.palette;

        if self.state.is_fullscreen() {
            self.render_body(frame, area, ctx);
            return;
        }

        let warning = low_balance_warning(&self.gate, ctx.balance);
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(if warning.is_some() { 1 } else { 0 }),
                Constraint::Length(1),
                Constraint::Min(3),
                Constraint::Length(1),
            ])
            .split(area);

        let mut title = vec![
            Span::styled("Website ", Style::default().fg(p.muted)),
            Span::styled(
                self.state.website_id().to_string(),
                Style::default().fg(p.fg).add_modifier(Modifier::BOLD),
            ),
        ];
        if let Some(artifact) = self.state.artifact() {
            title.push(Span::styled(
                format!("  {} lines", artifact.line_count()),
                Style::default().fg(p.muted),
            ));
        }
        if self.edit.success_visible(ctx.now) {
            title.push(Span::styled(
                format!("  ✓ {}", SUCCESS_NOTICE),
                Style::default().fg(p.success).add_modifier(Modifier::BOLD),
            ));
        }
        if self.state.copied_visible(ctx.now) {
            title.push(Span::styled("  Copied!", Style::default().fg(p.success)));
        }
        frame.render_widget(Paragraph::new(Line::from(title)), chunks[0]);

        if let Some(warning) = warning {
            frame.render_widget(
                Paragraph::new(Line::from(vec![
                    Span::styled("⚠ ", Style::default().fg(p.warning)),
                    Span::styled(warning, Style::default().fg(p.warning)),
                    Span::styled("  [F2] Buy tokens", Style::default().fg(p.muted)),
                ])),
                chunks[1],
            );
        }

        let selected = match self.state.mode() {
            ViewMode::Preview => 0,
            ViewMode::Code => 1,
        };
        frame.render_widget(
            Tabs::new(vec![ViewMode::Preview.label(), ViewMode::Code.label()])
                .select(selected)
                .style(Style::default().fg(p.muted))
                .highlight_style(Style::default().fg(p.focus).add_modifier(Modifier::BOLD)),
            chunks[2],
        );

        self.render_body(frame, chunks[3], ctx);

        let hint = "[v] Preview/Code  [e] Edit with AI  [c] Copy  [d] Download  [o] Open in browser  [f] Fullscreen  [n] New";
        frame.render_widget(
            Paragraph::new(Span::styled(hint, Style::default().fg(p.muted))),
            chunks[4],
        );

        self.modal.render(frame, area, &self.edit, ctx.spinner.clone(), p);
    }

    fn render_body(&self, frame: &mut Frame, area: Rect, ctx: &RenderContext) {
        let p = ctx.palette;
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(p.border(!self.edit.is_open())));

        if self.state.is_loading() {
            let line = Line::from(vec![
                ctx.spinner.clone(),
                Span::styled(" Loading website...", Style::default().fg(p.warning)),
            ]);
            frame.render_widget(Paragraph::new(line).block(block), area);
            return;
        }

        let Some(artifact) = self.state.artifact() else {
            let message = self.state.error().unwrap_or("Website not found");
            frame.render_widget(
                Paragraph::new(Span::styled(message.to_string(), Style::default().fg(p.error)))
                    .wrap(Wrap { trim: true })
                    .block(block),
                area,
            );
            return;
        };

        let mut lines: Vec<Line> = Vec::new();
        if let Some(error) = self.state.error() {
            lines.push(Line::from(Span::styled(
                error.to_string(),
                Style::default().fg(p.error),
            )));
            lines.push(Line::from(""));
        }

        match self.state.mode() {
            ViewMode::Preview => {
                for line in html_outline(&artifact.code) {
                    let style = if line.starts_with('#') {
                        Style::default().fg(p.focus).add_modifier(Modifier::BOLD)
                    } else {
                        Style::default().fg(p.fg)
                    };
                    lines.push(Line::from(Span::styled(line, style)));
                }
            }
            ViewMode::Code => {
                let width = artifact.line_count().to_string().len();
                for (i, line) in artifact.code.lines().enumerate() {
                    lines.push(Line::from(vec![
                        Span::styled(
                            format!("{:>width$} │ ", i + 1, width = width),
                            Style::default().fg(p.muted),
                        ),
                        Span::styled(line.to_string(), Style::default().fg(p.fg)),
                    ]));
                }
            }
        }

        let wrap = self.state.mode() == ViewMode::Preview;
        let mut paragraph = Paragraph::new(lines)
            .block(block.title(format!(" {} ", self.state.mode().label())))
            .scroll((self.scroll, 0));
        if wrap {
            paragraph = paragraph.wrap(Wrap { trim: true });
        }
        frame.render_widget(paragraph, area);
    }
}

const SKIPPED: [&str; 6] = ["script", "style", "head", "noscript", "svg", "template"];
const BLOCKS: [&str; 22] = [
    "p", "div", "section", "header", "footer", "nav", "main", "article", "aside", "ul", "ol",
    "li", "br", "tr", "table", "form", "figure", "blockquote", "hr", "dl", "dt", "dd",
];

/// Readable text outline of an HTML document: one line per block, headings
/// prefixed with `#`, list items with `•`, buttons in brackets. Scripts,
/// styles and the document head are dropped.
pub fn html_outline(code: &str) -> Vec<String> {
    let mut outline = Outline::default();
    let mut rest = code;
    let mut skipping: Option<String> = None;

    while let Some(lt) = rest.find('<') {
        if skipping.is_none() {
            outline.text(&rest[..lt]);
        }
        let after = &rest[lt + 1..];

        if let Some(comment) = after.strip_prefix("!--") {
            rest = comment.find("-->").map(|end| &comment[end + 3..]).unwrap_or("");
            continue;
        }
        let Some(gt) = after.find('>') else {
            rest = "";
            break;
        };
        let tag = &after[..gt];
        rest = &after[gt + 1..];

        let closing = tag.starts_with('/');
        let name: String = tag
            .trim_start_matches('/')
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();

        if let Some(skipped) = &skipping {
            if closing && *skipped == name {
                skipping = None;
            }
            continue;
        }
        if !closing && SKIPPED.contains(&name.as_str()) && !tag.ends_with('/') {
            skipping = Some(name);
            continue;
        }

        match name.as_str() {
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                outline.flush();
                if !closing {
                    let level = name[1..].parse::<usize>().unwrap_or(1);
                    outline.prefix = Some(format!("{} ", "#".repeat(level)));
                }
            }
            "li" if !closing => {
                outline.flush();
                outline.prefix = Some("• ".to_string());
            }
            "button" if closing => outline.current.push(']'),
            "button" => {
                if !outline.current.is_empty() && !outline.current.ends_with(' ') {
                    outline.current.push(' ');
                }
                outline.current.push('[');
            }
            "img" => {
                if let Some(alt) = attribute(tag, "alt").filter(|a| !a.trim().is_empty()) {
                    outline.text(&format!(" [image: {}] ", alt));
                }
            }
            n if BLOCKS.contains(&n) => outline.flush(),
            _ => {}
        }
    }
    if skipping.is_none() {
        outline.text(rest);
    }
    outline.flush();
    outline.lines
}

#[derive(Default)]
struct Outline {
    lines: Vec<String>,
    current: String,
    prefix: Option<String>,
}

impl Outline {
    fn text(&mut self, raw: &str) {
        let decoded = decode_entities(raw);
        for (i, word) in decoded.split_whitespace().enumerate() {
            if let Some(prefix) = self.prefix.take() {
                self.current.push_str(&prefix);
            } else if (i > 0 || decoded.starts_with(char::is_whitespace))
                && !self.current.is_empty()
                && !self.current.ends_with(' ')
                && !self.current.ends_with('[')
            {
                self.current.push(' ');
            }
            self.current.push_str(word);
        }
        if decoded.ends_with(char::is_whitespace)
            && !self.current.is_empty()
            && !self.current.ends_with(' ')
        {
            self.current.push(' ');
        }
    }

    fn flush(&mut self) {
        let line = self.current.trim();
        if !line.is_empty() && line != "[" && line != "[]" {
            self.lines.push(line.to_string());
        }
        self.current.clear();
        self.prefix = None;
    }
}

fn attribute(tag: &str, name: &str) -> Option<String> {
    let lower = tag.to_ascii_lowercase();
    let start = lower.find(&format!("{}=", name))? + name.len() + 1;
    let value = &tag[start..];
    let quote = value.chars().next()?;
    if quote == '"' || quote == '\'' {
        let inner = &value[1..];
        inner.find(quote).map(|end| decode_entities(&inner[..end]))
    } else {
        Some(value.split_whitespace().next().unwrap_or("").to_string())
    }
}

fn decode_entities(raw: &str) -> String {
    if !raw.contains('&') {
        return raw.to_string();
    }
    raw.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&copy;", "©")
        .replace("&amp;", "&")
}
