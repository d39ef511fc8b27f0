//! Toast notifications

use crate::theme::Palette;
use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastType {
    Success,
    Warning,
    Error,
    Info,
}

impl ToastType {
    pub fn color(&self, p: &Palette) -> Color {
        match self {
            Self::Success => p.success,
            Self::Warning => p.warning,
            Self::Error => p.error,
            Self::Info => p.focus,
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Self::Success => "✓",
            Self::Warning => "⚠",
            Self::Error => "✗",
            Self::Info => "ℹ",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub message: String,
    pub toast_type: ToastType,
    pub created_at: Instant,
    pub duration: Duration,
}

impl Toast {
    pub fn new(message: impl Into<String>, toast_type: ToastType) -> Self {
        Self {
            message: message.into(),
            toast_type,
            created_at: Instant::now(),
            duration: Duration::from_secs(3),
        }
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn is_expired_at(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.created_at) >= self.duration
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(message, ToastType::Success)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(message, ToastType::Warning)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(message, ToastType::Error)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(message, ToastType::Info)
    }
}

/// Stack of live toasts, newest last
#[derive(Debug, Default)]
pub struct ToastManager {
    toasts: Vec<Toast>,
}

impl ToastManager {
    pub fn new() -> Self {
        Self { toasts: Vec::new() }
    }

    pub fn push(&mut self, toast: Toast) {
        self.toasts.push(toast);
    }

    pub fn clear_expired(&mut self, now: Instant) {
        self.toasts.retain(|t| !t.is_expired_at(now));
    }

    pub fn len(&self) -> usize {
        self.toasts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }

    pub fn latest(&self) -> Option<&Toast> {
        self.toasts.last()
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, p: &Palette) {
        const MAX_VISIBLE: usize = 3;
        const HEIGHT: u16 = 3;

        let skip = self.toasts.len().saturating_sub(MAX_VISIBLE);
        let visible = &self.toasts[skip..];
        let mut y = area
            .height
            .saturating_sub(visible.len() as u16 * HEIGHT + 2);

        for toast in visible {
            let width = (toast.message.chars().count() + 6).min(area.width as usize) as u16;
            let rect = Rect {
                x: area.x + area.width.saturating_sub(width) / 2,
                y: area.y + y,
                width,
                height: HEIGHT,
            };
            render_single_toast(frame, rect, toast, p);
            y += HEIGHT;
        }
    }
}

fn render_single_toast(frame: &mut Frame, area: Rect, toast: &Toast, p: &Palette) {
    let color = toast.toast_type.color(p);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color));
    let inner = block.inner(area);
    frame.render_widget(Clear, area);
    frame.render_widget(block, area);

    let content = Line::from(vec![
        Span::styled(
            format!("{} ", toast.toast_type.icon()),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
        Span::styled(toast.message.as_str(), Style::default().fg(p.fg)),
    ]);
    frame.render_widget(Paragraph::new(content).alignment(Alignment::Center), inner);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toasts_expire_after_duration() {
        let mut toasts = ToastManager::new();
        let toast = Toast::success("Edited Successfully!");
        let created = toast.created_at;
        toasts.push(toast);
        toasts.push(Toast::info("Copied!").with_duration(Duration::from_secs(2)));

        toasts.clear_expired(created + Duration::from_millis(2_500));
        assert_eq!(toasts.len(), 1);
        assert_eq!(toasts.latest().unwrap().message, "Edited Successfully!");

        toasts.clear_expired(created + Duration::from_secs(3));
        assert!(toasts.is_empty());
    }
}
