//! Animated spinner shown while a backend request is in flight

use ratatui::{
    style::{Color, Style},
    text::Span,
};
use std::time::{Duration, Instant};

const FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

#[derive(Debug)]
pub struct Spinner {
    current_frame: usize,
    last_update: Instant,
    frame_duration: Duration,
    color: Color,
}

impl Default for Spinner {
    fn default() -> Self {
        Self::new()
    }
}

impl Spinner {
    pub fn new() -> Self {
        Self {
            current_frame: 0,
            last_update: Instant::now(),
            frame_duration: Duration::from_millis(80),
            color: Color::Cyan,
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Advance the animation (call once per draw)
    pub fn tick(&mut self) {
        self.tick_at(Instant::now());
    }

    fn tick_at(&mut self, now: Instant) {
        if now.saturating_duration_since(self.last_update) >= self.frame_duration {
            self.current_frame = (self.current_frame + 1) % FRAMES.len();
            self.last_update = now;
        }
    }

    pub fn render(&self) -> Span<'static> {
        Span::styled(FRAMES[self.current_frame], Style::default().fg(self.color))
    }

    /// Spinner frame followed by a label
    pub fn label(&self, text: &str) -> String {
        format!("{} {}", FRAMES[self.current_frame], text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spinner_advances_after_frame_duration() {
        let mut spinner = Spinner::new();
        let start = spinner.last_update;
        spinner.tick_at(start + Duration::from_millis(10));
        assert_eq!(spinner.current_frame, 0);
        spinner.tick_at(start + Duration::from_millis(100));
        assert_eq!(spinner.current_frame, 1);
    }

    #[test]
    fn test_spinner_wraps() {
        let mut spinner = Spinner::new();
        let mut now = spinner.last_update;
        for _ in 0..FRAMES.len() {
            now += Duration::from_millis(100);
            spinner.tick_at(now);
        }
        assert_eq!(spinner.current_frame, 0);
    }

    #[test]
    fn test_custom_color() {
        let spinner = Spinner::new().with_color(Color::Yellow);
        assert_eq!(spinner.color, Color::Yellow);
        assert!(spinner.label("Generating").ends_with("Generating"));
    }
}
