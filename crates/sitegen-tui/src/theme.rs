//! Unified theme and color system for sitegen TUI
//!
//! - Green: success, purchase confirmations
//! - Red: errors, gate refusals
//! - Yellow: warnings (low balance), pending requests
//! - Cyan: focus, interactive elements
//! - Magenta: token balance, highlighted packages

use ratatui::style::Color;

/// Color scheme for the TUI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorScheme {
    #[default]
    Dark,
    Light,
}

/// Semantic status colors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusColor {
    Success,
    Error,
    Warning,
    Neutral,
    Focus,
    Important,
}

impl StatusColor {
    pub fn to_color(self, scheme: ColorScheme) -> Color {
        match scheme {
            ColorScheme::Dark => match self {
                StatusColor::Success => Color::Green,
                StatusColor::Error => Color::Red,
                StatusColor::Warning => Color::Yellow,
                StatusColor::Neutral => Color::DarkGray,
                StatusColor::Focus => Color::Cyan,
                StatusColor::Important => Color::Magenta,
            },
            ColorScheme::Light => match self {
                StatusColor::Success => Color::Rgb(0, 128, 0),
                StatusColor::Error => Color::Rgb(200, 0, 0),
                StatusColor::Warning => Color::Rgb(180, 120, 0),
                StatusColor::Neutral => Color::Gray,
                StatusColor::Focus => Color::Rgb(0, 128, 128),
                StatusColor::Important => Color::Rgb(128, 0, 128),
            },
        }
    }
}

/// Resolved colors for one scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub fg: Color,
    pub bg: Color,
    pub muted: Color,
    pub focus: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub important: Color,
}

impl Palette {
    pub fn new(scheme: ColorScheme) -> Self {
        let (fg, bg) = match scheme {
            ColorScheme::Dark => (Color::White, Color::Black),
            ColorScheme::Light => (Color::Black, Color::White),
        };
        Self {
            fg,
            bg,
            muted: StatusColor::Neutral.to_color(scheme),
            focus: StatusColor::Focus.to_color(scheme),
            success: StatusColor::Success.to_color(scheme),
            warning: StatusColor::Warning.to_color(scheme),
            error: StatusColor::Error.to_color(scheme),
            important: StatusColor::Important.to_color(scheme),
        }
    }

    /// Border color for focused/unfocused panes
    pub fn border(&self, focused: bool) -> Color {
        if focused {
            self.focus
        } else {
            self.muted
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::new(ColorScheme::default())
    }
}

/// Parse a `#rrggbb` (or `#rgb`) palette code into a terminal color
pub fn parse_hex_color(code: &str) -> Option<Color> {
    let hex = code.trim().strip_prefix('#')?;
    let expand = |c: u8| c * 16 + c;
    let digit = |c: char| c.to_digit(16).map(|d| d as u8);
    match hex.len() {
        6 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            Some(Color::Rgb(r, g, b))
        }
        3 => {
            let mut chars = hex.chars();
            let r = digit(chars.next()?)?;
            let g = digit(chars.next()?)?;
            let b = digit(chars.next()?)?;
            Some(Color::Rgb(expand(r), expand(g), expand(b)))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_follows_scheme() {
        let dark = Palette::new(ColorScheme::Dark);
        let light = Palette::new(ColorScheme::Light);
        assert_eq!(dark.fg, Color::White);
        assert_eq!(light.fg, Color::Black);
        assert_eq!(dark.border(true), Color::Cyan);
        assert_eq!(dark.border(false), Color::DarkGray);
    }

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#1E40AF"), Some(Color::Rgb(0x1e, 0x40, 0xaf)));
        assert_eq!(parse_hex_color("#fff"), Some(Color::Rgb(255, 255, 255)));
        assert_eq!(parse_hex_color("navy"), None);
        assert_eq!(parse_hex_color("#12345"), None);
    }
}
