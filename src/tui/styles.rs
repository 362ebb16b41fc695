//! TUI color theme

use ratatui::style::Color;

pub struct Theme {
    pub accent: Color,
    pub text: Color,
    pub dimmed: Color,
    pub error: Color,
    pub ok: Color,
    pub warn: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            accent: Color::Cyan,
            text: Color::Reset,
            dimmed: Color::DarkGray,
            error: Color::Red,
            ok: Color::Green,
            warn: Color::Yellow,
        }
    }
}
