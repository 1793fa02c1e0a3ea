use crate::color::Color;
use crate::config::types::Theme;

/// Detected terminal background.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Background {
    Dark,
    Light,
}

impl Background {
    /// Heuristic: check `COLORFGBG` (format "fg;bg"), fall back to dark.
    pub fn detect() -> Self {
        if let Ok(val) = std::env::var("COLORFGBG")
            && let Some(bg) = val.rsplit(';').next()
            && let Ok(n) = bg.parse::<u8>()
            && n > 6
            && n != 8
        {
            return Background::Light;
        }
        Background::Dark
    }
}

/// Every color slot the dashboard paints, filled from config or defaults.
#[derive(Debug, Clone)]
pub struct ResolvedTheme {
    pub text_primary: Color,
    pub text_secondary: Color,
    pub text_faint: Color,
    pub text_warning: Color,
    pub text_success: Color,
    pub text_error: Color,
    pub bg_selected: Color,
    pub bg_row_warning: Color,
    pub bg_row_alert: Color,
    pub border_primary: Color,
    pub border_faint: Color,
    pub show_separator: bool,
}

impl ResolvedTheme {
    pub fn resolve(theme: &Theme, bg: Background) -> Self {
        let d = Self::defaults(bg);
        let c = &theme.colors;
        Self {
            text_primary: c.text.primary.unwrap_or(d.text_primary),
            text_secondary: c.text.secondary.unwrap_or(d.text_secondary),
            text_faint: c.text.faint.unwrap_or(d.text_faint),
            text_warning: c.text.warning.unwrap_or(d.text_warning),
            text_success: c.text.success.unwrap_or(d.text_success),
            text_error: c.text.error.unwrap_or(d.text_error),
            bg_selected: c.background.selected.unwrap_or(d.bg_selected),
            bg_row_warning: c.background.row_warning.unwrap_or(d.bg_row_warning),
            bg_row_alert: c.background.row_alert.unwrap_or(d.bg_row_alert),
            border_primary: c.border.primary.unwrap_or(d.border_primary),
            border_faint: c.border.faint.unwrap_or(d.border_faint),
            show_separator: theme.table.show_separator,
        }
    }

    fn defaults(bg: Background) -> Self {
        match bg {
            Background::Dark => Self {
                text_primary: Color::Ansi256(7),
                text_secondary: Color::Ansi256(245),
                text_faint: Color::Ansi256(243),
                text_warning: Color::Ansi256(11),
                text_success: Color::Ansi256(10),
                text_error: Color::Ansi256(9),
                bg_selected: Color::Ansi256(237),
                bg_row_warning: Color::Ansi256(58),
                bg_row_alert: Color::Ansi256(52),
                border_primary: Color::Ansi256(244),
                border_faint: Color::Ansi256(241),
                show_separator: true,
            },
            Background::Light => Self {
                text_primary: Color::Ansi256(0),
                text_secondary: Color::Ansi256(240),
                text_faint: Color::Ansi256(248),
                text_warning: Color::Ansi256(3),
                text_success: Color::Ansi256(2),
                text_error: Color::Ansi256(1),
                bg_selected: Color::Ansi256(254),
                bg_row_warning: Color::Ansi256(229),
                bg_row_alert: Color::Ansi256(224),
                border_primary: Color::Ansi256(240),
                border_faint: Color::Ansi256(252),
                show_separator: true,
            },
        }
    }
}
