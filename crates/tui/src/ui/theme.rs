use ratatui::style::Color;

/// The three selectable palettes, cycled at runtime with `t`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeKind {
    Light,
    Dark,
    Dim,
}

impl ThemeKind {
    pub fn parse(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "light" => Self::Light,
            "dim" => Self::Dim,
            _ => Self::Dark,
        }
    }

    pub fn next(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Dim,
            Self::Dim => Self::Light,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
            Self::Dim => "dim",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub background: Color,
    pub text: Color,
    pub dim: Color,
    pub border: Color,
    pub accent: Color,
    pub positive: Color,
    pub negative: Color,
    pub error: Color,
}

impl Theme {
    pub fn of(kind: ThemeKind) -> Self {
        match kind {
            ThemeKind::Dark => Self {
                background: Color::Rgb(8, 12, 16),
                text: Color::Rgb(220, 220, 220),
                dim: Color::Rgb(140, 140, 140),
                border: Color::Rgb(60, 70, 80),
                accent: Color::Rgb(80, 160, 160),
                positive: Color::Rgb(90, 180, 110),
                negative: Color::Rgb(210, 90, 90),
                error: Color::Rgb(200, 80, 80),
            },
            ThemeKind::Dim => Self {
                background: Color::Rgb(18, 22, 28),
                text: Color::Rgb(190, 195, 200),
                dim: Color::Rgb(110, 115, 120),
                border: Color::Rgb(50, 56, 64),
                accent: Color::Rgb(110, 140, 170),
                positive: Color::Rgb(110, 160, 120),
                negative: Color::Rgb(180, 100, 100),
                error: Color::Rgb(180, 90, 90),
            },
            ThemeKind::Light => Self {
                background: Color::Rgb(245, 245, 242),
                text: Color::Rgb(40, 40, 40),
                dim: Color::Rgb(120, 120, 120),
                border: Color::Rgb(180, 180, 175),
                accent: Color::Rgb(30, 110, 110),
                positive: Color::Rgb(30, 130, 60),
                negative: Color::Rgb(170, 50, 50),
                error: Color::Rgb(170, 40, 40),
            },
        }
    }
}
