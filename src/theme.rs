use ratatui::style::Color;

/// Display theme, persisted as `"light"` or `"dark"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn palette(self) -> Palette {
        match self {
            Theme::Light => Palette {
                text: Color::Black,
                muted: Color::DarkGray,
                accent: Color::Blue,
                done: Color::Green,
                warning: Color::Yellow,
                danger: Color::Red,
            },
            Theme::Dark => Palette {
                text: Color::White,
                muted: Color::Gray,
                accent: Color::Cyan,
                done: Color::LightGreen,
                warning: Color::LightYellow,
                danger: Color::LightRed,
            },
        }
    }
}

/// Colors the UI draws with for the active theme.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub text: Color,
    pub muted: Color,
    pub accent: Color,
    pub done: Color,
    pub warning: Color,
    pub danger: Color,
}
