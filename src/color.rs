use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// A theme color as written in the config: an ANSI-256 index or `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Ansi256(u8),
    Hex { r: u8, g: u8, b: u8 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorDepth {
    #[default]
    TrueColor,
    Color256,
    Color16,
}

#[derive(Debug, Error)]
#[error("invalid color value for field \"{field}\": \"{value}\"")]
pub struct ColorParseError {
    pub field: String,
    pub value: String,
}

impl Color {
    /// Parse `"0"`..`"255"`, `"#RRGGBB"` or `"#RGB"`; `field` names the
    /// config key in the error.
    pub fn parse(s: &str, field: &str) -> Result<Self, ColorParseError> {
        let err = || ColorParseError {
            field: field.to_owned(),
            value: s.to_owned(),
        };
        let s = s.trim();

        let Some(hex) = s.strip_prefix('#') else {
            return s.parse::<u8>().map(Color::Ansi256).map_err(|_| err());
        };
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(err());
        }
        let channel = |digits: &str| u8::from_str_radix(digits, 16).map_err(|_| err());
        match hex.len() {
            6 => Ok(Color::Hex {
                r: channel(&hex[0..2])?,
                g: channel(&hex[2..4])?,
                b: channel(&hex[4..6])?,
            }),
            3 => Ok(Color::Hex {
                r: channel(&hex[0..1])? * 17,
                g: channel(&hex[1..2])? * 17,
                b: channel(&hex[2..3])? * 17,
            }),
            _ => Err(err()),
        }
    }

    /// Convert for rendering at the terminal's color depth.
    ///
    /// Indices 0-15 map to the named colors so the terminal's own palette
    /// applies.
    pub fn to_crossterm_color(self, depth: ColorDepth) -> crossterm::style::Color {
        match (self, depth) {
            (Color::Ansi256(n), ColorDepth::TrueColor | ColorDepth::Color256) => named_or_indexed(n),
            (Color::Hex { r, g, b }, ColorDepth::TrueColor) => {
                crossterm::style::Color::Rgb { r, g, b }
            }
            (Color::Hex { r, g, b }, ColorDepth::Color256) => {
                crossterm::style::Color::AnsiValue(nearest_cube_index(r, g, b))
            }
            (color, ColorDepth::Color16) => {
                let (r, g, b) = color.rgb();
                named_or_indexed(nearest_basic_index(r, g, b))
            }
        }
    }

    fn rgb(self) -> (u8, u8, u8) {
        match self {
            Color::Hex { r, g, b } => (r, g, b),
            Color::Ansi256(n) if n < 16 => BASIC_PALETTE[usize::from(n)],
            Color::Ansi256(n) if n >= 232 => {
                let v = 8 + 10 * (n - 232);
                (v, v, v)
            }
            Color::Ansi256(n) => {
                let i = n - 16;
                let level = |c: u8| if c == 0 { 0 } else { 55 + 40 * c };
                (level(i / 36), level((i / 6) % 6), level(i % 6))
            }
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Ansi256(n) => write!(f, "{n}"),
            Color::Hex { r, g, b } => write!(f, "#{r:02x}{g:02x}{b:02x}"),
        }
    }
}

impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Color::parse(s, "<unknown>")
    }
}

impl ColorDepth {
    /// Detect terminal color depth from `COLORTERM` and `TERM`.
    pub fn detect() -> Self {
        if let Ok(ct) = std::env::var("COLORTERM")
            && (ct == "truecolor" || ct == "24bit")
        {
            return ColorDepth::TrueColor;
        }
        if let Ok(term) = std::env::var("TERM")
            && term.contains("256color")
        {
            return ColorDepth::Color256;
        }
        ColorDepth::Color16
    }
}

const BASIC_PALETTE: [(u8, u8, u8); 16] = [
    (0, 0, 0),
    (128, 0, 0),
    (0, 128, 0),
    (128, 128, 0),
    (0, 0, 128),
    (128, 0, 128),
    (0, 128, 128),
    (192, 192, 192),
    (128, 128, 128),
    (255, 0, 0),
    (0, 255, 0),
    (255, 255, 0),
    (0, 0, 255),
    (255, 0, 255),
    (0, 255, 255),
    (255, 255, 255),
];

fn named_or_indexed(n: u8) -> crossterm::style::Color {
    use crossterm::style::Color as C;
    const NAMED: [C; 16] = [
        C::Black,
        C::DarkRed,
        C::DarkGreen,
        C::DarkYellow,
        C::DarkBlue,
        C::DarkMagenta,
        C::DarkCyan,
        C::Grey,
        C::DarkGrey,
        C::Red,
        C::Green,
        C::Yellow,
        C::Blue,
        C::Magenta,
        C::Cyan,
        C::White,
    ];
    NAMED.get(usize::from(n)).copied().unwrap_or(C::AnsiValue(n))
}

/// Nearest of the 16 basic colors by squared RGB distance.
fn nearest_basic_index(r: u8, g: u8, b: u8) -> u8 {
    let dist = |(pr, pg, pb): (u8, u8, u8)| {
        let d = |x: u8, y: u8| (i32::from(x) - i32::from(y)).pow(2);
        d(r, pr) + d(g, pg) + d(b, pb)
    };
    let mut best = 0u8;
    for (i, &rgb) in BASIC_PALETTE.iter().enumerate() {
        if dist(rgb) < dist(BASIC_PALETTE[usize::from(best)]) {
            best = u8::try_from(i).unwrap_or(0);
        }
    }
    best
}

/// Nearest entry of the 6x6x6 cube or the grayscale ramp.
fn nearest_cube_index(r: u8, g: u8, b: u8) -> u8 {
    if r == g && g == b {
        return match r {
            0..8 => 16,
            249.. => 231,
            v => 232 + ((v - 8) / 10).min(23),
        };
    }
    let step = |v: u8| match v {
        0..48 => 0,
        48..115 => 1,
        v => ((v - 35) / 40).min(5),
    };
    16 + 36 * step(r) + 6 * step(g) + step(b)
}
