use std::fmt;

use crossterm::style::Color;
use serde::{Deserialize, Serialize};

/// Light or dark color scheme, persisted independently of the list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemePreference {
    #[default]
    Light,
    Dark,
}

impl ThemePreference {
    pub fn as_str(self) -> &'static str {
        match self {
            ThemePreference::Light => "light",
            ThemePreference::Dark => "dark",
        }
    }

    /// Parse a persisted value. Accepts the bare word or a JSON string.
    pub fn parse_persisted(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        let word = raw
            .strip_prefix('"')
            .and_then(|s| s.strip_suffix('"'))
            .unwrap_or(raw);
        match word {
            "light" => Some(ThemePreference::Light),
            "dark" => Some(ThemePreference::Dark),
            _ => None,
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            ThemePreference::Light => ThemePreference::Dark,
            ThemePreference::Dark => ThemePreference::Light,
        }
    }

    pub fn palette(self) -> Palette {
        match self {
            ThemePreference::Light => Palette::light(),
            ThemePreference::Dark => Palette::dark(),
        }
    }
}

impl fmt::Display for ThemePreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Colors used when rendering a list under a given theme
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    pub text: Color,
    pub background: Color,
    pub icon: Color,
    pub button: Color,
    pub delete_button: Color,
    /// Completed items are drawn in this color
    pub done: Color,
}

impl Palette {
    pub fn light() -> Self {
        Palette {
            text: Color::Black,
            background: parse_hex_color("#ffffff").unwrap_or(Color::White),
            icon: Color::Black,
            button: Color::Rgb {
                r: 0x41,
                g: 0x69,
                b: 0xE1,
            },
            delete_button: Color::Black,
            done: Color::Grey,
        }
    }

    pub fn dark() -> Self {
        Palette {
            text: Color::White,
            background: parse_hex_color("#000000").unwrap_or(Color::Black),
            icon: Color::Red,
            button: Color::White,
            delete_button: parse_hex_color("#ff3b3b").unwrap_or(Color::Red),
            done: Color::Grey,
        }
    }
}

/// Parse a hex color string like "#FF4444" into an RGB Color
fn parse_hex_color(hex: &str) -> Option<Color> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(Color::Rgb { r, g, b })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_bare_and_quoted() {
        assert_eq!(
            ThemePreference::parse_persisted("dark"),
            Some(ThemePreference::Dark)
        );
        assert_eq!(
            ThemePreference::parse_persisted("\"light\"\n"),
            Some(ThemePreference::Light)
        );
        assert_eq!(ThemePreference::parse_persisted("blue"), None);
        assert_eq!(ThemePreference::parse_persisted(""), None);
    }

    #[test]
    fn toggle_flips() {
        assert_eq!(ThemePreference::Light.toggle(), ThemePreference::Dark);
        assert_eq!(ThemePreference::Dark.toggle().toggle(), ThemePreference::Dark);
    }

    #[test]
    fn dark_palette_delete_color() {
        assert_eq!(
            ThemePreference::Dark.palette().delete_button,
            Color::Rgb {
                r: 0xFF,
                g: 0x3B,
                b: 0x3B
            }
        );
    }

    #[test]
    fn parse_hex_rejects_short() {
        assert_eq!(parse_hex_color("#fff"), None);
        assert_eq!(parse_hex_color("ffffff"), None);
    }
}
