//! Text colors.
//!
//! Colors are 24-bit RGB values written as `#rrggbb` in configuration files. A color
//! may also be referenced by name, where names are resolved through [`Colors`].

use std::collections::HashMap;
use std::fmt::{self, Display, Formatter};

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0x000000);
    pub const WHITE: Color = Color::rgb(0xffffff);

    pub const fn new(r: u8, g: u8, b: u8) -> Color {
        Color { r, g, b }
    }

    /// Returns the color packed as `0xrrggbb`.
    pub const fn rgb(value: u32) -> Color {
        Color {
            r: (value >> 16) as u8,
            g: (value >> 8) as u8,
            b: value as u8,
        }
    }

    /// Parses `#rrggbb`, returning `None` for any other form.
    pub fn parse(value: &str) -> Option<Color> {
        let hex = value.strip_prefix('#')?;
        if hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit()) {
            u32::from_str_radix(hex, 16).ok().map(Color::rgb)
        } else {
            None
        }
    }
}

impl Default for Color {
    fn default() -> Color {
        Color::WHITE
    }
}

impl Display for Color {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// A map of color names to colors.
pub struct Colors {
    color_map: HashMap<String, Color>,
}

impl Colors {
    const COLORS: [(&'static str, Color); 10] = [
        ("black", Color::BLACK),
        ("white", Color::WHITE),
        ("red", Color::rgb(0xff0000)),
        ("green", Color::rgb(0x008000)),
        ("lime", Color::rgb(0x00ff00)),
        ("blue", Color::rgb(0x0000ff)),
        ("yellow", Color::rgb(0xffcc00)),
        ("orange", Color::rgb(0xff9933)),
        ("pink", Color::rgb(0xff00ff)),
        ("gray", Color::rgb(0x666666)),
    ];

    /// Adds or replaces names in `colors`, whose values are either `#rrggbb` or the
    /// name of a color already known, returning the first value that resolves to
    /// neither.
    pub fn apply(&mut self, colors: &HashMap<String, String>) -> Result<(), String> {
        // Literal values are applied first so that a custom name may refer to a custom
        // literal regardless of table order.
        let (literal, named): (Vec<_>, Vec<_>) =
            colors.iter().partition(|(_, value)| value.starts_with('#'));
        for (name, value) in literal.into_iter().chain(named) {
            match self.lookup_value(value) {
                Some(color) => {
                    self.color_map.insert(name.to_string(), color);
                }
                None => return Err(value.to_string()),
            }
        }
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Option<Color> {
        self.color_map.get(name).copied()
    }

    /// Resolves `value` as either a `#rrggbb` literal or a color name.
    pub fn lookup_value(&self, value: &str) -> Option<Color> {
        if value.starts_with('#') {
            Color::parse(value)
        } else {
            self.lookup(value)
        }
    }
}

impl Default for Colors {
    fn default() -> Colors {
        Colors {
            color_map: Self::COLORS
                .iter()
                .map(|(name, color)| (name.to_string(), *color))
                .collect(),
        }
    }
}
