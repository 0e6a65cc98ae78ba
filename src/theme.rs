//! Color theme.
//!
//! An [`Appearance`] selects one of the built-in palettes, which maps every
//! [`Class`] to a [`Color`]. A [`Theme`] is a palette with optional per-class
//! overrides applied from configuration. Themes never influence which spans are
//! computed, only how they are colored.

use crate::class::Class;
use crate::color::Color;
use crate::error::{Error, Result};
use std::collections::HashMap;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum Appearance {
    #[default]
    Dark,
    Light,
    HighContrast,
    BlackWhite,
}

impl Appearance {
    pub const ALL: [Appearance; 4] = [
        Appearance::Dark,
        Appearance::Light,
        Appearance::HighContrast,
        Appearance::BlackWhite,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Appearance::Dark => "dark",
            Appearance::Light => "light",
            Appearance::HighContrast => "high_contrast",
            Appearance::BlackWhite => "black_white",
        }
    }

    /// Returns the built-in color for `class` under this appearance.
    pub fn color(&self, class: Class) -> Color {
        match self {
            Appearance::Dark => dark(class),
            Appearance::Light => light(class),
            Appearance::HighContrast => high_contrast(class),
            Appearance::BlackWhite => black_white(class),
        }
    }
}

impl FromStr for Appearance {
    type Err = Error;

    fn from_str(name: &str) -> Result<Appearance> {
        Appearance::ALL
            .iter()
            .find(|a| a.name() == name)
            .copied()
            .ok_or_else(|| Error::invalid_theme(name))
    }
}

impl Display for Appearance {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Clone, Debug, Default)]
pub struct Theme {
    appearance: Appearance,
    overrides: HashMap<Class, Color>,
}

impl Theme {
    pub fn new(appearance: Appearance) -> Theme {
        Theme {
            appearance,
            overrides: HashMap::new(),
        }
    }

    pub fn appearance(&self) -> Appearance {
        self.appearance
    }

    /// Replaces the color of `class`, regardless of appearance.
    pub fn set(&mut self, class: Class, color: Color) {
        self.overrides.insert(class, color);
    }

    pub fn color(&self, class: Class) -> Color {
        self.overrides
            .get(&class)
            .copied()
            .unwrap_or_else(|| self.appearance.color(class))
    }
}

fn dark(class: Class) -> Color {
    match class {
        Class::Keyword => Color::rgb(0x569cd6),
        Class::Comment => Color::rgb(0x608b4e),
        Class::StringLiteral => Color::rgb(0xff9933),
        Class::FunctionCall => Color::rgb(0xffcc00),
        Class::Variable => Color::rgb(0x66cccc),
        Class::Number => Color::rgb(0xffcc00),
        Class::Brace => Color::rgb(0xd4d4d4),
        Class::Builtin => Color::rgb(0x9a6cd9),
        Class::HtmlTag => Color::rgb(0x66e0ff),
        Class::HtmlAttribute => Color::rgb(0x9cdcfe),
        Class::HtmlComment | Class::JsComment => Color::rgb(0x009900),
        Class::CssClass => Color::rgb(0xff00ff),
        Class::CssProperty => Color::rgb(0x00ffaa),
        Class::JsKeyword => Color::rgb(0xff0066),
        Class::JsBuiltin => Color::rgb(0x4ec9b0),
        Class::JsDomCall => Color::rgb(0xdcdcaa),
        Class::JsVariable => Color::rgb(0x00ff00),
        Class::PxValue => Color::rgb(0xffcc00),
        Class::Operator => Color::rgb(0xd4d4d4),
        Class::MarkdownHeader => Color::rgb(0xffcc00),
        Class::MarkdownBold => Color::rgb(0xff00ff),
        Class::MarkdownItalic => Color::rgb(0x00ffaa),
        Class::MarkdownLink => Color::rgb(0x00ff00),
        Class::MarkdownListItem => Color::rgb(0x339933),
    }
}

fn light(class: Class) -> Color {
    match class {
        Class::Keyword | Class::JsKeyword => Color::rgb(0xff0000),
        Class::Comment | Class::HtmlComment | Class::JsComment => Color::rgb(0x008000),
        Class::StringLiteral => Color::rgb(0xcc6600),
        Class::FunctionCall => Color::rgb(0xff8c00),
        Class::Variable | Class::JsVariable => Color::rgb(0x0000ff),
        Class::Number | Class::PxValue => Color::rgb(0x0000ff),
        Class::Brace | Class::Operator => Color::rgb(0x333333),
        Class::Builtin | Class::JsBuiltin => Color::rgb(0x800080),
        Class::HtmlTag | Class::CssProperty => Color::rgb(0x003399),
        Class::HtmlAttribute => Color::rgb(0x7f0055),
        Class::CssClass => Color::rgb(0x800080),
        Class::JsDomCall => Color::rgb(0x795e26),
        Class::MarkdownHeader => Color::rgb(0xff6600),
        Class::MarkdownBold => Color::rgb(0xff00ff),
        Class::MarkdownItalic => Color::rgb(0x006666),
        Class::MarkdownLink => Color::rgb(0xe60073),
        Class::MarkdownListItem => Color::rgb(0x339933),
    }
}

fn high_contrast(class: Class) -> Color {
    match class {
        Class::CssClass => Color::rgb(0xff3399),
        class => dark(class),
    }
}

fn black_white(class: Class) -> Color {
    match class {
        Class::Comment | Class::HtmlComment | Class::JsComment => Color::BLACK,
        Class::StringLiteral | Class::Number | Class::PxValue => Color::BLACK,
        Class::MarkdownHeader
        | Class::MarkdownBold
        | Class::MarkdownItalic
        | Class::MarkdownLink
        | Class::MarkdownListItem => Color::rgb(0x737373),
        _ => Color::rgb(0x666666),
    }
}
