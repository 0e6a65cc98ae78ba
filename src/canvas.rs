//! An in-memory rendering surface.
//!
//! [`Canvas`] holds a document along with the markers and colors applied to it by a
//! [`Scheduler`](crate::schedule::Scheduler), and renders the result either as
//! colored terminal output or as a listing of spans.

use crate::ansi;
use crate::class::Class;
use crate::color::Color;
use crate::pos::{LineIndex, Point};
use crate::schedule::Host;
use crate::syntax::Mode;
use std::collections::HashMap;
use std::fmt::Write;

/// A character and the color in which it is rendered, if any.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct Cell {
    pub value: char,
    pub color: Option<Color>,
}

impl Cell {
    pub fn new(value: char, color: Option<Color>) -> Cell {
        Cell { value, color }
    }
}

#[derive(Debug)]
pub struct Canvas {
    text: String,
    revision: u64,
    mode: Mode,

    /// Markers in order of application.
    markers: Vec<(Class, Point, Point)>,

    colors: HashMap<Class, Color>,
}

impl Canvas {
    pub fn new(mode: Mode, text: &str) -> Canvas {
        Canvas {
            text: text.to_string(),
            revision: 1,
            mode,
            markers: Vec::new(),
            colors: HashMap::new(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replaces the document, advancing the revision only if `text` differs.
    pub fn set_text(&mut self, text: &str) -> bool {
        if text != self.text {
            self.text = text.to_string();
            self.revision += 1;
            true
        } else {
            false
        }
    }

    pub fn markers(&self) -> &[(Class, Point, Point)] {
        &self.markers
    }

    /// Returns every character of the document with its rendered color, where
    /// later markers take precedence over earlier ones.
    pub fn cells(&self) -> Vec<Cell> {
        let index = LineIndex::new(&self.text);
        let mut classes = vec![None; index.chars()];
        for (class, start, end) in &self.markers {
            let (start, end) = (index.pos(*start), index.pos(*end));
            for c in classes.iter_mut().take(end).skip(start) {
                *c = Some(*class);
            }
        }
        self.text
            .chars()
            .zip(classes)
            .map(|(value, class)| {
                Cell::new(value, class.and_then(|c| self.colors.get(&c).copied()))
            })
            .collect()
    }

    /// Renders the document with 24-bit ANSI foreground colors.
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(self.text.len() * 2);
        let mut current = None;
        for cell in self.cells() {
            // Color is reset at line ends so that pagers never carry it across lines.
            if cell.value == '\n' && current.is_some() {
                out.push_str(ansi::reset());
                current = None;
            } else if cell.value != '\n' && cell.color != current {
                match cell.color {
                    Some(color) => out.push_str(&ansi::set_fg(color)),
                    None => out.push_str(ansi::reset()),
                }
                current = cell.color;
            }
            out.push(cell.value);
        }
        if current.is_some() {
            out.push_str(ansi::reset());
        }
        out
    }

    /// Returns one line per marker formatted as `class line:col-line:col text`, where
    /// lines and columns are `1`-based.
    pub fn spans(&self) -> String {
        let index = LineIndex::new(&self.text);
        let chars = self.text.chars().collect::<Vec<_>>();
        let mut out = String::new();
        for (class, start, end) in &self.markers {
            let span = chars[index.pos(*start)..index.pos(*end)]
                .iter()
                .collect::<String>();
            let _ = writeln!(
                out,
                "{class} {}:{}-{}:{} {span:?}",
                start.line + 1,
                start.col + 1,
                end.line + 1,
                end.col + 1
            );
        }
        out
    }
}

impl Host for Canvas {
    fn text(&self) -> String {
        self.text.clone()
    }

    fn revision(&self) -> u64 {
        self.revision
    }

    fn mode(&self) -> Mode {
        self.mode
    }

    fn clear_markers(&mut self, class: Class) {
        self.markers.retain(|(c, _, _)| *c != class);
    }

    fn apply_marker(&mut self, class: Class, start: Point, end: Point) {
        self.markers.push((class, start, end));
    }

    fn set_color(&mut self, class: Class, color: Color) {
        self.colors.insert(class, color);
    }
}
