//! A collection of functions that produce ANSI control sequences used in the
//! rendering of highlighted text to a terminal.

use crate::color::Color;

pub fn reset() -> &'static str {
    "\x1b[0m"
}

pub fn clear_screen() -> &'static str {
    "\x1b[2J\x1b[H"
}

/// Sets the foreground to the 24-bit `color`.
pub fn set_fg(color: Color) -> String {
    format!("\x1b[38;2;{};{};{}m", color.r, color.g, color.b)
}
