//! Keystroke completion of closing tags and quotes in markup.

use crate::error::{Error, Result};
use crate::etc;
use crate::syntax::Mode;
use regex_lite::Regex;

/// Tags that never require a closing tag.
pub const SELF_CLOSING: [&str; 15] = [
    "area", "base", "br", "col", "embed", "hr", "img", "input", "keygen", "link", "meta", "param",
    "source", "track", "wbr",
];

/// The outcome of a keystroke presented to a [`Completer`].
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum Completion {
    /// The host proceeds with its default handling of the keystroke.
    Default,

    /// The keystroke is consumed without inserting anything.
    Suppress,

    /// The keystroke is consumed and `text` is inserted at the cursor, after which
    /// the cursor is placed `cursor` characters into `text`.
    Insert { text: String, cursor: usize },
}

impl Completion {
    fn insert(text: &str, cursor: usize) -> Completion {
        Completion::Insert {
            text: text.to_string(),
            cursor,
        }
    }

    /// Returns `true` if the host must not perform its default handling.
    pub fn suppress_default(&self) -> bool {
        !matches!(self, Completion::Default)
    }
}

pub struct Completer {
    enabled: bool,
    read_only: bool,
    open_re: Regex,
    close_re: Regex,
}

impl Completer {
    const OPEN_TAG: &str = r"<(\w+)(\s*[^>]*)?>";
    const CLOSE_TAG: &str = r"</(\w+)>";

    pub fn new(enabled: bool, read_only: bool) -> Result<Completer> {
        let compile = |p: &str| Regex::new(p).map_err(|e| Error::invalid_regex(p, &e));
        Ok(Completer {
            enabled,
            read_only,
            open_re: compile(Self::OPEN_TAG)?,
            close_re: compile(Self::CLOSE_TAG)?,
        })
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    /// Handles keystroke `c` typed at character position `cursor` of `text` in a
    /// document of the given `mode`.
    pub fn on_key(&self, mode: Mode, c: char, text: &str, cursor: usize) -> Completion {
        if !self.enabled || mode != Mode::Markup || !matches!(c, '>' | '"') {
            Completion::Default
        } else if self.read_only {
            Completion::Suppress
        } else {
            match etc::line_prefix(text, cursor) {
                Some(prefix) => self.complete(c, prefix),
                None => Completion::Suppress,
            }
        }
    }

    /// Handles keystroke `c` given the text from the start of the current line up
    /// to the cursor.
    pub fn complete(&self, c: char, prefix: &str) -> Completion {
        match c {
            '>' => match self.unclosed_tag(prefix) {
                Some(tag) => Completion::insert(&format!("</{tag}>"), 0),
                // The typed `>` is consumed even though nothing replaces it.
                None => Completion::Suppress,
            },
            '"' if prefix.ends_with('"') => Completion::insert("\"", 0),
            '"' => Completion::insert("\"", 1),
            _ => Completion::Default,
        }
    }

    /// Returns the most recently opened tag on `prefix` that is opened more often
    /// than it is closed, excluding self-closing tags.
    pub fn unclosed_tag<'a>(&self, prefix: &'a str) -> Option<&'a str> {
        let opened = Self::names(&self.open_re, prefix);
        let closed = Self::names(&self.close_re, prefix);
        let count = |tags: &[&str], tag: &str| tags.iter().filter(|t| **t == tag).count();
        opened.iter().rev().copied().find(|tag| {
            !SELF_CLOSING.contains(tag) && count(&opened, tag) > count(&closed, tag)
        })
    }

    fn names<'a>(re: &Regex, text: &'a str) -> Vec<&'a str> {
        re.captures_iter(text)
            .filter_map(|cap| cap.get(1))
            .map(|m| m.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn insert(text: &str, cursor: usize) -> Completion {
        Completion::insert(text, cursor)
    }

    #[test]
    fn nearest_unclosed_tag() {
        let c = Completer::new(true, false).unwrap();
        assert_eq!(c.complete('>', "<div><span>text"), insert("</span>", 0));
        assert_eq!(c.complete('>', "<div><span>text</span>"), insert("</div>", 0));
        assert_eq!(c.unclosed_tag("<p class=\"x\">a<b>b</b>"), Some("p"));
        assert_eq!(c.unclosed_tag("<li><li>x</li>"), Some("li"));
    }

    #[test]
    fn self_closing_tags() {
        let c = Completer::new(true, false).unwrap();
        assert_eq!(c.unclosed_tag("<img src=\"x.png\""), None);
        assert_eq!(c.unclosed_tag("<br><img src=\"x.png\">"), None);
        assert_eq!(c.unclosed_tag("<div><br>"), Some("div"));
        assert!(!matches!(
            c.complete('>', "<img src=\"x.png\""),
            Completion::Insert { .. }
        ));
    }

    #[test]
    fn unmatched_close_swallows_key() {
        // Without an unclosed tag the keystroke is still consumed.
        let c = Completer::new(true, false).unwrap();
        assert_eq!(c.complete('>', "<div></div>"), Completion::Suppress);
        assert_eq!(c.complete('>', "plain"), Completion::Suppress);
        assert!(Completion::Suppress.suppress_default());
    }

    #[test]
    fn quote_pairing() {
        let c = Completer::new(true, false).unwrap();
        assert_eq!(c.complete('"', "<a href=\""), insert("\"", 0));
        assert_eq!(c.complete('"', "<a href="), insert("\"", 1));
        assert_eq!(c.complete('"', ""), insert("\"", 1));
    }

    #[test]
    fn only_current_line() {
        let c = Completer::new(true, false).unwrap();
        let text = "<div>\n<span>x";
        assert_eq!(c.on_key(Mode::Markup, '>', text, 13), insert("</span>", 0));
        assert_eq!(c.on_key(Mode::Markup, '>', text, 5), insert("</div>", 0));
        assert_eq!(c.on_key(Mode::Markup, '>', text, 6), Completion::Suppress);
    }

    #[test]
    fn inactive() {
        let mut c = Completer::new(false, false).unwrap();
        assert_eq!(c.on_key(Mode::Markup, '>', "<div>", 5), Completion::Default);
        assert_eq!(c.on_key(Mode::Markup, '"', "\"", 1), Completion::Default);
        assert!(!Completion::Default.suppress_default());

        c.set_enabled(true);
        assert_eq!(c.on_key(Mode::Code, '>', "<div>", 5), Completion::Default);
        assert_eq!(c.on_key(Mode::Markdown, '"', "\"", 1), Completion::Default);
        assert_eq!(c.on_key(Mode::Markup, 'a', "<div>", 5), Completion::Default);
    }

    #[test]
    fn read_only_never_inserts() {
        let mut c = Completer::new(true, true).unwrap();
        assert_eq!(c.on_key(Mode::Markup, '>', "<div>", 5), Completion::Suppress);
        assert_eq!(c.on_key(Mode::Markup, '"', "\"", 1), Completion::Suppress);
        c.set_read_only(false);
        assert_eq!(c.on_key(Mode::Markup, '"', "\"", 1), insert("\"", 0));
    }

    #[test]
    fn cursor_beyond_end() {
        let c = Completer::new(true, false).unwrap();
        assert_eq!(c.on_key(Mode::Markup, '>', "<div>", 6), Completion::Suppress);
        assert_eq!(c.on_key(Mode::Markup, '"', "x", 9), Completion::Suppress);
    }
}
