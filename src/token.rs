//! Tokenization for syntax coloring.
//!
//! A [`Tokenizer`] applies the rules of a [`Syntax`] to a snapshot of text and
//! produces [`Tokens`], the complete set of classified spans for that snapshot. It
//! retains nothing between calls, so tokenizing the same text twice always yields
//! the same markers in the same order.
//!
//! Occurrences of declared names are found in a single pass over all words of the
//! text with a set lookup per word, which bounds that step at O(text length)
//! regardless of how many names are declared.

use crate::class::Class;
use crate::pos::{LineIndex, Point};
use crate::syntax::{Guard, Kind, Rule, Scope, Strategy, Syntax};
use std::collections::HashMap;
use std::ops::Range;
use std::time::{Duration, Instant};

/// A means of classifying a snapshot of text.
pub struct Tokenizer<'a> {
    /// The syntax configuration that drives tokenization.
    syntax: &'a Syntax,

    /// The execution budget of a single call to [`tokenize`](Self::tokenize), or
    /// `None` if unbounded.
    budget: Option<Duration>,
}

/// A classified span of text.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Marker {
    pub class: Class,

    /// The half-open range of character positions.
    pub range: Range<usize>,

    /// The point corresponding to the start of [`range`](Self::range).
    pub start: Point,

    /// The point corresponding to the end of [`range`](Self::range).
    pub end: Point,
}

/// The result of tokenizing a snapshot.
#[derive(Clone, Debug, Default)]
pub struct Tokens {
    /// Markers in order of application, hence later markers take precedence over
    /// earlier ones where they overlap.
    markers: Vec<Marker>,

    /// The number of rules whose contribution was dropped because the budget was
    /// exhausted.
    degraded: usize,
}

/// A slice of the snapshot evaluated as a whole, along with its byte offset in the
/// snapshot.
struct Unit<'a> {
    text: &'a str,
    offset: usize,
}

impl Tokens {
    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn degraded(&self) -> usize {
        self.degraded
    }
}

impl<'a> Tokenizer<'a> {
    /// Number of matches evaluated between checks of the budget.
    const BUDGET_STRIDE: usize = 256;

    /// Creates a new tokenizer using the `syntax` configuration.
    pub fn new(syntax: &'a Syntax) -> Tokenizer<'a> {
        Tokenizer {
            syntax,
            budget: None,
        }
    }

    pub fn with_budget(self, budget: Option<Duration>) -> Tokenizer<'a> {
        Tokenizer { budget, ..self }
    }

    /// Tokenizes `text`.
    ///
    /// If the budget is exhausted, the rule being evaluated at that moment and all
    /// remaining rules contribute nothing, and the count of such rules is reported
    /// by [`Tokens::degraded`].
    pub fn tokenize(&self, text: &str) -> Tokens {
        let deadline = self.budget.map(|budget| Instant::now() + budget);
        let index = LineIndex::new(text);
        let units = self.units(text);
        let mut tokens = Tokens::default();

        let rules = self.syntax.rules();
        for (n, rule) in rules.iter().enumerate() {
            let mark = tokens.markers.len();
            let done = match rule.kind {
                Kind::Match => self.apply(rule, &units, &index, deadline, &mut tokens.markers),
                Kind::Declare(scope) => {
                    let names = Self::declare(rule, &units);
                    self.occur(rule, scope, &names, &units, &index, deadline, &mut tokens.markers)
                }
            };
            if !done {
                tokens.markers.truncate(mark);
                tokens.degraded = rules.len() - n;
                tracing::warn!(
                    mode = %self.syntax.mode,
                    class = %rule.class,
                    skipped = tokens.degraded,
                    "highlighting budget exhausted"
                );
                break;
            }
        }
        tokens
    }

    fn units<'t>(&self, text: &'t str) -> Vec<Unit<'t>> {
        match self.syntax.mode.strategy() {
            Strategy::WholeBuffer => vec![Unit { text, offset: 0 }],
            Strategy::PerLine => {
                let mut offset = 0;
                text.split('\n')
                    .map(|line| {
                        let unit = Unit { text: line, offset };
                        offset += line.len() + 1;
                        unit
                    })
                    .collect()
            }
        }
    }

    /// Adds a marker for every admissible match of `rule`, returning `false` if the
    /// deadline passed before all matches were evaluated.
    fn apply(
        &self,
        rule: &Rule,
        units: &[Unit],
        index: &LineIndex,
        deadline: Option<Instant>,
        markers: &mut Vec<Marker>,
    ) -> bool {
        let mut count = 0;
        for unit in units {
            for cap in rule.re.captures_iter(unit.text) {
                if Self::expired(deadline, &mut count) {
                    return false;
                }
                if let Some(m) = cap.get(rule.group) {
                    if admits(rule.guard, unit.text, m.start(), m.end()) {
                        push(markers, rule.class, index, unit.offset + m.start(), unit.offset + m.end());
                    }
                }
            }
        }
        !Self::past(deadline)
    }

    /// Returns the names declared by `rule`, each with the snapshot byte offset of
    /// its first declaration.
    fn declare<'t>(rule: &Rule, units: &[Unit<'t>]) -> HashMap<&'t str, usize> {
        let mut names = HashMap::new();
        for unit in units {
            for cap in rule.re.captures_iter(unit.text) {
                if let Some(m) = cap.get(rule.group) {
                    names.entry(m.as_str()).or_insert(unit.offset + m.start());
                }
            }
        }
        names
    }

    /// Adds a marker for every occurrence of `names` within `scope`.
    #[allow(clippy::too_many_arguments)]
    fn occur(
        &self,
        rule: &Rule,
        scope: Scope,
        names: &HashMap<&str, usize>,
        units: &[Unit],
        index: &LineIndex,
        deadline: Option<Instant>,
        markers: &mut Vec<Marker>,
    ) -> bool {
        if names.is_empty() {
            return !Self::past(deadline);
        }
        let mut count = 0;
        for unit in units {
            for m in self.syntax.word_re().find_iter(unit.text) {
                if Self::expired(deadline, &mut count) {
                    return false;
                }
                let start = unit.offset + m.start();
                let in_scope = match (scope, names.get(m.as_str())) {
                    (_, None) => false,
                    (Scope::Anywhere, Some(_)) => true,
                    (Scope::AfterDeclaration, Some(&declared)) => start >= declared,
                };
                if in_scope && admits(rule.guard, unit.text, m.start(), m.end()) {
                    push(markers, rule.class, index, start, unit.offset + m.end());
                }
            }
        }
        !Self::past(deadline)
    }

    /// Counts one evaluated match and checks the deadline at every stride.
    #[inline(always)]
    fn expired(deadline: Option<Instant>, count: &mut usize) -> bool {
        *count += 1;
        *count % Self::BUDGET_STRIDE == 0 && Self::past(deadline)
    }

    #[inline(always)]
    fn past(deadline: Option<Instant>) -> bool {
        deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }
}

fn admits(guard: Option<Guard>, text: &str, start: usize, end: usize) -> bool {
    guard.is_none_or(|guard| guard.admits(text, start, end))
}

/// Adds a marker spanning the snapshot byte range `start..end`, unless empty.
fn push(markers: &mut Vec<Marker>, class: Class, index: &LineIndex, start: usize, end: usize) {
    if start < end {
        let (start_pos, start) = index.locate(start);
        let (end_pos, end) = index.locate(end);
        markers.push(Marker {
            class,
            range: start_pos..end_pos,
            start,
            end,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::{Library, Mode};
    use std::collections::HashSet;

    fn tokenize(mode: Mode, text: &str) -> Tokens {
        let library = Library::new().unwrap();
        Tokenizer::new(library.find(mode)).tokenize(text)
    }

    /// Returns the text covered by every marker of `class`.
    fn texts(tokens: &Tokens, class: Class, text: &str) -> Vec<String> {
        let chars = text.chars().collect::<Vec<_>>();
        tokens
            .markers()
            .iter()
            .filter(|m| m.class == class)
            .map(|m| chars[m.range.clone()].iter().collect())
            .collect()
    }

    /// Returns the classification of each character position of `text`, resolving
    /// overlaps in favor of later markers.
    fn paint(tokens: &Tokens, text: &str) -> Vec<Option<Class>> {
        let mut classes = vec![None; text.chars().count()];
        for m in tokens.markers() {
            classes[m.range.clone()].fill(Some(m.class));
        }
        classes
    }

    #[test]
    fn no_constructs() {
        for mode in Mode::ALL {
            let tokens = tokenize(mode, "hello world\nplain text");
            assert!(tokens.is_empty(), "{mode}: {:?}", tokens.markers());
        }
        assert!(tokenize(Mode::Markup, "").is_empty());
    }

    #[test]
    fn idempotent() {
        const TEXT: &str = "<div class=\"a\">\n<script>let n = 1; n += 2;</script>";
        let a = tokenize(Mode::Markup, TEXT);
        let b = tokenize(Mode::Markup, TEXT);
        assert_eq!(a.markers(), b.markers());
    }

    #[test]
    fn code_variables_calls_numbers() {
        const TEXT: &str = "x = 5\nprint(x)";
        let tokens = tokenize(Mode::Code, TEXT);
        assert_eq!(texts(&tokens, Class::Variable, TEXT), ["x", "x"]);
        assert_eq!(texts(&tokens, Class::FunctionCall, TEXT), ["print"]);
        assert_eq!(texts(&tokens, Class::Number, TEXT), ["5"]);

        let vars = tokens
            .markers()
            .iter()
            .filter(|m| m.class == Class::Variable)
            .map(|m| (m.start, m.end))
            .collect::<Vec<_>>();
        assert_eq!(
            vars,
            [
                (Point::new(0, 0), Point::new(0, 1)),
                (Point::new(1, 6), Point::new(1, 7))
            ]
        );
    }

    #[test]
    fn code_strings_never_span_lines() {
        const TEXT: &str = "s = \"open\nclose\"";
        let tokens = tokenize(Mode::Code, TEXT);
        assert!(texts(&tokens, Class::StringLiteral, TEXT).is_empty());
    }

    #[test]
    fn markup_comment_tag_attribute() {
        const TEXT: &str = "<!-- c -->\n<div class=\"a\">";
        let tokens = tokenize(Mode::Markup, TEXT);
        assert_eq!(texts(&tokens, Class::HtmlComment, TEXT), ["<!-- c -->"]);
        assert!(
            texts(&tokens, Class::HtmlTag, TEXT).contains(&"<div class=\"a\">".to_string())
        );
        assert_eq!(texts(&tokens, Class::HtmlAttribute, TEXT), ["class"]);
        assert!(texts(&tokens, Class::CssClass, TEXT).is_empty());
    }

    #[test]
    fn markup_declared_variables() {
        const TEXT: &str = "let count = 1;\ncount = count + 1;";
        let tokens = tokenize(Mode::Markup, TEXT);
        assert_eq!(
            texts(&tokens, Class::JsVariable, TEXT),
            ["count", "count", "count"]
        );
    }

    #[test]
    fn markup_variables_after_declaration_only() {
        const TEXT: &str = "total = 0;\nvar total = 1;\ntotal.toFixed(); total;";
        let tokens = tokenize(Mode::Markup, TEXT);
        let starts = tokens
            .markers()
            .iter()
            .filter(|m| m.class == Class::JsVariable)
            .map(|m| m.start)
            .collect::<Vec<_>>();
        assert_eq!(starts, [Point::new(1, 4), Point::new(2, 17)]);
    }

    #[test]
    fn markdown_spans() {
        const TEXT: &str = "# Title\nsome **bold** and *it*\n- item [link](http://x)";
        let tokens = tokenize(Mode::Markdown, TEXT);
        assert_eq!(texts(&tokens, Class::MarkdownHeader, TEXT), ["Title"]);
        assert_eq!(texts(&tokens, Class::MarkdownBold, TEXT), ["bold"]);
        assert_eq!(texts(&tokens, Class::MarkdownItalic, TEXT), ["it"]);
        assert_eq!(texts(&tokens, Class::MarkdownLink, TEXT), ["link"]);
        assert_eq!(
            texts(&tokens, Class::MarkdownListItem, TEXT),
            ["item [link](http://x)"]
        );
    }

    #[test]
    fn positions_count_characters() {
        const TEXT: &str = "é = 'ü'\n# ☃";
        let tokens = tokenize(Mode::Code, TEXT);
        let comment = tokens
            .markers()
            .iter()
            .find(|m| m.class == Class::Comment)
            .unwrap();
        assert_eq!(comment.range, 8..11);
        assert_eq!(comment.start, Point::new(1, 0));
        assert_eq!(comment.end, Point::new(1, 3));
        assert_eq!(texts(&tokens, Class::StringLiteral, TEXT), ["'ü'"]);
    }

    #[test]
    fn non_ascii_identifiers() {
        const CODE: &str = "naïve = 1\nprint(naïve, ve)";
        let tokens = tokenize(Mode::Code, CODE);
        assert_eq!(texts(&tokens, Class::Variable, CODE), ["naïve", "naïve"]);
        assert_eq!(texts(&tokens, Class::FunctionCall, CODE), ["print"]);

        const MARKUP: &str = "let café = 1;\ncafé += caf;";
        let tokens = tokenize(Mode::Markup, MARKUP);
        assert_eq!(texts(&tokens, Class::JsVariable, MARKUP), ["café", "café"]);
    }

    #[test]
    fn long_lines_cost_no_more_than_short_lines() {
        let library = Library::new().unwrap();
        let tokenizer = Tokenizer::new(library.find(Mode::Markup));
        let time = |text: &str| {
            let now = Instant::now();
            let tokens = tokenizer.tokenize(text);
            (now.elapsed(), tokens)
        };

        let (one_line, a) = time(&"<b>1</b>".repeat(8_000));
        let (many_lines, b) = time(&"<b>1</b>\n".repeat(8_000));
        assert_eq!(a.markers().len(), b.markers().len());
        assert!(
            one_line < many_lines * 3 + Duration::from_millis(250),
            "{one_line:?} vs {many_lines:?}"
        );
    }

    #[test]
    fn later_markers_win() {
        const TEXT: &str = "x = \"5\" # 7";
        let tokens = tokenize(Mode::Code, TEXT);
        let classes = paint(&tokens, TEXT);
        assert_eq!(classes[0], Some(Class::Variable));
        assert_eq!(classes[1], None);
        assert_eq!(classes[5], Some(Class::StringLiteral));
        assert_eq!(classes[8], Some(Class::Comment));
        assert_eq!(classes[10], Some(Class::Number));
    }

    #[test]
    fn exhausted_budget_degrades() {
        let library = Library::new().unwrap();
        let syntax = library.find(Mode::Markup);
        let text = "<p>x</p>\n".repeat(100);
        let tokens = Tokenizer::new(syntax)
            .with_budget(Some(Duration::ZERO))
            .tokenize(&text);
        assert!(tokens.is_empty());
        assert_eq!(tokens.degraded(), syntax.rules().len());
    }

    #[test]
    fn generous_budget_is_complete() {
        const TEXT: &str = "<p class=\"x\">1</p>";
        let library = Library::new().unwrap();
        let syntax = library.find(Mode::Markup);
        let bounded = Tokenizer::new(syntax)
            .with_budget(Some(Duration::from_secs(60)))
            .tokenize(TEXT);
        let unbounded = Tokenizer::new(syntax).tokenize(TEXT);
        assert_eq!(bounded.degraded(), 0);
        let a = bounded.markers().iter().cloned().collect::<HashSet<_>>();
        let b = unbounded.markers().iter().cloned().collect::<HashSet<_>>();
        assert_eq!(a, b);
    }
}
