//! Pattern library.
//!
//! Each [`Mode`] owns an ordered list of rules, where every rule pairs a
//! [`Class`] with a regular expression and a capture group selecting the classified
//! span. Order matters: when spans of different rules overlap, the rule appearing
//! later wins at render time.
//!
//! The regular expression engine supports neither look-around nor back-references,
//! so context-sensitive conditions are expressed as a [`Guard`] that inspects the
//! characters adjacent to a match.

use crate::class::Class;
use crate::error::{Error, Result};
use crate::etc;
use regex_lite::{Regex, RegexBuilder};
use std::collections::HashMap;
use std::fmt::{self, Display, Formatter};
use std::path::Path;
use std::str::FromStr;

/// The flavor of editor hosting the highlighter.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum Variant {
    /// An editor for Python-like code, which is always in [`Mode::Code`].
    Code,

    /// An editor for HTML/CSS/JS and Markdown, whose mode depends on the file.
    #[default]
    Markup,
}

/// Selects the rule set and execution strategy used for classification.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Mode {
    Code,
    Markup,
    Markdown,
}

/// The unit of text against which patterns are evaluated.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Strategy {
    /// Each line is evaluated independently, hence no match ever spans lines.
    PerLine,

    /// The entire document is evaluated at once.
    WholeBuffer,
}

/// A condition on the text surrounding a match that must hold for the match to be
/// classified.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Guard {
    /// Not preceded by `<`, `"` or `'`, and not followed by `>`, `"` or `'`.
    Unquoted,

    /// Not preceded, within 7 characters ignoring surrounding whitespace, by a
    /// `http:` or `https:` scheme.
    NoScheme,

    /// Not followed by `.`.
    NoMember,
}

/// How matches of a rule turn into classified spans.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Kind {
    /// The selected group of every match is classified.
    Match,

    /// The selected group of every match declares a name, and every occurrence of
    /// any declared name is classified instead.
    Declare(Scope),
}

/// The portion of a document in which occurrences of a declared name are classified.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Scope {
    Anywhere,

    /// At or after the first declaration of the name.
    AfterDeclaration,
}

/// An uncompiled rule.
#[derive(Clone, Debug)]
pub struct RuleDef {
    pub class: Class,
    pub pattern: String,
    pub group: usize,
    pub guard: Option<Guard>,
    pub kind: Kind,
}

/// A compiled rule.
#[derive(Clone, Debug)]
pub struct Rule {
    pub class: Class,
    pub re: Regex,
    pub group: usize,
    pub guard: Option<Guard>,
    pub kind: Kind,
}

/// The compiled rule set for a single mode.
#[derive(Clone, Debug)]
pub struct Syntax {
    pub mode: Mode,
    rules: Vec<Rule>,

    /// Matches a single word, used to find occurrences of declared names.
    word_re: Regex,
}

/// Additional rules per mode, each a pattern and the class it produces.
pub type Rules = HashMap<Mode, Vec<(String, Class)>>;

/// The compiled rule sets of all modes.
#[derive(Clone, Debug)]
pub struct Library {
    code: Syntax,
    markup: Syntax,
    markdown: Syntax,
}

impl FromStr for Variant {
    type Err = Error;

    fn from_str(name: &str) -> Result<Variant> {
        match name {
            "code" => Ok(Variant::Code),
            "markup" => Ok(Variant::Markup),
            _ => Err(Error::invalid_mode(name)),
        }
    }
}

impl Mode {
    pub const ALL: [Mode; 3] = [Mode::Code, Mode::Markup, Mode::Markdown];

    /// Returns the mode for a file at `path` being edited in `variant`, where an
    /// unnamed file in the markup editor is treated as markup.
    pub fn detect(variant: Variant, path: Option<&Path>) -> Mode {
        match variant {
            Variant::Code => Mode::Code,
            Variant::Markup => {
                let is_md = path
                    .and_then(|p| p.extension())
                    .is_some_and(|ext| ext == "md");
                if is_md { Mode::Markdown } else { Mode::Markup }
            }
        }
    }

    pub fn strategy(&self) -> Strategy {
        match self {
            Mode::Code => Strategy::PerLine,
            Mode::Markup | Mode::Markdown => Strategy::WholeBuffer,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Mode::Code => "code",
            Mode::Markup => "markup",
            Mode::Markdown => "markdown",
        }
    }
}

impl FromStr for Mode {
    type Err = Error;

    fn from_str(name: &str) -> Result<Mode> {
        Mode::ALL
            .iter()
            .find(|mode| mode.name() == name)
            .copied()
            .ok_or_else(|| Error::invalid_mode(name))
    }
}

impl Display for Mode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl Guard {
    /// Returns `true` if the match at byte range `start..end` of `text` satisfies
    /// this guard.
    pub fn admits(&self, text: &str, start: usize, end: usize) -> bool {
        match self {
            Guard::Unquoted => {
                !matches!(etc::char_before(text, start), Some('<' | '"' | '\''))
                    && !matches!(etc::char_at(text, end), Some('>' | '"' | '\''))
            }
            Guard::NoScheme => {
                let mut before = text[..start].chars().rev().take(7).collect::<Vec<_>>();
                before.reverse();
                let before = before.into_iter().collect::<String>();
                let before = before.trim();
                !(before.ends_with("http:") || before.ends_with("https:"))
            }
            Guard::NoMember => etc::char_at(text, end) != Some('.'),
        }
    }
}

impl RuleDef {
    fn new(class: Class, pattern: impl Into<String>) -> RuleDef {
        RuleDef {
            class,
            pattern: pattern.into(),
            group: 0,
            guard: None,
            kind: Kind::Match,
        }
    }

    fn group(self, group: usize) -> RuleDef {
        RuleDef { group, ..self }
    }

    fn guard(self, guard: Guard) -> RuleDef {
        RuleDef {
            guard: Some(guard),
            ..self
        }
    }

    fn declare(self, scope: Scope) -> RuleDef {
        RuleDef {
            kind: Kind::Declare(scope),
            ..self
        }
    }

    fn compile(&self) -> Result<Rule> {
        Ok(Rule {
            class: self.class,
            re: compile(&self.pattern)?,
            group: self.group,
            guard: self.guard,
            kind: self.kind,
        })
    }
}

const KEYWORDS: [&str; 33] = [
    "and", "as", "assert", "break", "class", "continue", "def", "del", "elif", "else", "except",
    "False", "finally", "for", "from", "global", "if", "import", "in", "is", "lambda", "None",
    "nonlocal", "not", "or", "pass", "raise", "return", "True", "try", "while", "with", "yield",
];

const BUILTINS: [&str; 7] = ["int", "str", "float", "dict", "list", "None", "bool"];

const JS_KEYWORDS: [&str; 43] = [
    "var", "let", "const", "function", "if", "else", "for", "while", "return", "switch", "case",
    "break", "continue", "try", "catch", "finally", "async", "await", "import", "export",
    "class", "extends", "super", "this", "new", "delete", "instanceof", "typeof", "void", "with",
    "do", "in", "of", "default", "static", "get", "set", "yield", "throw", "true", "false",
    "null", "undefined",
];

const JS_BUILTINS: [&str; 24] = [
    "console", "Math", "JSON", "Array", "Object", "String", "Number", "Boolean", "Date",
    "RegExp", "Promise", "Map", "Set", "Symbol", "Error", "parseInt", "parseFloat", "isNaN",
    "setTimeout", "setInterval", "clearTimeout", "clearInterval", "fetch", "alert",
];

const DOM_MEMBERS: [&str; 30] = [
    "getElementById", "getElementsByClassName", "getElementsByTagName", "getElementsByName",
    "querySelector", "querySelectorAll", "createElement", "createTextNode", "addEventListener",
    "removeEventListener", "appendChild", "removeChild", "write", "writeln", "body", "head",
    "title", "cookie", "location", "alert", "confirm", "prompt", "open", "close", "setTimeout",
    "setInterval", "localStorage", "sessionStorage", "innerWidth", "innerHeight",
];

/// Quoted text using either `"` or `'`, where a quote of the same kind may appear
/// only when escaped, and which never spans lines.
const STRING: &str = r#""(?:[^"\\\n]|\\.)*"|'(?:[^'\\\n]|\\.)*'"#;

/// A single identifier character. Word classes of the engine are ASCII-only, so
/// every non-ASCII character is admitted as well.
const IDENT: &str = r"[\w\x{80}-\x{10FFFF}]";

/// Returns a pattern matching any of `words` as a whole word.
fn words(words: &[&str]) -> String {
    let alts = words
        .iter()
        .map(|w| regex_lite::escape(w))
        .collect::<Vec<_>>()
        .join("|");
    format!(r"\b(?:{alts})\b")
}

/// Returns the built-in rules for `mode` in order of application.
pub fn rule_defs(mode: Mode) -> Vec<RuleDef> {
    match mode {
        Mode::Code => vec![
            RuleDef::new(Class::Comment, r"#.*"),
            RuleDef::new(Class::StringLiteral, STRING),
            RuleDef::new(Class::Keyword, words(&KEYWORDS)),
            RuleDef::new(Class::FunctionCall, format!(r"({IDENT}+)\s*\(")).group(1),
            RuleDef::new(Class::Variable, format!(r"({IDENT}+)\s*="))
                .group(1)
                .declare(Scope::Anywhere),
            RuleDef::new(Class::Brace, r"[()\[\]{}]"),
            RuleDef::new(Class::Builtin, words(&BUILTINS)),
            RuleDef::new(Class::Number, r"\b\d+(?:\.\d+)?\b").guard(Guard::Unquoted),
        ],
        Mode::Markup => vec![
            RuleDef::new(
                Class::Operator,
                r"===|!==|==|!=|<=|>=|=>|&&|\|\||\+\+|--|[-+*/%=!<>?]",
            ),
            RuleDef::new(Class::HtmlTag, r#"</?[\w\s="'\-/]*[^<>]*/?>"#),
            RuleDef::new(Class::HtmlAttribute, r#"\s([\w-]+)\s*=\s*["']"#).group(1),
            RuleDef::new(Class::HtmlComment, r"<!--.*?-->"),
            RuleDef::new(Class::JsComment, r"//.*").guard(Guard::NoScheme),
            RuleDef::new(Class::CssClass, r"\.[\w-]+"),
            RuleDef::new(Class::CssProperty, r"([\w-]+)\s*:").group(1),
            RuleDef::new(Class::FunctionCall, format!(r"({IDENT}+)\s*\(.*?\)")).group(1),
            RuleDef::new(Class::JsVariable, format!(r"\b(?:var|let|const)\s+({IDENT}+)"))
                .group(1)
                .guard(Guard::NoMember)
                .declare(Scope::AfterDeclaration),
            RuleDef::new(Class::JsKeyword, words(&JS_KEYWORDS)),
            RuleDef::new(Class::JsBuiltin, words(&JS_BUILTINS)),
            RuleDef::new(
                Class::JsDomCall,
                format!(r"\b(?:document|window)\.{}", words(&DOM_MEMBERS)),
            ),
            RuleDef::new(Class::StringLiteral, STRING),
            RuleDef::new(Class::Number, r"\b\d+\b").guard(Guard::Unquoted),
            RuleDef::new(Class::PxValue, r"\b\d+px\b").guard(Guard::Unquoted),
        ],
        Mode::Markdown => vec![
            RuleDef::new(Class::MarkdownHeader, r"^#{1,6}[ \t]*(.*)").group(1),
            RuleDef::new(Class::MarkdownBold, r"\*\*(.*?)\*\*").group(1),
            RuleDef::new(Class::MarkdownItalic, r"\*(.*?)\*").group(1),
            RuleDef::new(Class::MarkdownLink, r"\[(.*?)\]\((.*?)\)").group(1),
            RuleDef::new(Class::MarkdownListItem, r"^[ \t]*[-*][ \t]+(.*)").group(1),
        ],
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    RegexBuilder::new(pattern)
        .multi_line(true)
        .build()
        .map_err(|e| Error::invalid_regex(pattern, &e))
}

impl Syntax {
    /// Creates a syntax for `mode` from `defs`, returning an error if any of the
    /// regular expressions are malformed.
    pub fn new(mode: Mode, defs: &[RuleDef]) -> Result<Syntax> {
        let rules = defs
            .iter()
            .map(|def| def.compile())
            .collect::<Result<Vec<_>>>()?;
        Ok(Syntax {
            mode,
            rules,
            word_re: compile(&format!("{IDENT}+"))?,
        })
    }

    /// Creates a syntax for `mode` from the built-in rules followed by `extras`.
    ///
    /// Extra rules classify their first capture group if one exists, otherwise the
    /// whole match. An extra rule whose pattern fails to compile is skipped rather
    /// than failing the entire syntax.
    pub fn load(mode: Mode, extras: &[(String, Class)]) -> Result<Syntax> {
        let mut syntax = Syntax::new(mode, &rule_defs(mode))?;
        for (pattern, class) in extras {
            match compile(pattern) {
                Ok(re) => {
                    let group = if re.captures_len() > 1 { 1 } else { 0 };
                    syntax.rules.push(Rule {
                        class: *class,
                        re,
                        group,
                        guard: None,
                        kind: Kind::Match,
                    });
                }
                Err(e) => {
                    tracing::warn!(%mode, "skipping rule: {e}");
                }
            }
        }
        Ok(syntax)
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn word_re(&self) -> &Regex {
        &self.word_re
    }
}

impl Library {
    /// Returns a library of built-in rules only.
    pub fn new() -> Result<Library> {
        Library::load(&Rules::new())
    }

    /// Returns a library of built-in rules extended with `rules`.
    pub fn load(rules: &Rules) -> Result<Library> {
        let syntax = |mode: Mode| {
            let extras = rules.get(&mode).map(|r| r.as_slice()).unwrap_or(&[]);
            Syntax::load(mode, extras)
        };
        Ok(Library {
            code: syntax(Mode::Code)?,
            markup: syntax(Mode::Markup)?,
            markdown: syntax(Mode::Markdown)?,
        })
    }

    pub fn find(&self, mode: Mode) -> &Syntax {
        match mode {
            Mode::Code => &self.code,
            Mode::Markup => &self.markup,
            Mode::Markdown => &self.markdown,
        }
    }
}
