//! Token classifications.

use crate::error::{Error, Result};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// The kind of language construct that a span of text represents.
///
/// Classifications only determine which spans are computed. The color rendered for
/// each classification is the concern of [`Theme`](crate::theme::Theme).
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Class {
    Keyword,
    Comment,
    StringLiteral,
    FunctionCall,
    Variable,
    Number,
    Brace,
    Builtin,
    HtmlTag,
    HtmlAttribute,
    HtmlComment,
    JsComment,
    CssClass,
    CssProperty,
    JsKeyword,
    JsBuiltin,
    JsDomCall,
    JsVariable,
    PxValue,
    Operator,
    MarkdownHeader,
    MarkdownBold,
    MarkdownItalic,
    MarkdownLink,
    MarkdownListItem,
}

impl Class {
    /// Every known classification, which is the set of markers cleared at the start
    /// of each highlight cycle.
    pub const ALL: [Class; 25] = [
        Class::Keyword,
        Class::Comment,
        Class::StringLiteral,
        Class::FunctionCall,
        Class::Variable,
        Class::Number,
        Class::Brace,
        Class::Builtin,
        Class::HtmlTag,
        Class::HtmlAttribute,
        Class::HtmlComment,
        Class::JsComment,
        Class::CssClass,
        Class::CssProperty,
        Class::JsKeyword,
        Class::JsBuiltin,
        Class::JsDomCall,
        Class::JsVariable,
        Class::PxValue,
        Class::Operator,
        Class::MarkdownHeader,
        Class::MarkdownBold,
        Class::MarkdownItalic,
        Class::MarkdownLink,
        Class::MarkdownListItem,
    ];

    /// Returns the canonical name used in configuration files and span dumps.
    pub fn name(&self) -> &'static str {
        match self {
            Class::Keyword => "keyword",
            Class::Comment => "comment",
            Class::StringLiteral => "string-literal",
            Class::FunctionCall => "function-call",
            Class::Variable => "variable",
            Class::Number => "number",
            Class::Brace => "brace",
            Class::Builtin => "builtin",
            Class::HtmlTag => "html-tag",
            Class::HtmlAttribute => "html-attribute",
            Class::HtmlComment => "html-comment",
            Class::JsComment => "js-comment",
            Class::CssClass => "css-class",
            Class::CssProperty => "css-property",
            Class::JsKeyword => "js-keyword",
            Class::JsBuiltin => "js-builtin",
            Class::JsDomCall => "js-dom-call",
            Class::JsVariable => "js-variable",
            Class::PxValue => "px-value",
            Class::Operator => "operator",
            Class::MarkdownHeader => "markdown-header",
            Class::MarkdownBold => "markdown-bold",
            Class::MarkdownItalic => "markdown-italic",
            Class::MarkdownLink => "markdown-link",
            Class::MarkdownListItem => "markdown-list-item",
        }
    }
}

impl FromStr for Class {
    type Err = Error;

    fn from_str(name: &str) -> Result<Class> {
        Class::ALL
            .iter()
            .find(|class| class.name() == name)
            .copied()
            .ok_or_else(|| Error::invalid_class(name))
    }
}

impl Display for Class {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn names_are_unique() {
        let names = Class::ALL.iter().map(|c| c.name()).collect::<HashSet<_>>();
        assert_eq!(names.len(), Class::ALL.len());
    }

    #[test]
    fn parse_names() {
        for class in Class::ALL {
            assert_eq!(class.name().parse::<Class>().unwrap(), class);
        }
        assert!("kw".parse::<Class>().is_err());
    }
}
