//! Engine-specific wording of failure messages.
//!
//! Everything the recovery core knows about how an engine phrases its errors
//! lives behind [`DiagnosticGrammar`]. Supporting another engine means writing
//! another implementation and running it through the same conformance tests,
//! not editing patterns inside the healers.

use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::Range;

/// Raw position fields of a message that matched the grammar, before any
/// numeric conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Located<'m> {
    pub template: &'m str,
    pub line: &'m str,
    pub char: Option<&'m str>,
    pub description: &'m str,
}

/// How one template engine phrases its failures.
pub trait DiagnosticGrammar {
    /// Identifies the message format this grammar understands.
    fn version(&self) -> &'static str;

    /// Split a failure message into template name, line, optional char and
    /// description. `None` when the message does not follow the grammar.
    fn locate<'m>(&self, message: &'m str) -> Option<Located<'m>>;

    /// First quoted token in a description.
    fn quoted_token<'d>(&self, description: &'d str) -> Option<&'d str>;

    /// Name of the function reported as undefined.
    fn undefined_function<'d>(&self, description: &'d str) -> Option<&'d str>;

    /// Whether the description reports an action with no value.
    fn is_missing_value(&self, description: &str) -> bool;

    /// Byte range of the first empty action in `text`.
    fn empty_action(&self, text: &str) -> Option<Range<usize>>;

    /// Whether `message` is the engine's benign report that the template named
    /// `name` has no content to execute.
    fn is_empty_template(&self, name: &str, message: &str) -> bool;

    /// Expression an execution failure was evaluating.
    fn expression<'d>(&self, description: &'d str) -> Option<&'d str>;
}

static TEMPLATE_ERROR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"template: (.*?):((\d+):)?(\d+): (.*)").unwrap());
static QUOTED_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r#"['"](.+?)['"]"#).unwrap());
static EXPRESSION: Lazy<Regex> = Lazy::new(|| Regex::new(r"<(\..+?)>").unwrap());
static UNDEFINED_FUNCTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"function "(.+)" not defined"#).unwrap());
static MISSING_VALUE: Lazy<Regex> = Lazy::new(|| Regex::new(r"missing value for command").unwrap());
static EMPTY_ACTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{((-?\s*?)|(\s*?-?))\}\}").unwrap());

/// Messages produced by Go's `text/template` package.
///
/// Parse failures read `template: <name>:<line>: <description>`; execution
/// failures add a column, `template: <name>:<line>:<col>: <description>`.
#[derive(Debug, Clone, Copy, Default)]
pub struct GoTextTemplate;

impl GoTextTemplate {
    pub const VERSION: &'static str = "go-text-template/1";
}

impl DiagnosticGrammar for GoTextTemplate {
    fn version(&self) -> &'static str {
        Self::VERSION
    }

    fn locate<'m>(&self, message: &'m str) -> Option<Located<'m>> {
        let caps = TEMPLATE_ERROR.captures(message)?;
        let template = caps.get(1)?.as_str();
        let last = caps.get(4)?.as_str();
        let description = caps.get(5)?.as_str();

        // with two numbers the first is the line and the second the char
        let (line, char) = match caps.get(3) {
            Some(line) => (line.as_str(), Some(last)),
            None => (last, None),
        };

        Some(Located {
            template,
            line,
            char,
            description,
        })
    }

    fn quoted_token<'d>(&self, description: &'d str) -> Option<&'d str> {
        QUOTED_TOKEN
            .captures(description)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }

    fn undefined_function<'d>(&self, description: &'d str) -> Option<&'d str> {
        UNDEFINED_FUNCTION
            .captures(description)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }

    fn is_missing_value(&self, description: &str) -> bool {
        MISSING_VALUE.is_match(description)
    }

    fn empty_action(&self, text: &str) -> Option<Range<usize>> {
        EMPTY_ACTION.find(text).map(|m| m.range())
    }

    fn is_empty_template(&self, name: &str, message: &str) -> bool {
        message == format!(r#"template: {name}: "{name}" is an incomplete or empty template"#)
    }

    fn expression<'d>(&self, description: &'d str) -> Option<&'d str> {
        EXPRESSION
            .captures(description)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }
}
