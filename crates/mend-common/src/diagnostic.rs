//! Structured diagnostics derived from template engine failures.
//!
//! A [`Diagnostic`] is what the recovery core produces; a [`SourceDiagnostic`]
//! pairs one with the template source so miette can print a labelled snippet.

use crate::source::SourceText;
use miette::{Diagnostic as MietteDiagnostic, NamedSource, SourceSpan};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// How far a failure message was understood, and where it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Level {
    /// The engine's message did not follow its grammar; passed through verbatim.
    #[serde(rename = "misunderstood")]
    Misunderstood,
    /// The template failed to parse. Potentially healable.
    #[serde(rename = "parse")]
    ParseFailure,
    /// The template parsed but failed while executing. Reported only.
    #[serde(rename = "exec")]
    ExecFailure,
    /// Healing stopped at the fix limit; later errors were not probed.
    #[serde(rename = "limit")]
    LimitReached,
}

impl Level {
    pub fn as_str(self) -> &'static str {
        match self {
            Level::Misunderstood => "misunderstood",
            Level::ParseFailure => "parse",
            Level::ExecFailure => "exec",
            Level::LimitReached => "limit",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One failure, positioned in the template source where possible.
///
/// `line` and `char` are zero-based; `-1` means unknown. A known `char`
/// always comes with a known `line`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub line: i64,
    pub char: i64,
    pub description: String,
    pub level: Level,
    /// Expression the engine was evaluating, for execution failures.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,
}

impl Diagnostic {
    pub fn new(line: i64, char: i64, description: impl Into<String>, level: Level) -> Self {
        let line = line.max(-1);
        let char = if line < 0 { -1 } else { char.max(-1) };
        Self {
            line,
            char,
            description: description.into(),
            level,
            expression: None,
        }
    }

    /// A message that could not be interpreted; carries the text verbatim.
    pub fn misunderstood(text: impl Into<String>) -> Self {
        Self::new(-1, -1, text, Level::Misunderstood)
    }

    pub fn limit_reached(max_fixes: usize) -> Self {
        Self::new(
            -1,
            -1,
            format!("stopped after {max_fixes} automatic fixes; later errors were not checked"),
            Level::LimitReached,
        )
    }

    pub fn with_expression(mut self, expression: impl Into<String>) -> Self {
        self.expression = Some(expression.into());
        self
    }

    pub fn has_line(&self) -> bool {
        self.line >= 0
    }

    pub fn has_char(&self) -> bool {
        self.char >= 0
    }

    /// Pair this diagnostic with its source for rendering.
    pub fn in_source(&self, source: &SourceText) -> SourceDiagnostic {
        let span = source.span(self.line, self.char);
        let label = match (self.has_line(), self.has_char()) {
            (true, true) => format!("{} error here", self.level),
            (true, false) => format!("{} error on this line", self.level),
            _ => String::new(),
        };
        let help = match self.level {
            Level::Misunderstood => {
                Some("the engine message was not understood; shown as reported".to_string())
            }
            Level::LimitReached => Some("fix the errors above and check again".to_string()),
            _ => self.expression.as_ref().map(|e| format!("while evaluating {e}")),
        };

        SourceDiagnostic {
            level: self.level,
            message: self.description.clone(),
            src: source.named_source(),
            span,
            label,
            help,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.has_line(), self.has_char()) {
            (true, true) => write!(f, "{}:{}: {}", self.line + 1, self.char, self.description),
            (true, false) => write!(f, "{}: {}", self.line + 1, self.description),
            _ => f.write_str(&self.description),
        }
    }
}

/// A diagnostic bound to its template source, printable by miette.
#[derive(Debug, Clone, Error, MietteDiagnostic)]
#[error("{message}")]
pub struct SourceDiagnostic {
    pub level: Level,
    pub message: String,
    #[source_code]
    pub src: NamedSource<String>,
    #[label("{label}")]
    pub span: Option<SourceSpan>,
    pub label: String,
    #[help]
    pub help: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_line_forces_unknown_char() {
        let diag = Diagnostic::new(-1, 4, "x", Level::ParseFailure);
        assert_eq!(diag.char, -1);
    }

    #[test]
    fn test_misunderstood_has_no_position() {
        let diag = Diagnostic::misunderstood("panic: boom");
        assert_eq!(diag.line, -1);
        assert_eq!(diag.char, -1);
        assert_eq!(diag.level, Level::Misunderstood);
        assert_eq!(diag.description, "panic: boom");
    }

    #[test]
    fn test_display_uses_one_based_lines() {
        let diag = Diagnostic::new(2, 5, "some error", Level::ParseFailure);
        insta::assert_snapshot!(diag.to_string(), @"3:5: some error");

        let diag = Diagnostic::new(11, -1, "some error", Level::ParseFailure);
        insta::assert_snapshot!(diag.to_string(), @"12: some error");
    }

    #[test]
    fn test_serialized_shape() {
        let diag = Diagnostic::new(0, 3, "bad", Level::ExecFailure);
        let json = serde_json::to_string(&diag).unwrap();
        assert_eq!(json, r#"{"line":0,"char":3,"description":"bad","level":"exec"}"#);

        let with_expr = diag.with_expression(".Foo");
        let json = serde_json::to_value(&with_expr).unwrap();
        assert_eq!(json["expression"], ".Foo");
    }

    #[test]
    fn test_in_source_labels_position() {
        let source = SourceText::new("input", "hello\n{{foo}}");
        let rendered = Diagnostic::new(1, 2, "function \"foo\" not defined", Level::ParseFailure)
            .in_source(&source);
        let span = rendered.span.unwrap();
        assert_eq!(span.offset(), 8);
        assert_eq!(rendered.label, "parse error here");

        let unplaced = Diagnostic::misunderstood("???").in_source(&source);
        assert!(unplaced.span.is_none());
        assert!(unplaced.help.is_some());
    }
}
