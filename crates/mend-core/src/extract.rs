use crate::grammar::DiagnosticGrammar;
use mend_common::{Diagnostic, Level};

/// Turn an engine failure message into a [`Diagnostic`].
///
/// Never fails: a message outside the grammar becomes a `Misunderstood`
/// diagnostic carrying the full text. Lines in messages are 1-based and are
/// stored 0-based; a field that does not convert to a number is stored as -1.
pub fn extract(grammar: &dyn DiagnosticGrammar, message: &str, level: Level) -> Diagnostic {
    let Some(located) = grammar.locate(message) else {
        return Diagnostic::misunderstood(message);
    };

    let line = located
        .line
        .parse::<i64>()
        .map(|line| line - 1)
        .unwrap_or(-1);
    let char = located
        .char
        .map(|c| c.parse::<i64>().unwrap_or(-1))
        .unwrap_or(-1);

    Diagnostic::new(line, char, located.description, level)
}
