//! Automatic repairs that get a template past one diagnosed failure.
//!
//! Healing only restores parseability so later errors can be reported; a
//! healed template does not do what its author meant.

use crate::env::{BaseTemplate, InvalidFunctionName};
use crate::grammar::DiagnosticGrammar;
use mend_common::{split_lines, Diagnostic, Level};
use std::ops::Range;

/// A repair to retry with.
#[derive(Debug, Clone)]
pub enum Healing {
    /// Same text, environment extended with a stub for `name`.
    Stub { name: String, base: BaseTemplate },
    /// Text with the empty action at `span` blanked out, same environment.
    Blank { text: String, span: Range<usize> },
}

/// Pick a repair for `diagnostic`: function stubs first, then empty actions.
///
/// May fill in `diagnostic.char` when the repair pins down the position.
/// Returns `Ok(None)` when nothing applies; an undefined function whose name
/// cannot be registered is an error.
pub fn heal(
    grammar: &dyn DiagnosticGrammar,
    diagnostic: &mut Diagnostic,
    text: &str,
    base: &BaseTemplate,
) -> Result<Option<Healing>, InvalidFunctionName> {
    if diagnostic.level == Level::Misunderstood {
        return Ok(None);
    }

    if let Some(healing) = stub_function(grammar, diagnostic, base)? {
        return Ok(Some(healing));
    }

    Ok(blank_empty_action(grammar, diagnostic, text))
}

/// Whether some repair would apply to `diagnostic`, without applying it.
pub fn is_healable(grammar: &dyn DiagnosticGrammar, diagnostic: &Diagnostic, text: &str) -> bool {
    if diagnostic.level == Level::Misunderstood {
        return false;
    }
    grammar.undefined_function(&diagnostic.description).is_some()
        || (grammar.is_missing_value(&diagnostic.description) && grammar.empty_action(text).is_some())
}

/// Register a no-op for a function the engine reported as undefined.
pub fn stub_function(
    grammar: &dyn DiagnosticGrammar,
    diagnostic: &Diagnostic,
    base: &BaseTemplate,
) -> Result<Option<Healing>, InvalidFunctionName> {
    let Some(name) = grammar.undefined_function(&diagnostic.description) else {
        return Ok(None);
    };

    let base = base.with_stub(name)?;
    tracing::debug!(function = name, "stubbing undefined function");
    Ok(Some(Healing::Stub {
        name: name.to_string(),
        base,
    }))
}

/// Blank out the first empty action when the engine reported a command
/// without a value.
pub fn blank_empty_action(
    grammar: &dyn DiagnosticGrammar,
    diagnostic: &mut Diagnostic,
    text: &str,
) -> Option<Healing> {
    if !grammar.is_missing_value(&diagnostic.description) {
        return None;
    }
    let span = grammar.empty_action(text)?;

    let lines = split_lines(text);
    if let Some(line) = usize::try_from(diagnostic.line)
        .ok()
        .and_then(|idx| lines.get(idx))
    {
        if let Some(on_line) = grammar.empty_action(line) {
            diagnostic.char = on_line.start as i64;
        }
    }

    tracing::debug!(start = span.start, end = span.end, "blanking empty action");
    Some(Healing::Blank {
        text: blank(text, span.clone()),
        span,
    })
}

/// Replace `span` with spaces of the same byte length. Line breaks inside
/// the span are kept so no line moves.
pub fn blank(text: &str, span: Range<usize>) -> String {
    let mut out = String::with_capacity(text.len());
    out.push_str(&text[..span.start]);
    for c in text[span.clone()].chars() {
        match c {
            '\n' | '\r' => out.push(c),
            _ => out.extend(std::iter::repeat(' ').take(c.len_utf8())),
        }
    }
    out.push_str(&text[span.end..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::GoTextTemplate;

    fn parse_failure(line: i64, description: &str) -> Diagnostic {
        Diagnostic::new(line, -1, description, Level::ParseFailure)
    }

    #[test]
    fn test_stub_extends_a_copy_of_the_environment() {
        let base = BaseTemplate::new("t");
        let mut diag = parse_failure(0, r#"function "upper" not defined"#);
        let healing = heal(&GoTextTemplate, &mut diag, "{{upper .}}", &base).unwrap();

        match healing {
            Some(Healing::Stub { name, base: healed }) => {
                assert_eq!(name, "upper");
                assert!(healed.functions().contains("upper"));
            }
            other => panic!("expected a stub, got {other:?}"),
        }
        assert!(!base.functions().contains("upper"));
    }

    #[test]
    fn test_stub_with_unregistrable_name_is_an_error() {
        let base = BaseTemplate::new("t");
        let mut diag = parse_failure(0, r#"function "a-b" not defined"#);
        let err = heal(&GoTextTemplate, &mut diag, "", &base).unwrap_err();
        assert_eq!(err, InvalidFunctionName("a-b".to_string()));
    }

    #[test]
    fn test_blank_empty_action_sets_char_and_keeps_length() {
        let base = BaseTemplate::new("t");
        let text = "hello\nx {{- }} y\n";
        let mut diag = parse_failure(1, "missing value for command");
        let healing = heal(&GoTextTemplate, &mut diag, text, &base).unwrap();

        assert_eq!(diag.char, 2);
        match healing {
            Some(Healing::Blank { text: healed, span }) => {
                assert_eq!(span, 8..14);
                assert_eq!(healed, "hello\nx        y\n");
                assert_eq!(healed.len(), text.len());
            }
            other => panic!("expected a blank, got {other:?}"),
        }
    }

    #[test]
    fn test_blank_empty_action_on_other_line_leaves_char() {
        // The diagnosed line has no empty action; the first one in the text
        // is still the one replaced.
        let text = "{{}}\nplain";
        let mut diag = parse_failure(1, "missing value for command");
        let healing = blank_empty_action(&GoTextTemplate, &mut diag, text);
        assert_eq!(diag.char, -1);
        assert!(matches!(healing, Some(Healing::Blank { span, .. }) if span == (0..4)));
    }

    #[test]
    fn test_missing_value_without_empty_action_is_not_healed() {
        let base = BaseTemplate::new("t");
        let mut diag = parse_failure(0, "missing value for command");
        let healing = heal(&GoTextTemplate, &mut diag, "{{ .Name }}", &base).unwrap();
        assert!(healing.is_none());
    }

    #[test]
    fn test_stub_takes_priority() {
        let base = BaseTemplate::new("t");
        let mut diag = parse_failure(0, r#"function "f" not defined; missing value for command"#);
        let healing = heal(&GoTextTemplate, &mut diag, "{{}}", &base).unwrap();
        assert!(matches!(healing, Some(Healing::Stub { .. })));
    }

    #[test]
    fn test_misunderstood_is_never_healed() {
        let base = BaseTemplate::new("t");
        let mut diag = Diagnostic::misunderstood(r#"function "f" not defined"#);
        assert!(heal(&GoTextTemplate, &mut diag, "", &base).unwrap().is_none());
    }

    #[test]
    fn test_is_healable() {
        let undefined = parse_failure(0, r#"function "f" not defined"#);
        assert!(is_healable(&GoTextTemplate, &undefined, ""));

        let missing = parse_failure(0, "missing value for command");
        assert!(is_healable(&GoTextTemplate, &missing, "{{}}"));
        assert!(!is_healable(&GoTextTemplate, &missing, "{{ .X }}"));

        let unclosed = parse_failure(0, "unclosed action");
        assert!(!is_healable(&GoTextTemplate, &unclosed, "{{"));
        assert!(!is_healable(&GoTextTemplate, &Diagnostic::misunderstood(r#"function "f" not defined"#), ""));
    }

    #[test]
    fn test_blank_keeps_line_breaks() {
        let text = "a{{\n}}b\nc";
        let blanked = blank(text, 1..6);
        assert_eq!(blanked, "a  \n  b\nc");
        assert_eq!(split_lines(&blanked).len(), split_lines(text).len());
    }

    #[test]
    fn test_blank_pads_multibyte_whitespace_by_bytes() {
        let text = "{{\u{3000}}}";
        let blanked = blank(text, 0..text.len());
        assert_eq!(blanked.len(), text.len());
        assert!(blanked.chars().all(|c| c == ' '));
    }
}
