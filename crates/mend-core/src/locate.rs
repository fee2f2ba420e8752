use crate::grammar::DiagnosticGrammar;
use mend_common::{Diagnostic, Level};

/// Find the char of a diagnostic that only reports a line.
///
/// The first quoted token of the description is searched for on the reported
/// line. Only a token that occurs exactly once pins down a position; a
/// repeated token is ambiguous and yields `None`.
pub fn locate(grammar: &dyn DiagnosticGrammar, diagnostic: &Diagnostic, lines: &[&str]) -> Option<i64> {
    if diagnostic.level == Level::Misunderstood || diagnostic.has_char() {
        return None;
    }

    let token = grammar.quoted_token(&diagnostic.description)?;
    let line = lines.get(usize::try_from(diagnostic.line).ok()?)?;
    unique_index(line, token).map(|idx| idx as i64)
}

/// Index of `token` in `line` when it occurs exactly once.
pub(crate) fn unique_index(line: &str, token: &str) -> Option<usize> {
    let first = line.find(token)?;
    let last = line.rfind(token)?;
    (first == last).then_some(first)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::GoTextTemplate;

    fn parse_failure(line: i64, description: &str) -> Diagnostic {
        Diagnostic::new(line, -1, description, Level::ParseFailure)
    }

    #[test]
    fn test_unique_token_sets_char() {
        let lines = ["header", "foo(bar)"];
        let diag = parse_failure(1, "unexpected 'bar' in call");
        assert_eq!(locate(&GoTextTemplate, &diag, &lines), Some(4));
    }

    #[test]
    fn test_repeated_token_is_ambiguous() {
        let lines = ["foo(bar) bar"];
        let diag = parse_failure(0, "unexpected 'bar' in call");
        assert_eq!(locate(&GoTextTemplate, &diag, &lines), None);
    }

    #[test]
    fn test_no_quoted_token() {
        let lines = ["{{if}}"];
        let diag = parse_failure(0, "missing value for if");
        assert_eq!(locate(&GoTextTemplate, &diag, &lines), None);
    }

    #[test]
    fn test_token_absent_from_line() {
        let lines = ["{{.Name}}"];
        let diag = parse_failure(0, r#"function "foo" not defined"#);
        assert_eq!(locate(&GoTextTemplate, &diag, &lines), None);
    }

    #[test]
    fn test_line_out_of_range() {
        let lines = ["only line"];
        let diag = parse_failure(3, r#"function "only" not defined"#);
        assert_eq!(locate(&GoTextTemplate, &diag, &lines), None);
    }

    #[test]
    fn test_misunderstood_and_placed_diagnostics_are_skipped() {
        let lines = ["'x'"];
        let misunderstood = Diagnostic::misunderstood("'x'");
        assert_eq!(locate(&GoTextTemplate, &misunderstood, &lines), None);

        let placed = Diagnostic::new(0, 0, "'x'", Level::ParseFailure);
        assert_eq!(locate(&GoTextTemplate, &placed, &lines), None);
    }
}
