use crate::engine::{Recovered, TemplateEngine};
use crate::extract::extract;
use mend_common::{Diagnostic, Level};
use serde_json::Value;

/// Execute a recovered template and report its failure, if any.
///
/// An unhealed template never parsed, so there is nothing to run. The
/// engine's report that a template is incomplete or empty is not a failure
/// either. Anything else becomes a single `ExecFailure` diagnostic.
pub fn run_and_diagnose<E: TemplateEngine>(
    engine: &E,
    recovered: &Recovered<E::Template>,
    data: &Value,
    sink: &mut String,
) -> Vec<Diagnostic> {
    let Recovered::Parsed(template) = recovered else {
        return Vec::new();
    };

    let failure = match engine.execute(template, data, sink) {
        Ok(()) => return Vec::new(),
        Err(failure) => failure,
    };

    let grammar = engine.grammar();
    if grammar.is_empty_template(engine.name(template), &failure.message) {
        return Vec::new();
    }

    let mut diagnostic = extract(grammar, &failure.message, Level::ExecFailure);
    if diagnostic.level != Level::Misunderstood {
        if let Some(expression) = grammar.expression(&diagnostic.description) {
            tracing::debug!(expression, "execution failed while evaluating");
            diagnostic.expression = Some(expression.to_string());
        }
    }
    vec![diagnostic]
}
