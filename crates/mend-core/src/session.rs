//! One complete check of a template: sample data, user-declared functions,
//! recovery, then execution.

use crate::engine::TemplateEngine;
use crate::env::BaseTemplate;
use crate::exec::run_and_diagnose;
use crate::recover::{Recovery, RecoveryOptions};
use mend_common::{Diagnostic, SourceText};
use serde::Serialize;
use serde_json::Value;

/// What to check.
#[derive(Debug, Clone, Default)]
pub struct CheckRequest {
    /// Template name reported by the engine in its messages.
    pub name: String,
    pub text: String,
    /// Sample data as raw JSON. Empty or absent means no data.
    pub data: Option<String>,
    /// Functions to declare up front, before any are discovered.
    pub functions: Vec<String>,
}

impl CheckRequest {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn with_data(mut self, data: impl Into<String>) -> Self {
        self.data = Some(data.into());
        self
    }

    pub fn with_functions<I, S>(mut self, functions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.functions = functions.into_iter().map(Into::into).collect();
        self
    }
}

/// Split a comma separated list of function names, trimming each.
pub fn split_function_list(raw: &str) -> Vec<String> {
    if raw.trim().is_empty() {
        return Vec::new();
    }
    raw.split(',').map(|name| name.trim().to_string()).collect()
}

/// Outcome of a check.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    #[serde(skip)]
    pub source: SourceText,
    /// Whether some attempt parsed, so the template was executed.
    pub parsed: bool,
    pub output: String,
    pub diagnostics: Vec<Diagnostic>,
}

impl Report {
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Run a full check against `engine`.
///
/// Never fails: every problem, including undecodable data and unusable
/// function names, ends up in the report's diagnostics.
pub fn check<E: TemplateEngine>(engine: &E, request: &CheckRequest, options: RecoveryOptions) -> Report {
    let mut diagnostics = Vec::new();

    let data = match request.data.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => match serde_json::from_str::<Value>(raw) {
            Ok(value) => value,
            Err(err) => {
                diagnostics.push(Diagnostic::misunderstood(format!(
                    "failed to understand data: {err}"
                )));
                Value::Null
            }
        },
        _ => Value::Null,
    };

    let mut base = BaseTemplate::new(&request.name);
    for name in &request.functions {
        match base.with_stub(name.trim()) {
            Ok(extended) => base = extended,
            Err(invalid) => diagnostics.push(Diagnostic::misunderstood(invalid.to_string())),
        }
    }

    let (recovered, parse_diagnostics) =
        Recovery::with_options(engine, options).recover(&request.text, &base);
    diagnostics.extend(parse_diagnostics);

    let mut output = String::new();
    diagnostics.extend(run_and_diagnose(engine, &recovered, &data, &mut output));

    tracing::debug!(
        parsed = recovered.is_parsed(),
        diagnostics = diagnostics.len(),
        "check finished"
    );

    Report {
        source: SourceText::new(&request.name, request.text.clone()),
        parsed: recovered.is_parsed(),
        output,
        diagnostics,
    }
}
