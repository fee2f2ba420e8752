//! Scripted engine for tests.
//!
//! Understands just enough of `{{ }}` actions to fail the way Go's
//! text/template does for undefined functions, empty actions and unclosed
//! actions, one failure per call.

use crate::engine::{EngineFailure, TemplateEngine};
use crate::env::BaseTemplate;
use crate::grammar::{DiagnosticGrammar, GoTextTemplate};
use mend_common::split_lines;
use serde_json::Value;
use std::cell::Cell;

const KEYWORDS: &[&str] = &[
    "if", "else", "end", "range", "with", "define", "template", "block", "nil", "true", "false",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeTemplate {
    pub name: String,
    pub text: String,
    pub functions: Vec<String>,
}

#[derive(Default)]
pub struct FakeEngine {
    pub exec_failure: Option<String>,
    pub parses: Cell<usize>,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_exec(message: impl Into<String>) -> Self {
        Self {
            exec_failure: Some(message.into()),
            ..Self::default()
        }
    }
}

impl TemplateEngine for FakeEngine {
    type Template = FakeTemplate;

    fn grammar(&self) -> &dyn DiagnosticGrammar {
        &GoTextTemplate
    }

    fn name<'t>(&self, template: &'t FakeTemplate) -> &'t str {
        &template.name
    }

    fn parse(&self, base: &BaseTemplate, text: &str) -> Result<FakeTemplate, EngineFailure> {
        self.parses.set(self.parses.get() + 1);
        let name = base.name();

        for (idx, line) in split_lines(text).into_iter().enumerate() {
            let line_no = idx + 1;
            let mut rest = line;
            while let Some(open) = rest.find("{{") {
                let after = &rest[open + 2..];
                let Some(close) = after.find("}}") else {
                    return Err(EngineFailure::new(format!(
                        "template: {name}:{line_no}: unclosed action"
                    )));
                };
                let inner = after[..close]
                    .trim_start_matches('-')
                    .trim_end_matches('-')
                    .trim();
                rest = &after[close + 2..];

                let Some(word) = inner.split_whitespace().next() else {
                    return Err(EngineFailure::new(format!(
                        "template: {name}:{line_no}: missing value for command"
                    )));
                };
                let builtin = word.starts_with(['.', '$', '"', '/'])
                    || word.starts_with(|c: char| c.is_ascii_digit())
                    || KEYWORDS.contains(&word);
                if !builtin && !base.functions().contains(word) {
                    return Err(EngineFailure::new(format!(
                        "template: {name}:{line_no}: function \"{word}\" not defined"
                    )));
                }
            }
        }

        Ok(FakeTemplate {
            name: name.to_string(),
            text: text.to_string(),
            functions: base.functions().names().map(str::to_string).collect(),
        })
    }

    fn execute(
        &self,
        template: &FakeTemplate,
        _data: &Value,
        sink: &mut String,
    ) -> Result<(), EngineFailure> {
        if let Some(message) = &self.exec_failure {
            return Err(EngineFailure::new(message.clone()));
        }
        if template.text.trim().is_empty() {
            let name = &template.name;
            return Err(EngineFailure::new(format!(
                r#"template: {name}: "{name}" is an incomplete or empty template"#
            )));
        }
        sink.push_str(&template.text);
        Ok(())
    }
}
