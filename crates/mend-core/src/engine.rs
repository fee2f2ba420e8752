use crate::env::BaseTemplate;
use crate::grammar::DiagnosticGrammar;
use serde_json::Value;
use thiserror::Error;

/// A failure reported by the template engine, as free text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct EngineFailure {
    pub message: String,
}

impl EngineFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A fail-fast template engine: each call reports at most one failure.
pub trait TemplateEngine {
    type Template;

    /// The phrasing of this engine's failure messages.
    fn grammar(&self) -> &dyn DiagnosticGrammar;

    /// Name a parsed template was given.
    fn name<'t>(&self, template: &'t Self::Template) -> &'t str;

    /// Parse `text` as the body of `base`, with `base`'s functions in scope.
    fn parse(&self, base: &BaseTemplate, text: &str) -> Result<Self::Template, EngineFailure>;

    /// Execute a parsed template against `data`, appending output to `sink`.
    fn execute(
        &self,
        template: &Self::Template,
        data: &Value,
        sink: &mut String,
    ) -> Result<(), EngineFailure>;
}

/// What recovery hands back: a parsed template, or the caller's base when
/// no attempt parsed.
#[derive(Debug, Clone)]
pub enum Recovered<T> {
    Parsed(T),
    Unhealed(BaseTemplate),
}

impl<T> Recovered<T> {
    pub fn is_parsed(&self) -> bool {
        matches!(self, Recovered::Parsed(_))
    }

    pub fn parsed(&self) -> Option<&T> {
        match self {
            Recovered::Parsed(template) => Some(template),
            Recovered::Unhealed(_) => None,
        }
    }
}
