//! Bounded recursive recovery over a fail-fast engine.
//!
//! Each attempt parses the current text. A failure is diagnosed, healed if a
//! repair applies, and the repaired template is attempted again one level
//! deeper. Diagnostics from every failed attempt are kept, in the order the
//! failures were met.

use crate::engine::{Recovered, TemplateEngine};
use crate::env::BaseTemplate;
use crate::extract::extract;
use crate::heal::{heal, is_healable, Healing};
use crate::locate::locate;
use mend_common::{split_lines, Diagnostic, Level};

/// Default number of repairs attempted before giving up.
pub const MAX_FIXES: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecoveryOptions {
    /// Repairs allowed per request. The failure found after the last allowed
    /// repair is still reported, followed by a `LimitReached` diagnostic.
    pub max_fixes: usize,
}

impl Default for RecoveryOptions {
    fn default() -> Self {
        Self {
            max_fixes: MAX_FIXES,
        }
    }
}

/// Runs recovery for one engine.
pub struct Recovery<'e, E> {
    engine: &'e E,
    options: RecoveryOptions,
}

impl<'e, E: TemplateEngine> Recovery<'e, E> {
    pub fn new(engine: &'e E) -> Self {
        Self::with_options(engine, RecoveryOptions::default())
    }

    pub fn with_options(engine: &'e E, options: RecoveryOptions) -> Self {
        Self { engine, options }
    }

    /// Parse `text` as `base`, healing and retrying to collect as many
    /// diagnostics as possible.
    ///
    /// Returns the parsed template when some attempt parsed, otherwise `base`
    /// itself. `base` is never modified.
    pub fn recover(&self, text: &str, base: &BaseTemplate) -> (Recovered<E::Template>, Vec<Diagnostic>) {
        let (parsed, diagnostics) = self.attempt(text, base, 0, Vec::new());
        let recovered = match parsed {
            Some(template) => Recovered::Parsed(template),
            None => Recovered::Unhealed(base.clone()),
        };
        (recovered, diagnostics)
    }

    fn attempt(
        &self,
        text: &str,
        base: &BaseTemplate,
        depth: usize,
        mut diagnostics: Vec<Diagnostic>,
    ) -> (Option<E::Template>, Vec<Diagnostic>) {
        let failure = match self.engine.parse(base, text) {
            Ok(template) => return (Some(template), diagnostics),
            Err(failure) => failure,
        };

        let grammar = self.engine.grammar();
        let mut diagnostic = extract(grammar, &failure.message, Level::ParseFailure);
        tracing::debug!(
            depth,
            line = diagnostic.line,
            char = diagnostic.char,
            level = %diagnostic.level,
            "parse attempt failed"
        );

        if diagnostic.level == Level::Misunderstood {
            diagnostics.push(diagnostic);
            return (None, diagnostics);
        }

        if !diagnostic.has_char() {
            if let Some(char) = locate(grammar, &diagnostic, &split_lines(text)) {
                diagnostic.char = char;
            }
        }

        if depth >= self.options.max_fixes {
            // an unhealable failure would have ended recovery anyway
            let healable = is_healable(grammar, &diagnostic, text);
            diagnostics.push(diagnostic);
            if healable {
                tracing::warn!(max_fixes = self.options.max_fixes, "fix limit reached");
                diagnostics.push(Diagnostic::limit_reached(self.options.max_fixes));
            }
            return (None, diagnostics);
        }

        let healing = heal(grammar, &mut diagnostic, text, base);
        diagnostics.push(diagnostic);

        match healing {
            Ok(Some(Healing::Stub { base, .. })) => self.attempt(text, &base, depth + 1, diagnostics),
            Ok(Some(Healing::Blank { text, .. })) => self.attempt(&text, base, depth + 1, diagnostics),
            Ok(None) => (None, diagnostics),
            Err(invalid) => {
                diagnostics.push(Diagnostic::misunderstood(invalid.to_string()));
                (None, diagnostics)
            }
        }
    }
}

/// Recover with the default options.
pub fn recover<E: TemplateEngine>(
    engine: &E,
    text: &str,
    base: &BaseTemplate,
) -> (Recovered<E::Template>, Vec<Diagnostic>) {
    Recovery::new(engine).recover(text, base)
}
