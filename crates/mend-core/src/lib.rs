//! Multi-error reporting for fail-fast template engines.
//!
//! A template engine that stops at its first error is driven repeatedly:
//! each failure message is turned into a [`Diagnostic`], the template is
//! healed just enough to get past it, and the engine is asked again.
//!
//! # Architecture
//!
//! ```text
//! text ─► parse ─► failure ─► extract ─► locate ─► heal ─┐
//!           ▲                                            │
//!           └────────────── retry (bounded) ─────────────┘
//! parsed ─► execute ─► exec diagnostics
//! ```

mod engine;
mod env;
mod exec;
mod extract;
mod grammar;
mod heal;
mod locate;
mod recover;
mod session;

#[cfg(test)]
mod testing;

pub use engine::{EngineFailure, Recovered, TemplateEngine};
pub use env::{is_valid_function_name, BaseTemplate, Callable, FunctionEnv, InvalidFunctionName};
pub use exec::run_and_diagnose;
pub use extract::extract;
pub use grammar::{DiagnosticGrammar, GoTextTemplate, Located};
pub use heal::{blank, blank_empty_action, heal, is_healable, stub_function, Healing};
pub use locate::locate;
pub use recover::{recover, Recovery, RecoveryOptions, MAX_FIXES};
pub use session::{check, split_function_list, CheckRequest, Report};

pub use mend_common::{clamp_column, Diagnostic, Level, SourceText};
