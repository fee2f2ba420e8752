mod diagnostic;
mod source;

pub use diagnostic::{Diagnostic, Level, SourceDiagnostic};
pub use source::{clamp_column, count_digits, split_lines, SourceText};
