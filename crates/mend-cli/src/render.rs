//! Text output for check reports.

use miette::{GraphicalReportHandler, GraphicalTheme};
use mend_core::{clamp_column, Report};
use std::fmt::Write;

/// Every diagnostic as a miette snippet, followed by a summary line.
pub fn render_human(report: &Report, color: bool) -> Result<String, std::fmt::Error> {
    let theme = if color {
        GraphicalTheme::unicode()
    } else {
        GraphicalTheme::unicode_nocolor()
    };
    let handler = GraphicalReportHandler::new_themed(theme).with_context_lines(2);

    let mut out = String::new();
    for diagnostic in &report.diagnostics {
        handler.render_report(&mut out, &diagnostic.in_source(&report.source))?;
        out.push('\n');
    }
    writeln!(out, "{}", summary(report))?;
    Ok(out)
}

pub fn summary(report: &Report) -> String {
    let count = report.diagnostics.len();
    let problems = if count == 1 { "problem" } else { "problems" };
    let state = if report.parsed {
        "template parsed"
    } else {
        "template did not parse"
    };
    format!("{}: {} {} found, {}", report.source.name, count, problems, state)
}

/// The source with a line-number gutter and a caret under every placed
/// diagnostic.
pub fn render_listing(report: &Report) -> String {
    let width = report.source.gutter_width();
    let mut out = String::new();

    for (idx, line) in report.source.lines().into_iter().enumerate() {
        let _ = writeln!(out, "{:>width$} | {}", idx + 1, line);
        for diagnostic in &report.diagnostics {
            if diagnostic.line != idx as i64 {
                continue;
            }
            let pad = line[..clamp_column(line, diagnostic.char)].chars().count();
            let marker = if diagnostic.has_char() { "^ " } else { "" };
            let _ = writeln!(
                out,
                "{:>width$} | {}{}{}",
                "",
                " ".repeat(pad),
                marker,
                diagnostic.description
            );
        }
    }
    out
}
