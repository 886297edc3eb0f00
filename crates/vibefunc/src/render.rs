//! Ariadne-based rendering of diagnostic values.
//!
//! Diagnostics are plain values everywhere in the core; this module turns
//! them into labeled terminal reports. Output is colorless so tests can
//! snapshot it.

use std::ops::Range;

use ariadne::{Config, Label, Report, ReportKind, Source};
use vibefun_common::{Diagnostic, Severity, SourceMap};

/// Render one diagnostic against its source file.
pub fn render_diagnostic(diagnostic: &Diagnostic, sources: &SourceMap) -> String {
    let source = sources
        .text(&diagnostic.location.path)
        .unwrap_or("")
        .to_string();
    let source_len = source.len();

    let kind = match diagnostic.severity {
        Severity::Error => ReportKind::Error,
        Severity::Warning => ReportKind::Warning,
        Severity::Note => ReportKind::Advice,
    };

    // Clamp to a non-empty in-bounds range; ariadne needs at least one
    // character to label.
    let clamp = |offset: usize| -> Range<usize> {
        let start = offset.min(source_len.saturating_sub(1));
        start..(start + 1).min(source_len.max(1))
    };
    let span = clamp(diagnostic.location.offset as usize);

    let mut builder = Report::build(kind, span.clone())
        .with_code(diagnostic.code.clone())
        .with_message(&diagnostic.message)
        .with_config(Config::default().with_color(false));
    builder.add_label(Label::new(span).with_message(&diagnostic.message));
    for secondary in &diagnostic.secondary {
        if secondary.path == diagnostic.location.path {
            builder.add_label(
                Label::new(clamp(secondary.offset as usize)).with_message("also involved here"),
            );
        }
    }
    if let Some(hint) = &diagnostic.hint {
        builder.set_help(hint);
    }

    let mut buf = Vec::new();
    builder
        .finish()
        .write(Source::from(source), &mut buf)
        .expect("failed to write diagnostic");
    String::from_utf8(buf).expect("diagnostic output should be valid UTF-8")
}

/// Render every diagnostic, in order.
pub fn render_all(diagnostics: &[Diagnostic], sources: &SourceMap) -> String {
    diagnostics
        .iter()
        .map(|d| render_diagnostic(d, sources))
        .collect::<Vec<_>>()
        .join("\n")
}
