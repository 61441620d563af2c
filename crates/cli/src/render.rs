//! Pretty diagnostic rendering using ariadne.
//!
//! Turns a [`CompileError`] into ariadne [`Report`]s for coloured,
//! source-annotated terminal output, or into enriched JSON when the output is
//! piped or the user asks for it.

use std::io::{self, IsTerminal};

use ariadne::{Color, Config, Fmt, IndexType, Label, Report, ReportKind, Source};
use zixc_core::{CompileError, Diagnostic, LineIndex, Severity};

use crate::driver::RunStats;

// ── Output format ───────────────────────────────────────────────────────

/// Output format for diagnostic rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Format {
    /// Coloured, source-annotated output (ariadne).
    Pretty,
    /// Machine-readable JSON.
    Json,
}

impl Format {
    /// Use the explicit choice, or pretty on a TTY and JSON otherwise.
    pub(crate) fn resolve_or_detect(explicit: Option<&str>) -> Self {
        match explicit {
            Some("json") => Format::Json,
            Some("pretty") => Format::Pretty,
            _ => {
                if io::stdout().is_terminal() {
                    Format::Pretty
                } else {
                    Format::Json
                }
            }
        }
    }
}

// ── Severity mapping ────────────────────────────────────────────────────

fn report_kind(severity: &Severity) -> ReportKind<'static> {
    match severity {
        Severity::Error => ReportKind::Error,
        _ => ReportKind::Advice,
    }
}

fn severity_color(severity: &Severity) -> Color {
    match severity {
        Severity::Error => Color::Red,
        _ => Color::Blue,
    }
}

// ── Pretty rendering ────────────────────────────────────────────────────

/// Render a compile error to stderr: an ariadne report followed by a
/// one-line `file:line:col - message` summary.
pub(crate) fn render_error_pretty(filename: &str, error: &CompileError) {
    let source: &str = &error.source_text;
    let diagnostics = error.to_diagnostics();
    let Some((primary, notes)) = diagnostics.split_first() else {
        return;
    };

    match primary.span {
        Some(span) => {
            let start = span.start.min(source.len());
            let end = span.end.min(source.len()).max(start);
            let config = Config::default()
                .with_compact(false)
                .with_index_type(IndexType::Byte);

            let mut builder =
                Report::build(report_kind(&primary.severity), (filename, start..end))
                    .with_code(primary.id.as_ref())
                    .with_message(&primary.message)
                    .with_config(config)
                    .with_label(
                        Label::new((filename, start..end))
                            .with_message(label_message(primary))
                            .with_color(severity_color(&primary.severity)),
                    );

            for note in notes {
                if let Some(span) = note.span {
                    let start = span.start.min(source.len());
                    let end = span.end.min(source.len()).max(start);
                    builder = builder.with_label(
                        Label::new((filename, start..end))
                            .with_message(&note.message)
                            .with_color(severity_color(&note.severity)),
                    );
                }
            }
            if let Some(explanation) = primary.explain() {
                builder = builder.with_help(explanation);
            }

            let mut cache = (filename, Source::from(source));
            builder.finish().eprint(&mut cache).ok();
        }
        None => {
            eprintln!("{primary}");
            if let Some(explanation) = primary.explain() {
                eprintln!("  = help: {explanation}");
            }
        }
    }

    eprintln!("{}", summary_line(filename, error));
}

/// `file:line:col - message`, or `file - [no location] message`.
pub(crate) fn summary_line(filename: &str, error: &CompileError) -> String {
    match error.offset {
        Some(at) => {
            let loc = LineIndex::new(&error.source_text).location(at);
            format!(
                "{}:{loc} - {}",
                filename.fg(Color::Cyan),
                error.message.as_str().fg(Color::Red)
            )
        }
        None => format!(
            "{} - [no location] {}",
            filename.fg(Color::Cyan),
            error.message.as_str().fg(Color::Red)
        ),
    }
}

/// Label text: the offending directive and state when known, else the message.
fn label_message(diag: &Diagnostic) -> String {
    if let Some(ctx) = &diag.context
        && !ctx.is_empty()
    {
        ctx.iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(", ")
    } else {
        diag.message.clone()
    }
}

// ── JSON rendering ──────────────────────────────────────────────────────

/// Diagnostics for `error` as JSON values carrying `file`, `line` and `col`.
pub(crate) fn error_json(filename: &str, error: &CompileError) -> Vec<serde_json::Value> {
    let index = LineIndex::new(&error.source_text);
    error
        .to_diagnostics()
        .into_iter()
        .map(|diag| {
            let loc = diag.span.map(|s| index.location(s.start));
            let mut value = serde_json::json!(diag);
            if let Some(obj) = value.as_object_mut() {
                obj.insert("file".into(), filename.into());
                obj.insert("line".into(), loc.map(|l| l.line).into());
                obj.insert("col".into(), loc.map(|l| l.col).into());
            }
            value
        })
        .collect()
}

// ── Summary line ────────────────────────────────────────────────────────

/// Print the run summary to stderr, coloured by outcome.
///
/// Example: `compiled 3 files (1 failed) in 4.2ms`
pub(crate) fn print_summary(stats: &RunStats) {
    let color = if stats.failed > 0 {
        Color::Red
    } else {
        Color::Green
    };
    eprintln!("{}", stats.to_string().fg(color));
}
