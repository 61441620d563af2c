mod config;
mod driver;
mod render;

use std::fs;
use std::io::{self, Write as _};
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use zixc_core::{BlockIdGen, CompileError, CompileOptions, compile};
use zixc_diagnostics as diag;

use crate::config::{BuildConfig, Overrides};
use crate::driver::FileOutcome;
use crate::render::{Format, error_json, print_summary, render_error_pretty};

// ── CLI definition ──────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "zixc",
    version,
    about = "Compile .zix sources (Zig with % directives) into plain Zig"
)]
struct Cli {
    /// Output mode: "pretty" for coloured terminal output, "json" for
    /// machine-readable JSON. Defaults to "pretty" when stdout is a TTY,
    /// "json" otherwise.
    #[arg(long, global = true, value_parser = ["pretty", "json"])]
    output: Option<String>,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Compile every .zix file under a directory.
    Build {
        /// Directory to search.
        #[arg(default_value = ".")]
        root: PathBuf,
        /// Write generated files here, mirroring the source tree.
        #[arg(long)]
        out_dir: Option<PathBuf>,
        /// Stop at the first file with an error.
        #[arg(long)]
        fail_fast: bool,
        /// Function that receives callback blocks (default `ui.callback`).
        #[arg(long)]
        callback_fn: Option<String>,
        /// Config file to use instead of `<ROOT>/zixc.jsonc`.
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Compile one file. Writes to stdout unless `-o` is given.
    Compile {
        file: PathBuf,
        #[arg(long, short)]
        out: Option<PathBuf>,
        /// Function that receives callback blocks (default `ui.callback`).
        #[arg(long)]
        callback_fn: Option<String>,
    },

    /// Check one file for directive errors without writing anything.
    Check { file: PathBuf },

    /// Explain a diagnostic ID (e.g. ZIX1005).
    Explain { id: String },
}

// ── Main ────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let format = Format::resolve_or_detect(cli.output.as_deref());

    match cli.cmd {
        Cmd::Build {
            root,
            out_dir,
            fail_fast,
            callback_fn,
            config,
        } => {
            let overrides = Overrides {
                out_dir,
                fail_fast,
                callback_fn,
            };
            cmd_build(&root, config.as_deref(), overrides, format)?
        }
        Cmd::Compile {
            file,
            out,
            callback_fn,
        } => cmd_compile(&file, out.as_deref(), callback_fn, format)?,
        Cmd::Check { file } => cmd_check(&file, format)?,
        Cmd::Explain { id } => cmd_explain(&id, format)?,
    }

    Ok(())
}

/// Log to stderr, filtered by `ZIXC_LOG` (default `warn`).
fn init_tracing() {
    let filter = EnvFilter::try_from_env("ZIXC_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

// ── Commands ────────────────────────────────────────────────────────────

fn cmd_build(
    root: &Path,
    config_path: Option<&Path>,
    overrides: Overrides,
    format: Format,
) -> Result<()> {
    anyhow::ensure!(root.is_dir(), "'{}' is not a directory", root.display());
    let config = BuildConfig::load(root, config_path, overrides)?;

    let mut written = Vec::new();
    let mut errors = Vec::new();
    let stats = driver::run(root, &config, |outcome| match outcome {
        FileOutcome::Written { input, output } => {
            if format == Format::Json {
                written.push(serde_json::json!({
                    "input": input.display().to_string(),
                    "output": output.display().to_string(),
                }));
            }
        }
        FileOutcome::Failed { input, error } => {
            let name = input.display().to_string();
            match format {
                Format::Pretty => render_error_pretty(&name, error),
                Format::Json => errors.extend(error_json(&name, error)),
            }
        }
    })?;

    match format {
        Format::Json => {
            let out = serde_json::json!({
                "ok": stats.failed == 0,
                "stats": stats,
                "written": written,
                "diagnostics": errors,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Format::Pretty => print_summary(&stats),
    }

    if stats.failed > 0 {
        process::exit(1);
    }
    Ok(())
}

fn cmd_compile(
    file: &Path,
    out: Option<&Path>,
    callback_fn: Option<String>,
    format: Format,
) -> Result<()> {
    let input = read_source(file, format)?;
    let mut options = CompileOptions::default();
    if let Some(name) = callback_fn {
        options.callback_fn = name;
    }

    let code = match compile(&input, &BlockIdGen::new(), &options) {
        Ok(code) => code,
        Err(error) => exit_with_error(file, &error, format),
    };

    match out {
        Some(path) => {
            fs::write(path, &code)
                .with_context(|| format!("failed to write '{}'", path.display()))?;
            tracing::debug!(output = %path.display(), "compiled");
            if format == Format::Json {
                let out = serde_json::json!({
                    "ok": true,
                    "input": file.display().to_string(),
                    "output": path.display().to_string(),
                });
                println!("{}", serde_json::to_string_pretty(&out)?);
            }
        }
        None => {
            // Generated code is the expected output, regardless of format.
            io::stdout().write_all(code.as_bytes())?;
        }
    }
    Ok(())
}

fn cmd_check(file: &Path, format: Format) -> Result<()> {
    let input = read_source(file, format)?;
    if let Err(error) = compile(&input, &BlockIdGen::new(), &CompileOptions::default()) {
        exit_with_error(file, &error, format);
    }

    match format {
        Format::Json => {
            let out = serde_json::json!({ "ok": true, "diagnostics": [] });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Format::Pretty => eprintln!("{}: ok", file.display()),
    }
    Ok(())
}

fn cmd_explain(id: &str, format: Format) -> Result<()> {
    match format {
        Format::Json => {
            let out = serde_json::json!({
                "id": id,
                "explanation": diag::explain(id),
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Format::Pretty => {
            if let Some(text) = diag::explain(id) {
                use ariadne::Fmt;
                println!("{}: {}", id.fg(ariadne::Color::Cyan), text);
            } else {
                println!("{id}: (no explanation available)");
            }
        }
    }
    Ok(())
}

// ── Helpers ─────────────────────────────────────────────────────────────

/// Read `file` as UTF-8; invalid bytes are reported like a compile error.
fn read_source(file: &Path, format: Format) -> Result<String> {
    let bytes = fs::read(file).with_context(|| format!("failed to read '{}'", file.display()))?;
    match CompileError::decode(bytes) {
        Ok(text) => Ok(text),
        Err(error) => exit_with_error(file, &error, format),
    }
}

/// Report a compile error in the chosen format and exit with code 1.
fn exit_with_error(file: &Path, error: &CompileError, format: Format) -> ! {
    let name = file.display().to_string();
    match format {
        Format::Pretty => render_error_pretty(&name, error),
        Format::Json => {
            let out = serde_json::json!({
                "ok": false,
                "diagnostics": error_json(&name, error),
            });
            match serde_json::to_string_pretty(&out) {
                Ok(text) => println!("{text}"),
                Err(e) => eprintln!("error: {e}"),
            }
        }
    }
    process::exit(1);
}
