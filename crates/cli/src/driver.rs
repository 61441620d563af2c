//! Directory driver: discover sources, compile each one, write the outputs.

use std::ffi::OsStr;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use serde::Serialize;
use zixc_core::{BlockIdGen, CompileError, compile};

use crate::config::BuildConfig;

/// Counters for one run.
#[derive(Debug, Default, Clone, Serialize)]
pub(crate) struct RunStats {
    pub(crate) discovered: usize,
    pub(crate) compiled: usize,
    pub(crate) failed: usize,
    pub(crate) bytes_in: usize,
    pub(crate) bytes_out: usize,
    #[serde(serialize_with = "as_millis")]
    pub(crate) elapsed: Duration,
}

fn as_millis<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(d.as_secs_f64() * 1000.0)
}

impl fmt::Display for RunStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = if self.compiled == 1 { "" } else { "s" };
        write!(f, "compiled {} file{s}", self.compiled)?;
        if self.failed > 0 {
            write!(f, " ({} failed)", self.failed)?;
        }
        if self.discovered > self.compiled + self.failed {
            write!(f, " ({} skipped)", self.discovered - self.compiled - self.failed)?;
        }
        write!(f, " in {:.1?}", self.elapsed)
    }
}

/// What happened to one discovered file.
#[derive(Debug)]
pub(crate) enum FileOutcome {
    /// Generated code was written to `output`.
    Written { input: PathBuf, output: PathBuf },
    /// The source was not UTF-8 or had a directive error; nothing was written.
    Failed { input: PathBuf, error: CompileError },
}

/// Every `*.<input_extension>` file under `root`, sorted by path.
pub(crate) fn discover(root: &Path, config: &BuildConfig) -> Result<Vec<PathBuf>> {
    let ext = OsStr::new(&config.input_extension);
    let mut found = Vec::new();
    let walker = walkdir::WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            e.depth() == 0
                || !e.file_type().is_dir()
                || !config.exclude.iter().any(|x| e.file_name() == OsStr::new(x))
        });
    for entry in walker {
        let entry = entry.with_context(|| format!("error walking '{}'", root.display()))?;
        if entry.file_type().is_file() && entry.path().extension() == Some(ext) {
            tracing::debug!(path = %entry.path().display(), "discovered");
            found.push(entry.into_path());
        }
    }
    Ok(found)
}

/// Where the generated code for `input` is written.
pub(crate) fn output_path(root: &Path, input: &Path, config: &BuildConfig) -> PathBuf {
    let target = match &config.out_dir {
        Some(dir) => dir.join(input.strip_prefix(root).unwrap_or(input)),
        None => input.to_path_buf(),
    };
    target.with_extension(&config.output_extension)
}

/// Compile every discovered file under `root`.
///
/// All files draw block ids from one generator. `on_file` sees each outcome
/// as it happens. I/O failures abort the run; per-file errors (invalid UTF-8,
/// directive errors) do not unless `fail_fast` is set.
pub(crate) fn run(
    root: &Path,
    config: &BuildConfig,
    mut on_file: impl FnMut(&FileOutcome),
) -> Result<RunStats> {
    let start = Instant::now();
    let ids = BlockIdGen::new();
    let inputs = discover(root, config)?;
    let mut stats = RunStats {
        discovered: inputs.len(),
        ..RunStats::default()
    };

    for input in inputs {
        let bytes =
            fs::read(&input).with_context(|| format!("failed to read '{}'", input.display()))?;
        stats.bytes_in += bytes.len();

        let compiled = CompileError::decode(bytes)
            .and_then(|source| compile(&source, &ids, &config.compile));
        let outcome = match compiled {
            Ok(code) => {
                let output = output_path(root, &input, config);
                if let Some(parent) = output.parent() {
                    fs::create_dir_all(parent)
                        .with_context(|| format!("failed to create '{}'", parent.display()))?;
                }
                fs::write(&output, &code)
                    .with_context(|| format!("failed to write '{}'", output.display()))?;
                tracing::debug!(input = %input.display(), output = %output.display(), "compiled");
                stats.compiled += 1;
                stats.bytes_out += code.len();
                FileOutcome::Written { input, output }
            }
            Err(error) => {
                tracing::warn!(input = %input.display(), code = error.code, "{}", error.message);
                stats.failed += 1;
                FileOutcome::Failed { input, error }
            }
        };
        on_file(&outcome);

        if config.fail_fast && matches!(outcome, FileOutcome::Failed { .. }) {
            break;
        }
    }

    stats.elapsed = start.elapsed();
    tracing::info!(
        compiled = stats.compiled,
        failed = stats.failed,
        elapsed_ms = stats.elapsed.as_millis() as u64,
        "build finished"
    );
    Ok(stats)
}
