//! Build configuration: defaults, an optional `zixc.jsonc` next to the
//! sources, and command-line overrides, in increasing priority.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use zixc_core::CompileOptions;

/// File name looked up in the build root when no `--config` is given.
pub(crate) const CONFIG_FILE: &str = "zixc.jsonc";

/// Settings for one `zixc build` run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct BuildConfig {
    /// Extension of source files to compile (without the dot).
    pub(crate) input_extension: String,
    /// Extension given to generated files.
    pub(crate) output_extension: String,
    /// Where generated files go; alongside their sources when unset.
    /// Relative paths in the config file are resolved against the root.
    pub(crate) out_dir: Option<PathBuf>,
    /// Directory names never descended into.
    pub(crate) exclude: Vec<String>,
    /// Stop at the first file that fails to compile.
    pub(crate) fail_fast: bool,
    /// Options passed to every compile.
    pub(crate) compile: CompileOptions,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            input_extension: "zix".into(),
            output_extension: "zig".into(),
            out_dir: None,
            exclude: [".git", "zig-cache", ".zig-cache", "zig-out", "node_modules"]
                .map(String::from)
                .to_vec(),
            fail_fast: false,
            compile: CompileOptions::default(),
        }
    }
}

/// Command-line values that take priority over the config file.
#[derive(Debug, Default)]
pub(crate) struct Overrides {
    pub(crate) out_dir: Option<PathBuf>,
    pub(crate) fail_fast: bool,
    pub(crate) callback_fn: Option<String>,
}

impl BuildConfig {
    /// Parse a JSONC config document.
    pub(crate) fn from_jsonc(text: &str) -> Result<Self> {
        let stripped = zixc_jsonc::strip_jsonc(text);
        Ok(serde_json::from_str(&stripped)?)
    }

    /// Resolve the configuration for a build rooted at `root`.
    ///
    /// `explicit` must exist when given; otherwise `root/zixc.jsonc` is used
    /// if present, and defaults if not.
    pub(crate) fn load(root: &Path, explicit: Option<&Path>, overrides: Overrides) -> Result<Self> {
        let path = match explicit {
            Some(p) => Some(p.to_path_buf()),
            None => Some(root.join(CONFIG_FILE)).filter(|p| p.is_file()),
        };

        let mut config = match &path {
            Some(p) => {
                let text = fs::read_to_string(p)
                    .with_context(|| format!("failed to read config '{}'", p.display()))?;
                let mut config = Self::from_jsonc(&text)
                    .with_context(|| format!("invalid config '{}'", p.display()))?;
                if let Some(dir) = config.out_dir.take() {
                    config.out_dir = Some(root.join(dir));
                }
                tracing::debug!(path = %p.display(), "loaded config");
                config
            }
            None => Self::default(),
        };

        if let Some(dir) = overrides.out_dir {
            config.out_dir = Some(dir);
        }
        config.fail_fast |= overrides.fail_fast;
        if let Some(name) = overrides.callback_fn {
            config.compile.callback_fn = name;
        }
        config.input_extension = config.input_extension.trim_start_matches('.').to_string();
        config.output_extension = config.output_extension.trim_start_matches('.').to_string();
        anyhow::ensure!(
            !config.input_extension.is_empty() && config.input_extension != config.output_extension,
            "input_extension must be non-empty and differ from output_extension"
        );
        Ok(config)
    }
}
