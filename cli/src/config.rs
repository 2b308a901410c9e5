//! Render policy from files and flags.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use color_eyre::eyre::{Result, WrapErr};
use jsoml::RenderConfig;

/// Policy flags shared by every command.
#[derive(Args, Debug, Default, Clone)]
pub struct PolicyArgs {
    /// Policy file (`.toml` or `.json`) applied before the flags below
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Only render this tag (repeatable)
    #[arg(long = "include", value_name = "TAG")]
    pub include: Vec<String>,

    /// Never render this tag (repeatable)
    #[arg(long = "exclude", value_name = "TAG")]
    pub exclude: Vec<String>,

    /// Deepest nesting level that still renders
    #[arg(long, value_name = "N", conflicts_with = "unlimited_depth")]
    pub max_depth: Option<usize>,

    /// Disable the nesting guard
    #[arg(long)]
    pub unlimited_depth: bool,
}

impl PolicyArgs {
    /// Loads the policy file, if any, and overlays the flags on top of it.
    pub fn resolve(&self) -> Result<RenderConfig> {
        let mut config = match &self.config {
            Some(path) => load(path)?,
            None => RenderConfig::default(),
        };

        extend(&mut config.included_tags, &self.include);
        extend(&mut config.excluded_tags, &self.exclude);

        if let Some(max_depth) = self.max_depth {
            config.max_depth = Some(max_depth);
        }
        if self.unlimited_depth {
            config.max_depth = None;
        }

        tracing::debug!(?config, "resolved render policy");
        Ok(config)
    }
}

fn extend(target: &mut Option<BTreeSet<String>>, tags: &[String]) {
    if !tags.is_empty() {
        target
            .get_or_insert_with(BTreeSet::new)
            .extend(tags.iter().cloned());
    }
}

/// Reads a policy file, choosing the format from its extension.
pub fn load(path: &Path) -> Result<RenderConfig> {
    let contents = fs::read_to_string(path)
        .wrap_err_with(|| format!("failed to read {}", path.display()))?;
    parse(&contents, path).wrap_err_with(|| format!("failed to parse {}", path.display()))
}

fn parse(contents: &str, path: &Path) -> Result<RenderConfig> {
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        Ok(RenderConfig::from_json_str(contents)?)
    } else {
        Ok(toml::from_str(contents)?)
    }
}
