//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/famtree/famtree.toml`
//! 3. Local config: `.famtree.toml` next to the family file
//! 4. Environment variables: `FAMTREE_*` prefix

use std::path::{Path, PathBuf};
use std::str::FromStr;

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::ApplicationError;
use crate::domain::{Direction, DocumentFormat, DomainError, PageSize};
use crate::util::path::expand_path;

const GLOBAL_CONFIG_FILE: &str = "famtree.toml";
const LOCAL_CONFIG_FILE: &str = ".famtree.toml";
const ENV_PREFIX: &str = "FAMTREE";

/// External converter configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ConverterConfig {
    /// Converter executable (default: Graphviz `dot`)
    pub command: String,
    /// Extra arguments placed before the input file, e.g. `-Nfontname=Arial`
    pub extra_args: Vec<String>,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            command: "dot".into(),
            extra_args: vec![],
        }
    }
}

/// Raw converter config for intermediate parsing (arrays are Option to detect "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawConverterConfig {
    pub command: Option<String>,
    pub extra_args: Option<Vec<String>>,
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub direction: Option<Direction>,
    pub page_size: Option<PageSize>,
    pub format: Option<DocumentFormat>,
    pub output_dir: Option<PathBuf>,
    pub cache: Option<bool>,
    pub converter: RawConverterConfig,
}

impl ConverterConfig {
    /// Merge arrays with union semantics and negation support.
    ///
    /// Order of first appearance is kept.
    ///
    /// # Examples
    /// ```ignore
    /// merge_array(&["a", "b"], &["c"])       // → ["a", "b", "c"]
    /// merge_array(&["a", "b"], &["!a", "c"]) // → ["b", "c"]
    /// ```
    pub fn merge_array(base: &[String], overlay: &[String]) -> Vec<String> {
        let negated: Vec<&str> = overlay
            .iter()
            .filter_map(|item| item.strip_prefix('!'))
            .collect();

        base.iter()
            .chain(overlay.iter().filter(|item| !item.starts_with('!')))
            .filter(|item| !negated.contains(&item.as_str()))
            .unique()
            .cloned()
            .collect()
    }

    /// Merge overlay config onto self (base); arrays are union-merged.
    pub fn merge(&self, overlay: &RawConverterConfig) -> Self {
        Self {
            command: overlay
                .command
                .clone()
                .unwrap_or_else(|| self.command.clone()),
            extra_args: overlay
                .extra_args
                .as_ref()
                .map(|o| Self::merge_array(&self.extra_args, o))
                .unwrap_or_else(|| self.extra_args.clone()),
        }
    }

    /// Apply global config onto defaults; arrays given in global replace the defaults.
    pub fn apply_global(&self, global: &RawConverterConfig) -> Self {
        Self {
            command: global
                .command
                .clone()
                .unwrap_or_else(|| self.command.clone()),
            extra_args: global
                .extra_args
                .clone()
                .unwrap_or_else(|| self.extra_args.clone()),
        }
    }
}

/// Unified configuration for famtree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Layout direction (TB, LR, BT, RL)
    pub direction: Direction,
    /// Paper size passed to the converter
    pub page_size: PageSize,
    /// Rendered document format
    pub format: DocumentFormat,
    /// Directory for rendered documents
    pub output_dir: PathBuf,
    /// Reuse an already rendered document with the same content hash
    pub cache: bool,
    /// External converter settings
    pub converter: ConverterConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            direction: Direction::default(),
            page_size: PageSize::default(),
            format: DocumentFormat::default(),
            output_dir: PathBuf::from("."),
            cache: true,
            converter: ConverterConfig::default(),
        }
    }
}

/// Get the XDG config directory for famtree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "famtree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file, honoring an explicit config directory.
pub fn global_config_path(config_dir: Option<&Path>) -> Option<PathBuf> {
    match config_dir {
        Some(dir) => Some(dir.join(GLOBAL_CONFIG_FILE)),
        None => global_config_dir().map(|dir| dir.join(GLOBAL_CONFIG_FILE)),
    }
}

/// Get the path to the local config file next to a family file.
pub fn local_config_path(family_dir: &Path) -> PathBuf {
    family_dir.join(LOCAL_CONFIG_FILE)
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Expand shell variables and tilde in path-like fields.
    fn expand_paths(&mut self) {
        let expanded = expand_path(self.output_dir.to_string_lossy().as_ref());
        self.output_dir = PathBuf::from(expanded);
        self.converter.command = expand_path(&self.converter.command);
    }

    /// Merge overlay config onto self (base) with union semantics for arrays.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            direction: overlay.direction.unwrap_or(self.direction),
            page_size: overlay.page_size.unwrap_or(self.page_size),
            format: overlay.format.unwrap_or(self.format),
            output_dir: overlay
                .output_dir
                .clone()
                .unwrap_or_else(|| self.output_dir.clone()),
            cache: overlay.cache.unwrap_or(self.cache),
            converter: self.converter.merge(&overlay.converter),
        }
    }

    /// Apply global config onto defaults with REPLACE semantics for arrays.
    fn apply_global(&self, global: &RawSettings) -> Self {
        Self {
            converter: self.converter.apply_global(&global.converter),
            ..self.merge_with(&RawSettings {
                converter: RawConverterConfig::default(),
                ..global.clone()
            })
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `config_dir` - Directory of the global config file (default: XDG config dir)
    /// * `family_dir` - Directory of the family file, searched for `.famtree.toml`
    ///
    /// # Array Merge Semantics
    /// - Defaults → Global: REPLACE
    /// - Global → Local: UNION with `!item` negation
    /// - Any → Env vars: REPLACE
    pub fn load(
        config_dir: Option<&Path>,
        family_dir: Option<&Path>,
    ) -> Result<Self, ApplicationError> {
        Self::load_layers(config_dir, family_dir, None)
    }

    /// Layered loading with an explicit environment (tests pass a fixed map).
    pub fn load_layers(
        config_dir: Option<&Path>,
        family_dir: Option<&Path>,
        env: Option<config::Map<String, String>>,
    ) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path(config_dir) {
            if global_path.exists() {
                debug!("global config: {}", global_path.display());
                let raw = load_raw_settings(&global_path)?;
                current = current.apply_global(&raw);
            }
        }

        if let Some(dir) = family_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                debug!("local config: {}", local_path.display());
                let raw = load_raw_settings(&local_path)?;
                current = current.merge_with(&raw);
            }
        }

        current = Self::apply_env_overrides(current, env)?;
        current.expand_paths();

        Ok(current)
    }

    /// Apply FAMTREE_* environment variables as explicit overrides.
    fn apply_env_overrides(
        mut settings: Self,
        env: Option<config::Map<String, String>>,
    ) -> Result<Self, ApplicationError> {
        let builder = Config::builder().add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("converter.extra_args")
                .source(env),
        );

        let config = builder.build().map_err(config_err)?;

        if let Ok(val) = config.get_string("direction") {
            settings.direction = parse_value(&val)?;
        }
        if let Ok(val) = config.get_string("page_size") {
            settings.page_size = parse_value(&val)?;
        }
        if let Ok(val) = config.get_string("format") {
            settings.format = parse_value(&val)?;
        }
        if let Ok(val) = config.get_string("output_dir") {
            settings.output_dir = PathBuf::from(val);
        }
        if let Ok(val) = config.get_bool("cache") {
            settings.cache = val;
        }
        if let Ok(val) = config.get_string("converter.command") {
            settings.converter.command = val;
        }
        if let Ok(val) = config.get::<Vec<String>>("converter.extra_args") {
            settings.converter.extra_args = val;
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# famtree configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/famtree/famtree.toml  (defines your baseline)
#   Local:  .famtree.toml next to the family file
#   Env:    FAMTREE_* environment variables, e.g. FAMTREE_CONVERTER__COMMAND
#
# Array Merge Semantics:
#   Global config REPLACES compiled defaults.
#   Local config UNIONS with global.
#   Use "!item" in local config to REMOVE an inherited item:
#     extra_args = ["-Gdpi=300", "!-Nfontname=Arial"]

# Layout direction: TB, LR, BT, RL
# direction = "TB"

# Paper size: a3, a4, a5, letter, legal
# page_size = "a4"

# Document format: pdf, png, svg
# format = "pdf"

# Directory for rendered documents
# output_dir = "."

# Reuse rendered documents whose content hash is unchanged
# cache = true

[converter]
# Graphviz-compatible executable
# command = "dot"

# Extra arguments placed before the input file
# extra_args = ["-Nfontname=Arial"]
"#
        .to_string()
    }
}

fn parse_value<T>(value: &str) -> Result<T, ApplicationError>
where
    T: FromStr<Err = DomainError>,
{
    T::from_str(value).map_err(|e| ApplicationError::Config {
        message: e.to_string(),
    })
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
