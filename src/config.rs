//! Configuration file for mrbcheck.
//!
//! The configuration tunes rule severities, excludes paths from discovery,
//! and adds (or overrides) watched entry points.

use once_cell::sync::Lazy;
use globset::{Glob, GlobSet, GlobSetBuilder};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::check::{ContractKind, DiagnosticRule, EntryPointSpec, RuleSet};

/// Config file names searched for in the working directory.
pub const DEFAULT_CONFIG_NAMES: &[&str] = &["mrbcheck.yaml", ".mrbcheck.yaml"];

/// Config schema versions this build understands.
const SUPPORTED_VERSIONS: &[&str] = &["", "1"];

static C_IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid identifier regex"));

/// Configured treatment of one rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleSetting {
    Error,
    Warning,
    Off,
}

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub version: String,
    /// Glob patterns for fact files to skip (e.g., "**/vendor/**")
    #[serde(default)]
    pub excluded_paths: Vec<String>,
    /// Severity overrides keyed by rule name
    #[serde(default)]
    pub rules: BTreeMap<String, RuleSetting>,
    /// Extra watched entry points; a row named like a built-in replaces it
    #[serde(default)]
    pub entry_points: Vec<EntryPointSpec>,
}

/// Problems found while validating a configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("unsupported config version {0:?}")]
    UnsupportedVersion(String),
    #[error("unknown rule {0:?}")]
    UnknownRule(String),
    #[error("entry point name {0:?} is not a C identifier")]
    InvalidName(String),
    #[error("entry point {0:?} is listed more than once")]
    DuplicateEntryPoint(String),
    #[error("entry point {name:?}: argument {index} is not one of its {fixed} fixed parameters")]
    ArgumentOutOfRange {
        name: String,
        index: usize,
        fixed: usize,
    },
    #[error("invalid excluded path pattern {pattern:?}: {source}")]
    InvalidGlob {
        pattern: String,
        source: globset::Error,
    },
}

impl Config {
    /// Parse a configuration from a YAML file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Compile `excluded_paths` into one matcher.
    ///
    /// Built once per discovery; `**` matches across directories.
    pub fn exclusions(&self) -> Result<GlobSet, ConfigError> {
        let mut builder = GlobSetBuilder::new();
        for pattern in &self.excluded_paths {
            let glob = Glob::new(pattern).map_err(|source| ConfigError::InvalidGlob {
                pattern: pattern.clone(),
                source,
            })?;
            builder.add(glob);
        }
        builder.build().map_err(|source| ConfigError::InvalidGlob {
            pattern: self.excluded_paths.join(", "),
            source,
        })
    }

    /// Resolve rule overrides into the checker's rule set.
    ///
    /// Unknown rule names are ignored here; [`validate`] rejects them.
    pub fn rule_set(&self) -> RuleSet {
        let mut rules = RuleSet::new();
        for (name, setting) in &self.rules {
            if let Some(rule) = DiagnosticRule::parse(name) {
                rules.set(rule, *setting);
            }
        }
        rules
    }
}

/// Find a config file in `dir`.
pub fn discover(dir: &Path) -> Option<PathBuf> {
    DEFAULT_CONFIG_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.exists())
}

/// Validate a parsed configuration.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    if !SUPPORTED_VERSIONS.contains(&config.version.as_str()) {
        return Err(ConfigError::UnsupportedVersion(config.version.clone()));
    }

    for name in config.rules.keys() {
        if DiagnosticRule::parse(name).is_none() {
            return Err(ConfigError::UnknownRule(name.clone()));
        }
    }

    config.exclusions()?;

    let mut seen = HashSet::new();
    for spec in &config.entry_points {
        if !C_IDENTIFIER.is_match(&spec.name) {
            return Err(ConfigError::InvalidName(spec.name.to_string()));
        }
        if !seen.insert(&*spec.name) {
            return Err(ConfigError::DuplicateEntryPoint(spec.name.to_string()));
        }
        validate_argument_index(spec)?;
    }

    Ok(())
}

fn validate_argument_index(spec: &EntryPointSpec) -> Result<(), ConfigError> {
    let out_of_range = |index: usize| ConfigError::ArgumentOutOfRange {
        name: spec.name.to_string(),
        index,
        fixed: spec.fixed_params,
    };

    match &spec.kind {
        // The template is the last fixed parameter, so there must be one.
        ContractKind::MessageTemplate if spec.fixed_params == 0 => Err(out_of_range(0)),
        kind => match kind.argument_index(spec.fixed_params) {
            Some(index) if index >= spec.fixed_params => Err(out_of_range(index)),
            _ => Ok(()),
        },
    }
}
