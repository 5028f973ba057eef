//! Discovery and loading of fact files.

use anyhow::Context;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::FactFile;
use crate::config::Config;

/// File extensions recognized as fact files.
pub const FACT_FILE_EXTENSIONS: &[&str] = &["json", "yaml", "yml"];

/// Collect fact files under `root`, honoring the config's excluded paths.
///
/// Hidden directories are skipped. Results are sorted by path.
pub fn collect_fact_files(root: &Path, config: &Config) -> anyhow::Result<Vec<PathBuf>> {
    let excluded = config.exclusions()?;
    let mut files = Vec::new();

    for entry in WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_entry(|e| {
            let name = e.file_name().to_string_lossy();
            // The root itself may be ".", don't skip it.
            !(e.depth() > 0 && e.file_type().is_dir() && name.starts_with('.'))
        })
    {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        if !FACT_FILE_EXTENSIONS.contains(&ext) {
            continue;
        }
        if is_config_file(path) {
            continue;
        }
        if excluded.is_match(path) {
            tracing::debug!(path = %path.display(), "excluded by config");
            continue;
        }
        files.push(path.to_path_buf());
    }

    files.sort();
    tracing::debug!(count = files.len(), root = %root.display(), "collected fact files");
    Ok(files)
}

/// Config files share the YAML extension; never treat them as facts.
fn is_config_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    crate::config::DEFAULT_CONFIG_NAMES.contains(&name)
}

/// Load a single fact file, choosing the format by extension.
pub fn load_fact_file(path: &Path) -> anyhow::Result<FactFile> {
    let content =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    let mut facts: FactFile = if ext == "json" {
        serde_json::from_str(&content).with_context(|| format!("parsing {}", path.display()))?
    } else {
        serde_yaml::from_str(&content).with_context(|| format!("parsing {}", path.display()))?
    };

    // A dump without a source name is reported under its own path.
    if facts.file.is_empty() {
        facts.file = path.to_string_lossy().to_string();
    }

    tracing::debug!(path = %path.display(), calls = facts.calls.len(), "loaded fact file");
    Ok(facts)
}
