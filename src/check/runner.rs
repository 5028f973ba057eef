//! Check runner that loads fact files and checks them in parallel.

use rayon::prelude::*;
use std::path::PathBuf;

use crate::config::Config;
use crate::host::{load_fact_file, FactFile};

use super::{CheckResult, Checker};

/// Executes the checker against a set of fact files.
pub struct Runner {
    checker: Checker,
}

impl Runner {
    /// Create a new runner for a validated configuration.
    pub fn new(config: &Config) -> Self {
        Self {
            checker: Checker::new(config),
        }
    }

    /// Load and check every file.
    ///
    /// Files are processed in parallel; results keep the input order. A file
    /// that fails to load fails the whole run.
    pub fn run(&self, files: &[PathBuf]) -> anyhow::Result<CheckResult> {
        let per_file: Vec<CheckResult> = files
            .par_iter()
            .map(|path| -> anyhow::Result<CheckResult> {
                let facts = load_fact_file(path)?;
                Ok(self.check_facts(&facts))
            })
            .collect::<anyhow::Result<_>>()?;

        let mut result = CheckResult::new();
        for r in per_file {
            result.merge(r);
        }

        tracing::info!(
            files = result.scanned,
            calls = result.calls_checked,
            diagnostics = result.diagnostics.len(),
            "check finished"
        );
        Ok(result)
    }

    /// Check already-loaded facts for one translation unit.
    pub fn check_facts(&self, facts: &FactFile) -> CheckResult {
        let result = self.checker.check_calls(&facts.file, &facts.calls);
        tracing::debug!(
            file = %facts.file,
            calls = facts.calls.len(),
            matched = result.calls_checked,
            diagnostics = result.diagnostics.len(),
            "checked fact file"
        );
        result
    }
}
