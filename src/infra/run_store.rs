// ============================================================
// Layer 6 — Run Store
// ============================================================
// Everything a run leaves behind lives in one output directory:
//
//   <output_dir>/
//     run_config.json   ← effective ExperimentConfig (written first)
//     metrics.csv       ← one row per epoch (MetricsLogger)
//     test_report.json  ← final test metrics, when a test set is given
//
// Model weights are not persisted.

use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::application::train_use_case::ExperimentConfig;
use crate::domain::metrics::TestReport;

pub const CONFIG_FILE: &str = "run_config.json";
pub const REPORT_FILE: &str = "test_report.json";

/// Owns the output directory of one run.
pub struct RunStore {
    dir: PathBuf,
}

impl RunStore {
    /// Create the output directory (like `mkdir -p`) if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Cannot create output directory '{}'", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn save_config(&self, cfg: &ExperimentConfig) -> Result<()> {
        write_json(&self.dir.join(CONFIG_FILE), cfg)
    }

    pub fn load_config(&self) -> Result<ExperimentConfig> {
        read_json(&self.dir.join(CONFIG_FILE))
    }

    pub fn save_report(&self, report: &TestReport) -> Result<()> {
        write_json(&self.dir.join(REPORT_FILE), report)
    }
}

/// Pretty-print `value` as JSON into `path`.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json)
        .with_context(|| format!("Cannot write '{}'", path.display()))?;

    tracing::debug!("Wrote '{}'", path.display());
    Ok(())
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Cannot read '{}'", path.display()))?;
    serde_json::from_str(&json)
        .with_context(|| format!("Invalid JSON in '{}'", path.display()))
}
